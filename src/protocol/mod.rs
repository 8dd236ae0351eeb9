use serde_json::{json, Value};

use crate::catalog;
use crate::engine::Engine;
use crate::services::directory::{InstallGuard, PackageDirectory};
use crate::services::session::{TranslationSession, HISTORY_LIMIT};

mod command;
use command::Command;

/// Everything one rendering-layer session owns. Created when the front-end
/// connects, dropped when it goes away; sessions never share state beyond
/// the engine itself.
pub struct SessionState<'e> {
    pub directory: PackageDirectory<'e>,
    pub session: TranslationSession<'e>,
}

impl<'e> SessionState<'e> {
    pub fn new(engine: &'e dyn Engine, guard: InstallGuard) -> Self {
        Self {
            directory: PackageDirectory::new(engine, guard),
            session: TranslationSession::new(engine),
        }
    }
}

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload<'a>(req: &'a Value) -> &'a Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn require_str<'a>(payload: &'a Value, field: &str) -> Result<&'a str, String> {
    match payload.get(field).and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(format!("payload.{field} is required")),
    }
}

/// Best display name for a code: the installed pairs know the engine's own
/// naming, the catalog covers the rest, and the raw code is the last resort.
fn display_name(directory: &PackageDirectory, code: &str) -> String {
    directory
        .installed()
        .iter()
        .find_map(|p| {
            if p.from_code == code {
                Some(p.from_name.clone())
            } else if p.to_code == code {
                Some(p.to_name.clone())
            } else {
                None
            }
        })
        .or_else(|| catalog::language_name(code).map(|s| s.to_string()))
        .unwrap_or_else(|| code.to_string())
}

pub fn handle(state: &mut SessionState, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "lingua-core alive" })),

        Command::CatalogLanguages => {
            let languages: Vec<Value> = catalog::all()
                .map(|(code, name)| json!({ "code": code, "name": name }))
                .collect();
            ok(id, json!({ "languages": languages }))
        }

        Command::PairsList => match state.session.available_pairs(&mut state.directory) {
            Ok(pairs) => {
                let has_pairs = !pairs.is_empty();
                ok(id, json!({ "pairs": pairs, "has_pairs": has_pairs }))
            }
            Err(e) => err(id, e.to_string()),
        },

        Command::PairsSources => match state.session.source_languages(&mut state.directory) {
            Ok(sources) => {
                let sources: Vec<Value> = sources
                    .into_iter()
                    .map(|(code, name)| json!({ "code": code, "name": name }))
                    .collect();
                ok(id, json!({ "sources": sources }))
            }
            Err(e) => err(id, e.to_string()),
        },

        Command::PairsTargets => {
            let from_code = match require_str(payload, "from_code") {
                Ok(s) => s,
                Err(e) => return err(id, e),
            };

            match state.session.targets_for(&mut state.directory, from_code) {
                Ok(targets) => ok(id, json!({ "targets": targets })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::PackagesRefresh => match state.directory.refresh_available() {
            Ok(packages) => ok(id, json!({ "packages": packages })),
            Err(e) => err(id, e.to_string()),
        },

        Command::PackagesList => ok(id, json!({ "packages": state.directory.available() })),

        Command::PackagesInstall => {
            let from_code = match require_str(payload, "from_code") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };
            let to_code = match require_str(payload, "to_code") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };

            let pair = match state.directory.install(&from_code, &to_code) {
                Ok(p) => p,
                Err(e) => return err(id, e.to_string()),
            };

            // Hand back the fresh installed list so the UI re-renders its
            // selectors in the same round trip.
            match state.directory.refresh_installed() {
                Ok(pairs) => ok(id, json!({ "installed": pair, "pairs": pairs })),
                Err(e) => ok(
                    id,
                    json!({
                        "installed": pair,
                        "pairs": Value::Null,
                        "warning": e.to_string()
                    }),
                ),
            }
        }

        Command::Translate => {
            let from_code = match require_str(payload, "from_code") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };
            let to_code = match require_str(payload, "to_code") {
                Ok(s) => s.to_string(),
                Err(e) => return err(id, e),
            };

            // Blank text must reach the session so it answers with its own
            // empty-input message.
            let text = payload.get("text").and_then(|v| v.as_str()).unwrap_or("");

            let translated = match state.session.translate(text, &from_code, &to_code) {
                Ok(t) => t,
                Err(e) => return err(id, e.to_string()),
            };

            let from_name = display_name(&state.directory, &from_code);
            let to_name = display_name(&state.directory, &to_code);

            let record = state
                .session
                .record(&from_name, &to_name, text, &translated)
                .clone();

            ok(
                id,
                json!({ "translated_text": translated, "record": record }),
            )
        }

        Command::HistoryList => {
            let limit = payload
                .get("limit")
                .and_then(|v| v.as_u64())
                .unwrap_or(HISTORY_LIMIT as u64) as usize;

            ok(id, json!({ "records": state.session.history(limit) }))
        }

        Command::Unknown => err(id, "unknown command"),
    }
}
