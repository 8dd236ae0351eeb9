#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;

mod catalog;
mod engine;
mod error;
mod model;
mod protocol;
mod services;

use engine::bridge::BridgeEngine;
use services::directory::InstallGuard;

fn main() {
    let engine = match BridgeEngine::from_env() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("[core] failed to set up engine bridge: {e}");
            std::process::exit(1);
        }
    };

    let mut state = protocol::SessionState::new(&engine, InstallGuard::default());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result =
            std::panic::catch_unwind(AssertUnwindSafe(|| protocol::handle(&mut state, &line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
