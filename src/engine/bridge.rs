use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use std::{thread, time::Duration};

use crate::model::pair::PackageHandle;

use super::{Engine, EngineError, InstalledLanguage, RemotePackage};

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const DEFAULT_URL: &str = "http://127.0.0.1:7855";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP client for the local bridge process that wraps the translation
/// library. Idempotent reads and the index update are retried with backoff;
/// translate and install are issued exactly once.
pub struct BridgeEngine {
    client: Client,
    base_url: String,
}

impl BridgeEngine {
    pub fn from_env() -> Result<Self, EngineError> {
        let base_url =
            std::env::var("LINGUA_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        let timeout_secs = std::env::var("LINGUA_BRIDGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(&base_url, timeout_secs)
    }

    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_with_retry(&self, path: &str) -> Result<Value, EngineError> {
        with_retry(|| read_json(self.client.get(self.url(path)).send()))
    }

    fn post_with_retry(&self, path: &str) -> Result<Value, EngineError> {
        with_retry(|| read_json(self.client.post(self.url(path)).send()))
    }
}

impl Engine for BridgeEngine {
    fn installed_languages(&self) -> Result<Vec<InstalledLanguage>, EngineError> {
        let value = self.get_with_retry("/languages")?;
        serde_json::from_value(value)
            .map_err(|e| EngineError::Decode(format!("languages payload: {e}")))
    }

    fn translate(
        &self,
        text: &str,
        from_code: &str,
        to_code: &str,
    ) -> Result<String, EngineError> {
        let body = json!({
            "q": text,
            "source": from_code,
            "target": to_code
        });

        let res = self.client.post(self.url("/translate")).json(&body).send();
        let value = read_json(res).map_err(|(e, _)| e)?;

        value
            .get("translatedText")
            .and_then(|t| t.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| EngineError::Decode("missing translatedText".into()))
    }

    fn available_packages(&self) -> Result<Vec<RemotePackage>, EngineError> {
        let value = self.get_with_retry("/packages")?;
        serde_json::from_value(value)
            .map_err(|e| EngineError::Decode(format!("packages payload: {e}")))
    }

    fn update_index(&self) -> Result<(), EngineError> {
        self.post_with_retry("/packages/update").map(|_| ())
    }

    fn install(&self, handle: &PackageHandle) -> Result<(), EngineError> {
        let body = json!({ "handle": handle.0 });

        let res = self
            .client
            .post(self.url("/packages/install"))
            .json(&body)
            .send();

        read_json(res).map_err(|(e, _)| e).map(|_| ())
    }
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are typically temporary
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Reads a response body as JSON, carrying whether the failure is worth a
/// retry alongside the error.
fn read_json(
    res: Result<reqwest::blocking::Response, reqwest::Error>,
) -> Result<Value, (EngineError, bool)> {
    let resp = res.map_err(|e| (EngineError::Network(e.to_string()), true))?;
    let status = resp.status();

    // Read as text first so an error body is never lost to a JSON failure
    let text = resp
        .text()
        .map_err(|e| (EngineError::Network(e.to_string()), true))?;

    if !status.is_success() {
        return Err((
            EngineError::Api(extract_error_message(status, &text)),
            should_retry_http(status),
        ));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text)
        .map_err(|_| (EngineError::Decode("invalid JSON from bridge".into()), false))
}

fn with_retry<F>(mut call: F) -> Result<Value, EngineError>
where
    F: FnMut() -> Result<Value, (EngineError, bool)>,
{
    for attempt in 0..MAX_RETRIES {
        match call() {
            Ok(v) => return Ok(v),
            Err((e, retryable)) => {
                if !retryable || attempt + 1 == MAX_RETRIES {
                    return Err(e);
                }
                eprintln!("[bridge] retrying after error: {e}");
                thread::sleep(backoff(attempt));
            }
        }
    }

    Err(EngineError::Network("bridge unreachable".into()))
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // Common shapes: { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    // Fallback: raw body, truncated
    let trimmed = body_text.trim();
    let snippet = if trimmed.len() > 400 {
        format!("{}...", &trimmed[..400])
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let engine = BridgeEngine::new("http://localhost:7855/", 5).unwrap();
        assert_eq!(engine.url("/languages"), "http://localhost:7855/languages");
    }

    #[test]
    fn retryable_statuses() {
        assert!(should_retry_http(StatusCode::REQUEST_TIMEOUT));
        assert!(should_retry_http(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_http(StatusCode::BAD_GATEWAY));
        assert!(!should_retry_http(StatusCode::BAD_REQUEST));
        assert!(!should_retry_http(StatusCode::NOT_FOUND));
    }

    #[test]
    fn error_message_prefers_nested_error_message() {
        let body = r#"{"error":{"message":"model missing"}}"#;
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, body),
            "HTTP 400: model missing"
        );
    }

    #[test]
    fn error_message_falls_back_to_flat_message() {
        let body = r#"{"message":"rate limited"}"#;
        assert_eq!(
            extract_error_message(StatusCode::TOO_MANY_REQUESTS, body),
            "HTTP 429: rate limited"
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(
            extract_error_message(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "HTTP 500: boom"
        );
    }

    #[test]
    fn backoff_grows_with_attempts() {
        let first = backoff(0);
        let third = backoff(2);
        assert!(first >= Duration::from_millis(800));
        assert!(third >= Duration::from_millis(3200));
        assert!(third < Duration::from_millis(3400));
    }
}
