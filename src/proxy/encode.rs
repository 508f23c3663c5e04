//! Rendering results into the caller-visible payload.

use axum::body::Bytes;
use serde::de::IgnoredAny;
use serde_json::{json, Value};

use super::status::StatusLine;
use super::types::{ErrorResult, ProxyResult, ResponseMode};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const SCRIPT_CONTENT_TYPE: &str = "application/x-javascript";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Per-request encoding inputs.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'a> {
    pub mode: ResponseMode,
    pub xhr: bool,
    /// Only honoured in JSONP mode.
    pub callback: Option<&'a str>,
}

impl<'a> Encoder<'a> {
    pub fn new(mode: ResponseMode, xhr: bool, callback: Option<&'a str>) -> Self {
        let callback = callback.filter(|cb| mode == ResponseMode::Jsonp && !cb.is_empty());
        Self { mode, xhr, callback }
    }

    /// Render a successful upstream body with its passthrough headers.
    pub fn success(&self, headers: Vec<(String, String)>, body: &[u8]) -> ProxyResult {
        match self.mode {
            ResponseMode::Native => ProxyResult {
                status: StatusLine::OK,
                content_type: None,
                headers,
                body: Bytes::copy_from_slice(body),
                error: None,
            },
            ResponseMode::Json | ResponseMode::Jsonp => ProxyResult {
                status: StatusLine::OK,
                content_type: Some(self.script_content_type().to_string()),
                headers,
                body: Bytes::from(self.wrap(json_payload(body))),
                error: None,
            },
        }
    }

    /// Render an error in the same envelope a success would use.
    pub fn error(&self, error: ErrorResult) -> ProxyResult {
        match self.mode {
            ResponseMode::Native => ProxyResult {
                status: error
                    .status_code
                    .map(StatusLine::for_code)
                    .unwrap_or_default(),
                content_type: Some(HTML_CONTENT_TYPE.to_string()),
                headers: Vec::new(),
                body: Bytes::from(format!("<h1>{}</h1>", error.error_text)),
                error: Some(error),
            },
            ResponseMode::Json | ResponseMode::Jsonp => {
                let mut envelope = json!({
                    "error": true,
                    "errorCode": error.error_code,
                    "errorText": error.error_text,
                });
                if let Some(code) = error.status_code {
                    envelope["statusCode"] = json!(code);
                }

                // Script-tag consumers cannot read non-200 bodies, so the
                // status travels inside the envelope.
                ProxyResult {
                    status: StatusLine::OK,
                    content_type: Some(self.script_content_type().to_string()),
                    headers: Vec::new(),
                    body: Bytes::from(self.wrap(envelope.to_string())),
                    error: Some(error),
                }
            }
        }
    }

    fn wrap(&self, payload: String) -> String {
        match self.callback {
            Some(callback) => format!("{}({})", callback, payload),
            None => payload,
        }
    }

    fn script_content_type(&self) -> &'static str {
        if self.xhr {
            JSON_CONTENT_TYPE
        } else {
            SCRIPT_CONTENT_TYPE
        }
    }
}

/// The upstream text itself when it is valid JSON, a JSON string literal
/// otherwise. Valid bodies are only checked, never re-serialized, so numbers
/// and duplicate keys reach the caller exactly as sent.
fn json_payload(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match serde_json::from_str::<IgnoredAny>(&text) {
        Ok(_) => text.trim().to_string(),
        Err(_) => Value::String(text.into_owned()).to_string(),
    }
}
