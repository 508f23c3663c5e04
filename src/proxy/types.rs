//! Per-request values flowing through the pipeline.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};

use super::error::ProxyError;
use super::status::StatusLine;

/// How the upstream response is shaped for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Body re-serialized as JSON.
    #[default]
    Json,
    /// JSON wrapped in a callback invocation.
    Jsonp,
    /// Upstream body and selected headers mirrored as-is.
    Native,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Json => "json",
            ResponseMode::Jsonp => "jsonp",
            ResponseMode::Native => "native",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseMode {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseMode::Json),
            "jsonp" => Ok(ResponseMode::Jsonp),
            "native" => Ok(ResponseMode::Native),
            other => Err(ProxyError::UnknownMode(other.to_string())),
        }
    }
}

/// Methods the forwarder distinguishes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InboundMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl InboundMethod {
    /// Anything outside the five known methods is handled as GET.
    pub fn from_method(method: &Method) -> Self {
        match *method {
            Method::POST => InboundMethod::Post,
            Method::PUT => InboundMethod::Put,
            Method::DELETE => InboundMethod::Delete,
            Method::HEAD => InboundMethod::Head,
            _ => InboundMethod::Get,
        }
    }
}

/// Ordered key/value pairs, as received.
pub type Params = Vec<(String, String)>;

/// Everything the pipeline needs to know about the request being proxied.
///
/// The hosting layer builds one of these per request; the pipeline never
/// looks anywhere else for request data.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    /// Path following the base URL, e.g. `/users/42`.
    pub sub_path: String,
    pub method: InboundMethod,
    pub query: Params,
    /// Form parameters, forwarded for POST, PUT and DELETE.
    pub body: Params,
    pub cookies: Params,
    pub headers: HeaderMap,
    pub jsonp_callback: Option<String>,
    /// `name=value` session pair appended to forwarded cookies.
    pub session_token: Option<String>,
}

impl InboundRequest {
    pub fn new(sub_path: impl Into<String>) -> Self {
        Self {
            sub_path: sub_path.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: InboundMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.push((key.into(), value.into()));
        self
    }

    pub fn with_cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((key.into(), value.into()));
        self
    }

    /// Add a header; values that are not valid header text are dropped.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.append(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "Dropping invalid header value"),
        }
        self
    }

    pub fn with_jsonp_callback(mut self, callback: impl Into<String>) -> Self {
        self.jsonp_callback = Some(callback.into());
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// True when the request carries `X-Requested-With: XMLHttpRequest`.
    pub fn is_xhr(&self) -> bool {
        self.headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
            .unwrap_or(false)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|ua| !ua.is_empty())
    }
}

/// Error reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    pub error_code: String,
    pub error_text: String,
    pub status_code: Option<u16>,
}

impl ErrorResult {
    pub const BAD_REQUEST: &'static str = "badrequest";

    pub fn bad_request(error_text: impl Into<String>, status_code: u16) -> Self {
        Self {
            error_code: Self::BAD_REQUEST.to_string(),
            error_text: error_text.into(),
            status_code: Some(status_code),
        }
    }

    /// Sub-path rejected by the validation pattern.
    pub fn invalid_path() -> Self {
        Self::bad_request("Invalid API request URL.", 405)
    }

    /// The outbound call never completed.
    pub fn transport_failure() -> Self {
        Self::bad_request("Invalid API request.", 500)
    }

    /// The inbound body could not be read (too large or cut short).
    pub fn unreadable_body() -> Self {
        Self::bad_request("Invalid request body.", 400)
    }

    /// Upstream answered with a status other than success.
    pub fn from_upstream_status(status_code: u16) -> Self {
        match status_code {
            404 => Self::bad_request("API endpoint does not exist.", 404),
            500 => Self::bad_request("An unrecoverable error has occurred.", 500),
            code => Self::bad_request("An error has occurred.", code),
        }
    }
}

/// What the transport handed back for one outbound call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status_code: u16,
    /// Header lines, when the transport exposes them separately. When empty,
    /// `raw_body` is expected to carry the header block in front of the body.
    pub raw_header_block: String,
    pub raw_body: Bytes,
    /// The call itself could not complete.
    pub transport_failed: bool,
}

impl UpstreamResponse {
    pub fn failed() -> Self {
        Self {
            transport_failed: true,
            ..Default::default()
        }
    }
}

/// Fully rendered response, ready for the host to write out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResult {
    pub status: StatusLine,
    pub content_type: Option<String>,
    /// Upstream headers selected for passthrough, in upstream order.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    /// Set when the request failed; the body then holds the rendered error.
    pub error: Option<ErrorResult>,
}

impl ProxyResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("JSONP".parse::<ResponseMode>().unwrap(), ResponseMode::Jsonp);
        assert_eq!("native".parse::<ResponseMode>().unwrap(), ResponseMode::Native);
        assert!("xml".parse::<ResponseMode>().is_err());
    }

    #[test]
    fn test_unknown_methods_become_get() {
        assert_eq!(InboundMethod::from_method(&Method::PATCH), InboundMethod::Get);
        assert_eq!(InboundMethod::from_method(&Method::OPTIONS), InboundMethod::Get);
        assert_eq!(InboundMethod::from_method(&Method::HEAD), InboundMethod::Head);
    }

    #[test]
    fn test_xhr_detection_is_case_insensitive() {
        let req = InboundRequest::new("/")
            .with_header(HeaderName::from_static("x-requested-with"), "xmlhttprequest");
        assert!(req.is_xhr());

        let req = InboundRequest::new("/")
            .with_header(HeaderName::from_static("x-requested-with"), "fetch");
        assert!(!req.is_xhr());
        assert!(!InboundRequest::new("/").is_xhr());
    }

    #[test]
    fn test_upstream_status_errors() {
        assert_eq!(
            ErrorResult::from_upstream_status(404).error_text,
            "API endpoint does not exist."
        );
        assert_eq!(
            ErrorResult::from_upstream_status(500).error_text,
            "An unrecoverable error has occurred."
        );
        let other = ErrorResult::from_upstream_status(503);
        assert_eq!(other.error_text, "An error has occurred.");
        assert_eq!(other.status_code, Some(503));
        assert_eq!(other.error_code, "badrequest");
    }
}
