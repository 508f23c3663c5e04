//! Request handling and translation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Turn the axum request into the explicit `InboundRequest` the pipeline
//!   consumes: path, method, query, form body, cookies, headers
//!
//! # Design Decisions
//! - Only form-encoded bodies become body parameters; other bodies are dropped
//! - The JSONP callback is read from the `callback` query parameter and is
//!   still forwarded upstream with the rest of the query

use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;

use crate::config::ForwardingConfig;
use crate::proxy::{InboundMethod, InboundRequest, Params};

pub const X_REQUEST_ID: &str = "x-request-id";

const CALLBACK_PARAM: &str = "callback";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID set by the middleware, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Build the pipeline's view of an inbound request.
pub fn inbound_request(parts: &Parts, body: &[u8], forwarding: &ForwardingConfig) -> InboundRequest {
    let query = parts
        .uri
        .query()
        .map(|q| parse_pairs(q.as_bytes()))
        .unwrap_or_default();

    // last occurrence wins, like most form parsers
    let jsonp_callback = query
        .iter()
        .rev()
        .find(|(k, _)| k == CALLBACK_PARAM)
        .map(|(_, v)| v.clone());

    let body = if is_form(&parts.headers) {
        parse_pairs(body)
    } else {
        Vec::new()
    };

    let session_token = if forwarding.share_session {
        parts
            .headers
            .get(forwarding.session_header.as_str())
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    InboundRequest {
        sub_path: parts.uri.path().to_string(),
        method: InboundMethod::from_method(&parts.method),
        query,
        body,
        cookies: parse_cookies(&parts.headers),
        headers: parts.headers.clone(),
        jsonp_callback,
        session_token,
    }
}

fn parse_pairs(input: &[u8]) -> Params {
    form_urlencoded::parse(input).into_owned().collect()
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

/// Cookie pairs from every `Cookie` header, values kept as sent.
fn parse_cookies(headers: &HeaderMap) -> Params {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}
