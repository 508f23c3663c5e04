//! Writing a `ProxyResult` back to the client.
//!
//! # Responsibilities
//! - Status code plus the exact whitelisted reason phrase (HTTP/1 only)
//! - Content type chosen by the encoder
//! - Upstream headers selected for passthrough
//!
//! # Design Decisions
//! - Headers that cannot be represented are dropped with a warning, never
//!   fail the response

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::ext::ReasonPhrase;

use crate::proxy::ProxyResult;

impl IntoResponse for ProxyResult {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::from_u16(self.status.code()).unwrap_or(StatusCode::OK);

        if let Ok(reason) = ReasonPhrase::try_from(self.status.reason().as_bytes()) {
            response.extensions_mut().insert(reason);
        }

        let headers = response.headers_mut();
        if let Some(content_type) = self.content_type {
            match HeaderValue::from_str(&content_type) {
                Ok(value) => {
                    headers.insert(header::CONTENT_TYPE, value);
                }
                Err(_) => tracing::warn!(content_type = %content_type, "Invalid content type"),
            }
        }

        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping unrepresentable upstream header"),
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{ErrorResult, StatusLine};
    use axum::body::Bytes;

    fn result(status: StatusLine) -> ProxyResult {
        ProxyResult {
            status,
            content_type: None,
            headers: Vec::new(),
            body: Bytes::from_static(b"body"),
            error: None,
        }
    }

    #[test]
    fn test_reason_phrase_is_attached() {
        let response = result(StatusLine::for_code(420)).into_response();
        assert_eq!(response.status().as_u16(), 420);
        let reason = response.extensions().get::<ReasonPhrase>().unwrap();
        assert_eq!(reason.as_bytes(), b"Enhance Your Calm");
    }

    #[test]
    fn test_headers_are_written() {
        let mut proxied = result(StatusLine::OK);
        proxied.headers = vec![
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("Set-Cookie".to_string(), "a=1".to_string()),
            ("Set-Cookie".to_string(), "b=2".to_string()),
            ("Bad Name".to_string(), "x".to_string()),
        ];

        let response = proxied.into_response();
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_native_error_status() {
        let mut failed = result(StatusLine::for_code(404));
        failed.content_type = Some("text/html; charset=UTF-8".to_string());
        failed.error = Some(ErrorResult::from_upstream_status(404));

        let response = failed.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=UTF-8"
        );
    }
}
