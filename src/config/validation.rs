//! Configuration validation.
//!
//! Serde handles syntax; this checks meaning. Every problem is collected so
//! a broken file is reported in one go, before the server starts.

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::proxy::validate::PathValidator;

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("upstream.base_url is required")]
    MissingBaseUrl,

    #[error("upstream.base_url `{0}` must be an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("upstream.path_pattern does not compile: {0}")]
    InvalidPattern(String),

    #[error("{field} `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("forwarding.session_header `{0}` is not a valid header name")]
    InvalidSessionHeader(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("timeouts.request_secs ({request}) must exceed timeouts.upstream_secs ({upstream})")]
    RequestTimeoutTooShort { request: u64, upstream: u64 },
}

/// Validate the whole configuration, returning every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base_url = config.upstream.base_url.trim();
    if base_url.is_empty() {
        errors.push(ValidationError::MissingBaseUrl);
    } else {
        match url::Url::parse(base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::InvalidBaseUrl(base_url.to_string())),
        }
    }

    if let Err(e) = PathValidator::new(&config.upstream.path_pattern) {
        errors.push(ValidationError::InvalidPattern(e.to_string()));
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.forwarding.share_session
        && HeaderName::from_bytes(config.forwarding.session_header.as_bytes()).is_err()
    {
        errors.push(ValidationError::InvalidSessionHeader(
            config.forwarding.session_header.clone(),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    // Upstream timeouts must surface through the encoder, not the host's 408.
    let (request, upstream) = (config.timeouts.request_secs, config.timeouts.upstream_secs);
    if request != 0 && upstream != 0 && request <= upstream {
        errors.push(ValidationError::RequestTimeoutTooShort { request, upstream });
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero("limits.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
