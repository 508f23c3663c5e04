//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::proxy::{ProxyConfig, ProxyError, ResponseMode};

/// Root configuration for the proxy server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Cookie, session and method forwarding rules.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// Build the immutable pipeline config. Fails on an empty base URL or a
    /// bad path pattern.
    pub fn proxy_config(&self) -> Result<ProxyConfig, ProxyError> {
        Ok(ProxyConfig::new(self.upstream.base_url.clone())?
            .with_response_mode(self.upstream.response_mode)
            .with_path_pattern(&self.upstream.path_pattern)?
            .with_accept_invalid_certs(self.upstream.accept_invalid_certs)
            .with_cookie_forwarding(self.forwarding.cookies)
            .with_session_sharing(self.forwarding.share_session)
            .with_put_as_delete(self.forwarding.put_as_delete))
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL the sub-path is appended to (required).
    pub base_url: String,

    /// json, jsonp or native.
    pub response_mode: ResponseMode,

    /// Regular expression every sub-path must match.
    pub path_pattern: String,

    /// Skip certificate verification for HTTPS upstreams.
    pub accept_invalid_certs: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            response_mode: ResponseMode::Json,
            path_pattern: crate::proxy::validate::MATCH_ANY.to_string(),
            accept_invalid_certs: true,
        }
    }
}

/// Forwarding rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Forward inbound cookies and pass `Set-Cookie` back.
    pub cookies: bool,

    /// Append the session token to forwarded cookies.
    pub share_session: bool,

    /// Inbound header carrying the `name=value` session token.
    pub session_header: String,

    /// Forward PUT as DELETE (legacy behavior).
    pub put_as_delete: bool,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            cookies: false,
            share_session: false,
            session_header: "x-proxy-session".to_string(),
            put_as_delete: true,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Upstream call timeout (redirects included) in seconds.
    pub upstream_secs: u64,

    /// Total inbound request timeout in seconds.
    pub request_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn upstream(&self) -> Duration {
        Duration::from_secs(self.upstream_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 35,
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// pretty or json.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
