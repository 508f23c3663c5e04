//! Construction-time errors for the proxy pipeline.

use thiserror::Error;

/// Errors raised while building a [`ProxyConfig`](super::ProxyConfig).
///
/// These are fatal: a handler is never created from a config that failed
/// to build, so no request ever observes a misconfiguration.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream base URL was empty.
    #[error("You must provide the base API url")]
    EmptyBaseUrl,

    /// The path validation pattern did not compile.
    #[error("Invalid path validation pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A response mode name outside json, jsonp and native.
    #[error("Unknown response mode `{0}` (expected json, jsonp or native)")]
    UnknownMode(String),
}
