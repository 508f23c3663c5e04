//! Single-endpoint HTTP forwarding proxy.
//!
//! Requests are validated against a path pattern, forwarded to one upstream
//! base URL, and the answer is reshaped as JSON, JSONP or a native
//! passthrough. The pipeline lives in [`proxy`]; [`http`] hosts it on axum.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{InboundRequest, ProxyConfig, ProxyHandler, ProxyResult, ResponseMode};
