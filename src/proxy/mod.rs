//! Request forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → validate.rs (sub-path against configured pattern)
//!     → url.rs (base URL + sub-path + query)
//!     → forward.rs (method, body, cookies, user agent)
//!     → transport.rs (single outbound call)
//!     → split.rs (header block / body)
//!     → headers.rs (passthrough selection)
//!     → encode.rs + status.rs (json / jsonp / native rendering)
//!     → ProxyResult
//! ```
//!
//! # Design Decisions
//! - Strictly linear: any failure short-circuits to the encoder
//! - Errors and successes share one envelope per response mode
//! - Only `ProxyConfig` is shared between requests, and it is immutable
//! - The pipeline returns a value; writing it out is the host's job

pub mod config;
pub mod encode;
pub mod error;
pub mod forward;
pub mod headers;
pub mod split;
pub mod status;
pub mod transport;
pub mod types;
pub mod url;
pub mod validate;

use std::sync::Arc;

pub use config::ProxyConfig;
pub use encode::Encoder;
pub use error::ProxyError;
pub use status::StatusLine;
pub use transport::{OutboundMethod, OutboundRequest, ReqwestTransport, Transport};
pub use types::{
    ErrorResult, InboundMethod, InboundRequest, Params, ProxyResult, ResponseMode,
    UpstreamResponse,
};

use crate::observability::metrics;

/// Forwards requests to one upstream and reshapes the answer.
pub struct ProxyHandler {
    config: ProxyConfig,
    transport: Arc<dyn Transport>,
}

impl ProxyHandler {
    pub fn new(config: ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        if config.skips_tls_verification() {
            tracing::warn!(
                base_url = %config.base_url(),
                "TLS certificate verification is disabled for this upstream; this is insecure"
            );
        }
        Self { config, transport }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run one request through the pipeline.
    pub async fn handle(&self, request: &InboundRequest) -> ProxyResult {
        let upstream = match self.forward(request).await {
            Ok(upstream) => upstream,
            Err(error) => return self.reject(request, error),
        };

        let mode = self.config.response_mode();
        let encoder = Encoder::new(mode, request.is_xhr(), request.jsonp_callback.as_deref());
        let split = split::split_upstream(&upstream);
        let passthrough = headers::propagate(mode, self.config.forward_cookies(), split.header_lines());
        encoder.success(passthrough, split.body)
    }

    /// Render `error` for `request` in the configured response mode.
    ///
    /// Also used by the host for failures that happen before the pipeline
    /// runs, so every error reaches the caller in the same shape.
    pub fn reject(&self, request: &InboundRequest, error: ErrorResult) -> ProxyResult {
        tracing::warn!(
            path = %request.sub_path,
            status = ?error.status_code,
            error = %error.error_text,
            "Proxy request failed"
        );
        metrics::record_proxy_error(&error);

        let encoder = Encoder::new(
            self.config.response_mode(),
            request.is_xhr(),
            request.jsonp_callback.as_deref(),
        );
        encoder.error(error)
    }

    async fn forward(&self, request: &InboundRequest) -> Result<UpstreamResponse, ErrorResult> {
        if !self.config.validator().permits(&request.sub_path) {
            return Err(ErrorResult::invalid_path());
        }

        let url = url::compose_url(self.config.base_url(), &request.sub_path, &request.query);
        let outbound = forward::build_request(&self.config, request, url);

        tracing::debug!(
            method = ?outbound.method,
            url = %outbound.url,
            "Forwarding upstream"
        );

        let upstream = self.transport.execute(outbound).await;
        forward::classify(&upstream)?;

        tracing::debug!(
            status = upstream.status_code,
            bytes = upstream.raw_body.len(),
            "Upstream responded"
        );
        Ok(upstream)
    }
}

impl std::fmt::Debug for ProxyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
