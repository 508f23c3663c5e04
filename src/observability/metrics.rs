//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, mode, status
//! - `proxy_request_duration_seconds` (histogram): latency by mode
//! - `proxy_errors_total` (counter): failed requests by caller-visible status

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::proxy::{ErrorResult, ResponseMode};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, mode: ResponseMode, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "mode" => mode.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "mode" => mode.as_str())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that ended in an error envelope.
pub fn record_proxy_error(error: &ErrorResult) {
    let status = error
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "none".to_string());
    metrics::counter!("proxy_errors_total", "status" => status).increment(1);
}
