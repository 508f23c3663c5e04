//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy endpoint and health route
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Translate each request for the proxy pipeline and write its result
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ForwardingConfig, ServerConfig};
use crate::http::request::{inbound_request, request_id, MakeRequestUuidV4};
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::observability::metrics;
use crate::proxy::{
    ErrorResult, ProxyError, ProxyHandler, ReqwestTransport, ResponseMode, Transport,
};

/// Path of the built-in health route; never forwarded upstream.
pub const HEALTH_PATH: &str = "/_proxy/health";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ProxyHandler>,
    pub forwarding: Arc<ForwardingConfig>,
    pub max_body_size: usize,
}

/// HTTP server hosting the proxy endpoint.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server forwarding through reqwest.
    ///
    /// Fails when the upstream settings cannot produce a `ProxyConfig`.
    pub fn new(config: ServerConfig) -> Result<Self, ProxyError> {
        let transport = Arc::new(ReqwestTransport::new(
            config.timeouts.connect(),
            config.timeouts.upstream(),
        ));
        Self::with_transport(config, transport)
    }

    /// Create a server forwarding through the given transport.
    pub fn with_transport(
        config: ServerConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProxyError> {
        let proxy = Arc::new(ProxyHandler::new(config.proxy_config()?, transport));

        let state = AppState {
            proxy,
            forwarding: Arc::new(config.forwarding.clone()),
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route(HEALTH_PATH, get(health_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(config.timeouts.request()))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run the server until Ctrl+C or the shutdown receiver fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            mode = %self.config.upstream.response_mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub mode: ResponseMode,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.proxy.config().response_mode(),
    })
}

/// Proxy endpoint: every method, every path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();
    let method = parts.method.to_string();

    let result = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(body) => {
            let inbound = inbound_request(&parts, &body, &state.forwarding);
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %inbound.sub_path,
                "Proxying request"
            );
            state.proxy.handle(&inbound).await
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            let inbound = inbound_request(&parts, &[], &state.forwarding);
            state.proxy.reject(&inbound, ErrorResult::unreadable_body())
        }
    };

    metrics::record_request(
        &method,
        state.proxy.config().response_mode(),
        result.status.code(),
        start_time,
    );

    result.into_response()
}
