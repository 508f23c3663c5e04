//! simple-proxy
//!
//! Forwards browser requests to a single upstream API and reshapes the
//! response, so cross-origin clients can reach it through one endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 SIMPLE PROXY                 │
//!                         │                                              │
//!   Client Request        │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!   ──────────────────────┼─▶│  http  │──▶│ validate │──▶│ url +     │   │
//!                         │  │ server │   │   path   │   │ forward   │   │
//!                         │  └────────┘   └──────────┘   └─────┬─────┘   │
//!                         │                                    │         │
//!                         │                                    ▼         │
//!   Client Response       │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!   ◀─────────────────────┼──│ encode │◀──│  split + │◀──│ transport │◀──┼── Upstream
//!                         │  │ status │   │ headers  │   │ (reqwest) │   │
//!                         │  └────────┘   └──────────┘   └───────────┘   │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use simple_proxy::config::{read_config, validate_config, ConfigError, ServerConfig};
use simple_proxy::observability::{logging, metrics};
use simple_proxy::{HttpServer, ResponseMode, Shutdown};

#[derive(Parser)]
#[command(name = "simple-proxy")]
#[command(about = "Single-endpoint forwarding proxy for cross-origin API calls", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream base URL (overrides upstream.base_url)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Response mode: json, jsonp or native (overrides upstream.response_mode)
    #[arg(short, long)]
    mode: Option<ResponseMode>,

    /// Bind address (overrides listener.bind_address)
    #[arg(long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(base_url) = self.base_url {
            config.upstream.base_url = base_url;
        }
        if let Some(mode) = self.mode {
            config.upstream.response_mode = mode;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability);

    tracing::info!("simple-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        mode = %config.upstream.response_mode,
        path_pattern = %config.upstream.path_pattern,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Build before binding so a bad upstream never opens a port
    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
