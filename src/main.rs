//! Gatekeeper
//!
//! Rate limiting and session or token authentication in front of a small
//! account API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id → trace → timeout
//!                       │
//!                       ▼
//!                 ┌───────────┐  429 / 500
//!                 │ admission │──────────────▶
//!                 └─────┬─────┘
//!                       ▼
//!                 ┌───────────────┐  401
//!                 │ session|token │──────────────▶
//!                 └─────┬─────────┘
//!                       ▼
//!                 /user/* handlers (+ refreshed credential)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gatekeeper::config::load_or_default;
use gatekeeper::lifecycle::{shutdown_signal, Shutdown};
use gatekeeper::observability::{logging, metrics};
use gatekeeper::HttpServer;

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Admission control and authentication gateway", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted; token mode
    /// still needs a signing key from the file or GATEKEEPER_SIGNING_KEY.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;

    logging::init_tracing(Some(&config.observability.log_level));
    tracing::info!("gatekeeper v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        auth_mode = ?config.auth.mode,
        rate_limit = config.rate_limit.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config).await?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
