//! ChainAlert relay.
//!
//! ```text
//! chainalert --ws-url wss://... --pools '[{"address":"0x..","name":"USDC Vault"}]' \
//!            --event-signature 'Deposit(address indexed sender, address indexed owner, uint256 assets, uint256 shares)'
//! ```
//!
//! Runs the log relay in the background and serves the liveness endpoint
//! until Ctrl-C or SIGTERM. In-flight alerts are not awaited on shutdown.

use anyhow::{Context, Result};
use chainalert_observability::init_tracing;
use chainalert_stream::{Dispatcher, EvmWsListener, LogListener};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod health;

use config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_config()).context("failed to install tracing subscriber")?;
    cli.validate()?;

    let ctx = Arc::new(cli.relay_context()?);
    let listener: Arc<dyn LogListener> = Arc::new(EvmWsListener::new(cli.ws_url.trim()));
    let dispatcher = Dispatcher::new(ctx, Arc::clone(&listener));

    let relay = tokio::spawn(async move {
        match dispatcher.run().await {
            Ok(stats) => warn!(?stats, "log relay stopped"),
            Err(e) => error!(error = %e, "log relay failed to start"),
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let tcp = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind liveness endpoint on {addr}"))?;
    info!(%addr, "liveness endpoint listening");

    axum::serve(tcp, health::router(listener))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("liveness endpoint failed")?;

    relay.abort();
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
