//! CoinLedger Server Binary
//!
//! Serves a single ledger over HTTP/JSON.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use coinledger_server::config::LogFormat;
use coinledger_server::service::open_ledger;
use coinledger_server::{http, LedgerService, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Initialize logging
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .init();

    info!("Starting CoinLedger server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let ledger = open_ledger(&config.storage).await?;
    let service = Arc::new(LedgerService::new(ledger));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    service.start();

    info!(
        listen_addr = %listener.local_addr()?,
        storage = %config.storage.kind,
        "CoinLedger server running"
    );

    axum::serve(listener, http::router(service.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.stop();
    info!("CoinLedger server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
