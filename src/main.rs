//! rfcloud Binary Entry Point
//!
//! This binary runs the RF reading ingestion and query service.
//! Core functionality is provided by the `rfcloud` library crate.

use clap::Parser;
use rfcloud::{
    config::AppConfig,
    server::{AppState, create_router},
    storage::{Connector, DB_URL_ENV, ReadingStore},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// rfcloud - RF Reading Ingestion & Query Service
#[derive(Parser, Debug)]
#[command(name = "rfcloud", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "RFCLOUD_CONFIG")]
    config: Option<String>,

    /// Server bind address (overrides config file)
    #[arg(long, env = "RFCLOUD_SERVER_BIND")]
    server_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "RFCLOUD_SERVER_PORT")]
    server_port: Option<u16>,

    /// Database URL (overrides config file and RFCLOUD_DB_URL)
    #[arg(long)]
    db_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rfcloud=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("rfcloud - RF Reading Ingestion & Query Service");

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file, or run on defaults
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(bind) = cli.server_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.server_port {
        config.server.port = port;
    }
    if let Some(url) = cli.db_url {
        config.database.url = Some(url);
    }
    config.validate()?;

    // Build the lazy storage connector; the first request pays the connect
    let connector = match config.database.url.clone() {
        Some(url) => {
            tracing::info!("Database URL configured, connecting on first use");
            Connector::with_url(url)
        }
        None => {
            if std::env::var(DB_URL_ENV).is_err() {
                tracing::warn!(
                    "No database URL configured; operations will fail until {DB_URL_ENV} is set"
                );
            }
            Connector::from_env()
        }
    };

    let store = ReadingStore::new(Arc::new(connector));

    // Build Axum router
    let app = create_router(AppState { store });

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The storage handle is reclaimed by process exit, not closed here.
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
