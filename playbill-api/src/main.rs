//! Playbill API server - main entry point
//!
//! Resolves bootstrap configuration (CLI, environment, TOML file, defaults),
//! opens the SQLite graph store and serves the HTTP API until Ctrl+C or
//! SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use playbill_api::{build_router, AppState};
use playbill_common::config::{resolve_bootstrap, TomlConfig};
use playbill_common::db::init_database;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for playbill-api
#[derive(Parser, Debug)]
#[command(name = "playbill-api")]
#[command(about = "Theatre graph service for Playbill")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PLAYBILL_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "PLAYBILL_DATABASE")]
    database: Option<PathBuf>,

    /// TOML bootstrap file (defaults to ~/.config/playbill/config.toml)
    #[arg(short, long, env = "PLAYBILL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration file")?;
    let config = resolve_bootstrap(args.database, args.port, toml_config.as_ref());

    // Initialize tracing; RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("playbill_api={level},tower_http={level}", level = config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Playbill API v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_path.display()))?;
    info!("Database ready");

    let app = build_router(AppState::new(pool));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
