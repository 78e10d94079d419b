//! Rifa Server
//!
//! Main server process for the raffle platform.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env` if present)
//! - Opens the SQLite database and runs pending migrations
//! - Builds the participation service over the database
//! - Serves the HTTP API until Ctrl+C or SIGTERM
//!
//! # Usage
//!
//! ```bash
//! DATABASE_PATH=rifa.db RIFA_PORT=3000 cargo run --bin rifa-web
//! ```

use anyhow::Context;
use rifa_core::clock::SystemClock;
use rifa_sqlite::RaffleDatabase;
use rifa_web::{build_router, AppState, Config};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rifa_web=debug,rifa_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🎟️ Starting Rifa server...");

    // Load configuration
    let config = Config::from_env();
    info!(
        address = %config.bind_addr(),
        database = %config.database.path,
        max_attempts = config.rate_limit.max_attempts,
        window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    // Open the database (runs migrations)
    let database = if config.database.is_in_memory() {
        RaffleDatabase::open_in_memory().await
    } else {
        RaffleDatabase::open(Path::new(&config.database.path)).await
    }
    .context("failed to open the raffle database")?;
    info!("✓ Database ready");

    let state = AppState::new(
        database,
        config.rate_limit.policy(),
        Arc::new(SystemClock),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(address = %config.bind_addr(), "🎟️ Rifa server is running!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// Returns when the process receives SIGINT (Ctrl+C) or SIGTERM. A handler
/// that fails to install is logged and parked, so the other signal still
/// shuts the server down.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        () = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
