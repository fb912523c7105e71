//! Tiffin HTTP server.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing            env-filter, RUST_LOG                             │
//! │  2. config             environment variables with defaults              │
//! │  3. database           SQLite open + migrations                         │
//! │  4. kitchen bus        broadcast channel                                │
//! │  5. router             axum over Arc<AppState>                          │
//! │  6. serve              graceful shutdown on ctrl-c / SIGTERM            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod bus;
mod config;
mod error;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tiffin_db::{Database, DbConfig};

use crate::auth::JwtManager;
use crate::bus::KdsBus;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tiffin_server=debug")),
        )
        .init();

    if let Err(e) = run().await {
        error!("Fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    info!(port = config.http_port, db = %config.database_path, "Starting Tiffin server");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    let bus = KdsBus::new(config.kds_bus_capacity);
    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

    let state = Arc::new(AppState::new(db, bus, jwt, config.clone()));
    let router = routes::build_router(state.clone());

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database");
    state.db.close().await;

    Ok(())
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
