//! Shopsight API Server
//!
//! This crate provides the HTTP server for the Shopsight analytics
//! dashboard. It exposes read-oriented query endpoints over the stored
//! metric families (KPIs, funnel, customers, revenue, AI performance,
//! realtime health, billing), shaped for the charting frontend.
//!
//! # Architecture
//!
//! The server is built on Axum and Tokio. Each dashboard page has a route
//! module; every period-scoped handler resolves its reporting window,
//! loads the relevant rows, and reduces them with the shared rollup
//! engine. All responses use a uniform `{ success, data, message }`
//! envelope.
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod db;
mod response;
mod routes;
mod state;

pub use config::{Config, StoreBackend};
pub use db::{Database, DatabaseConfig};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the Shopsight API server.
///
/// Initializes the server with configuration from environment variables,
/// connects the configured store backend, and listens for incoming
/// connections until a SIGTERM/SIGINT arrives.
///
/// A `ClickHouse` backend that is unreachable at startup does not abort
/// the server; the health endpoint reports the store as unreachable until
/// it comes back.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;

    let state = match config.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory stores");
            AppState::with_in_memory_store()
        }
        StoreBackend::ClickHouse => {
            let db_config = DatabaseConfig::from_env()?;
            let database = Database::new(&db_config);
            if let Err(err) = database.ping().await {
                tracing::warn!(%err, "ClickHouse unreachable at startup");
            }
            AppState::with_clickhouse(&database)
        }
    };

    run_server_with_config(config, state).await
}

/// Runs the Shopsight API server with the provided configuration and state.
///
/// This is useful for testing or when you want to provide configuration
/// programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config, state: AppState) -> Result<()> {
    let addr = config.socket_addr();

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Shopsight API server starting"
    );

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::overview_routes(state.clone()))
        .merge(routes::customer_routes(state.clone()))
        .merge(routes::revenue_routes(state.clone()))
        .merge(routes::ai_routes(state.clone()))
        .merge(routes::realtime_routes(state.clone()))
        .merge(routes::billing_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
