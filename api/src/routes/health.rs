//! Health check endpoint.
//!
//! Reports service liveness and store reachability. The frontend uses the
//! `database` field to distinguish "no data" from "backend unreachable".

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status: "healthy", or "degraded" when the store is down.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Store reachability: "connected" or "unreachable".
    pub database: &'static str,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check handler.
///
/// Probes the store and reports the combined service status. Always
/// returns 200; a down store is signalled in the body, not the status
/// code, so load balancers keep routing to a server that can still serve
/// its offline page.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_reachable = state.ops_store().ping().is_ok();

    Json(HealthResponse {
        status: if database_reachable { "healthy" } else { "degraded" },
        service: "shopsight-api",
        version: env!("CARGO_PKG_VERSION"),
        database: if database_reachable {
            "connected"
        } else {
            "unreachable"
        },
    })
}
