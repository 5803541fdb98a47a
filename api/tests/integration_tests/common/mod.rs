//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration
//! tests, including test app setup and HTTP request helpers.

use api::{create_router, AppState, Database, DatabaseConfig};
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;

/// Creates a test router with fresh in-memory stores.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_in_memory_store();
    let router = create_router(state.clone());
    (router, state)
}

/// Creates a test router backed by the `ClickHouse` instance configured via
/// `SHOPSIGHT_DB_*` environment variables.
///
/// Only used by `#[ignore]`d tests that require a running server.
pub fn test_app_with_clickhouse() -> (Router, AppState) {
    let config = DatabaseConfig::from_env().expect("Failed to load database config");
    let database = Database::new(&config);
    let state = AppState::with_clickhouse(&database);
    let router = create_router(state.clone());
    (router, state)
}

/// Helper to make a GET request.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to GET from
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get_raw(app, uri).await;
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Helper to make a GET request and return the raw body bytes.
///
/// Used by the idempotence tests, which compare payloads byte for byte.
pub async fn get_raw(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, body_bytes)
}
