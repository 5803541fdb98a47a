//! Integration tests against a real `ClickHouse` instance.
//!
//! These tests require a running `ClickHouse` server with the dashboard
//! schema applied, reachable via the `SHOPSIGHT_DB_*` environment
//! variables. Run with: `cargo test -- --ignored`

use axum::http::StatusCode;
use shared::chrono::Utc;
use shared::models::KpiRecord;

use super::common::{get, test_app_with_clickhouse};

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires running ClickHouse instance"]
async fn test_health_reports_connected_database() {
    let (app, _state) = test_app_with_clickhouse();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["database"], "connected");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires running ClickHouse instance"]
async fn test_kpi_write_read_round_trip() {
    let (app, state) = test_app_with_clickhouse();
    let today = Utc::now().date_naive();

    state
        .overview_store()
        .insert_kpis(vec![KpiRecord::new(today, 1234, 3.3, 42, 777.0)])
        .unwrap();

    let (status, response) = get(app, "/api/v1/overview/kpis?period=7d").await;
    assert_eq!(status, StatusCode::OK);
    assert!(response["success"].as_bool().unwrap());
    assert!(response["data"]["ai_interactions"].as_i64().unwrap() >= 42);
}
