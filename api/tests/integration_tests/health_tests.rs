//! Integration tests for health check and general API behavior.
//!
//! Tests cover:
//! - Health check endpoint and store reachability field
//! - Empty store behavior across the read endpoints

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "shopsight-api");
    assert_eq!(response["database"], "connected");
}

#[tokio::test]
async fn test_empty_stores_return_empty_results() {
    let (app, _state) = test_app();

    // KPI endpoint: zero-valued object, not an error.
    let (status, response) = get(app.clone(), "/api/v1/overview/kpis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["total_customers"], 0);

    // Time-series endpoints: empty arrays.
    for uri in [
        "/api/v1/overview/conversion-trends",
        "/api/v1/overview/funnel",
        "/api/v1/customers/segments",
        "/api/v1/customers/concerns",
        "/api/v1/customers/lifetime-value",
        "/api/v1/revenue/attribution",
        "/api/v1/ai/model-performance",
        "/api/v1/ai/feature-performance",
        "/api/v1/realtime/system-health",
        "/api/v1/billing/usage",
    ] {
        let (status, response) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(response["success"], true, "{uri}");
        assert!(response["data"].as_array().unwrap().is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn test_all_periods_accepted_everywhere() {
    let (app, _state) = test_app();

    for period in ["7d", "30d", "90d", "1y", "bogus"] {
        let uri = format!("/api/v1/overview/kpis?period={period}");
        let (status, response) = get(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::OK, "{period}");
        assert_eq!(response["success"], true, "{period}");
    }
}
