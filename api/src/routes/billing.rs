//! Billing endpoints: the plan snapshot and the monthly usage breakdown.

use crate::response::{store_failure, ApiResponse};
use crate::state::AppState;
use axum::{extract::State, response::Response, routing::get, Router};

/// Creates the billing routes.
///
/// # Routes
///
/// - `GET /api/v1/billing/summary` - current plan snapshot
/// - `GET /api/v1/billing/usage` - monthly usage breakdown
pub fn billing_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/billing/summary", get(billing_summary))
        .route("/api/v1/billing/usage", get(usage_breakdown))
        .with_state(state)
}

/// The plan snapshot; `data` is null when none has been recorded yet.
async fn billing_summary(State(state): State<AppState>) -> Response {
    match state.ops_store().billing_summary() {
        Ok(summary) => ApiResponse::ok(summary),
        Err(err) => store_failure(&err),
    }
}

async fn usage_breakdown(State(state): State<AppState>) -> Response {
    match state.ops_store().usage_breakdown() {
        Ok(rows) => ApiResponse::ok(rows),
        Err(err) => store_failure(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use shared::models::{BillingSummaryRecord, UsageRecord};
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_billing_summary_round_trip() {
        let state = AppState::with_in_memory_store();
        let ends = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        state
            .ops_store()
            .set_billing_summary(BillingSummaryRecord::new("Growth", 499.0, 12_000, 50_000, ends))
            .unwrap();

        let app = billing_routes(state);
        let json = get_json(app, "/api/v1/billing/summary").await;

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["plan_name"], "Growth");
        assert_eq!(json["data"]["api_calls_limit"], 50_000);
    }

    #[tokio::test]
    async fn test_billing_summary_null_when_unset() {
        let app = billing_routes(AppState::with_in_memory_store());
        let json = get_json(app, "/api/v1/billing/summary").await;

        assert_eq!(json["success"], true);
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_usage_breakdown_month_order() {
        let state = AppState::with_in_memory_store();
        state
            .ops_store()
            .insert_usage(vec![
                UsageRecord::new("2024-05", 8000, 80.0),
                UsageRecord::new("2024-04", 7000, 70.0),
            ])
            .unwrap();

        let app = billing_routes(state);
        let json = get_json(app, "/api/v1/billing/usage").await;

        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows[0]["month"], "2024-04");
        assert_eq!(rows[1]["month"], "2024-05");
    }
}
