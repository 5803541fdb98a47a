//! Integration tests for the billing endpoints.

use axum::http::StatusCode;
use shared::chrono::NaiveDate;
use shared::models::{BillingSummaryRecord, UsageRecord};

use super::common::{get, test_app};

#[tokio::test]
async fn test_billing_summary_and_usage() {
    let (app, state) = test_app();

    let ends = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    state
        .ops_store()
        .set_billing_summary(BillingSummaryRecord::new("Growth", 499.0, 31_500, 50_000, ends))
        .unwrap();
    state
        .ops_store()
        .insert_usage(vec![
            UsageRecord::new("2024-05", 28_000, 460.0),
            UsageRecord::new("2024-06", 31_500, 499.0),
        ])
        .unwrap();

    let (status, response) = get(app.clone(), "/api/v1/billing/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["plan_name"], "Growth");
    assert_eq!(response["data"]["api_calls_used"], 31_500);
    assert_eq!(response["data"]["period_ends"], "2024-12-31");

    let (status, response) = get(app, "/api/v1/billing/usage").await;
    assert_eq!(status, StatusCode::OK);
    let months = response["data"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["month"], "2024-05");
}
