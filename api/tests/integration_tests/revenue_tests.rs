//! Integration tests for the revenue endpoints.

use axum::http::StatusCode;
use shared::chrono::{Days, Utc};
use shared::models::{RevenueAttributionRecord, RevenueSummaryRecord};
use shared::period::Period;
use shared::rollup::bucket_ranges;

use super::common::{get, test_app};

#[tokio::test]
async fn test_revenue_summary_with_roi() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    state
        .revenue_store()
        .insert_summaries(vec![RevenueSummaryRecord::new(
            today, 48_000.0, 52.0, 64.0, 5_000.0, 19_200.0, 284.0,
        )])
        .unwrap();

    let (status, response) = get(app, "/api/v1/revenue/summary").await;
    assert_eq!(status, StatusCode::OK);

    let data = &response["data"];
    assert_eq!(data["total_revenue_impact"], 48_000.0);
    assert_eq!(data["roi_percentage"], 284.0);
    assert_eq!(data["roi"], 2.84);
    // Uplift derived from the two order-value columns.
    let improvement = data["avg_order_value_improvement"].as_f64().unwrap();
    assert!((improvement - 23.0769).abs() < 0.001);
}

#[tokio::test]
async fn test_attribution_weekly_buckets_for_90d() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    // Daily attribution for one feature across the whole 90-day window.
    let rows: Vec<RevenueAttributionRecord> = (0..90)
        .map(|i| {
            let day = today.checked_sub_days(Days::new(i)).unwrap();
            RevenueAttributionRecord::new(day, "Chat Assistant", 10.0, Some(100.0))
        })
        .collect();
    state.revenue_store().insert_attribution(rows).unwrap();

    let (status, response) = get(app, "/api/v1/revenue/attribution?period=90d").await;
    assert_eq!(status, StatusCode::OK);

    let window = Period::NinetyDays.window(today);
    let expected = bucket_ranges(window.start, window.end, window.granularity).len();

    let points = response["data"].as_array().unwrap();
    assert_eq!(points.len(), expected);

    // Weekly sums: total revenue is preserved across buckets.
    let total: f64 = points
        .iter()
        .map(|p| p["revenue_amount"].as_f64().unwrap())
        .sum();
    assert!((total - 900.0).abs() < 1e-9);
}
