//! Integration tests for the customer endpoints.

use axum::http::StatusCode;
use shared::chrono::{Days, Utc};
use shared::models::{ClvRecord, ConcernRecord, SegmentRecord};

use super::common::{get, test_app};

#[tokio::test]
async fn test_segment_distribution_over_a_window() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    for i in 0..7 {
        let day = today.checked_sub_days(Days::new(i)).unwrap();
        state
            .customer_store()
            .insert_segments(vec![
                SegmentRecord::new(day, "New Customers", 100, Some(25.0), 60.0, 25.0),
                SegmentRecord::new(day, "Loyal Customers", 300, Some(75.0), 450.0, 80.0),
            ])
            .unwrap();
    }

    let (status, response) = get(app, "/api/v1/customers/segments?period=7d").await;
    assert_eq!(status, StatusCode::OK);

    let segments = response["data"].as_array().unwrap();
    assert_eq!(segments.len(), 2);
    // Ordered by total size, largest first.
    assert_eq!(segments[0]["segment_name"], "Loyal Customers");
    assert_eq!(segments[0]["segment_size"], 2100);
    assert_eq!(segments[0]["segment_percentage"], 75.0);
    assert_eq!(segments[1]["avg_lifetime_value"], 60.0);
}

#[tokio::test]
async fn test_concerns_limited_to_top_ten() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    let rows = (0..15)
        .map(|i| {
            ConcernRecord::new(
                today,
                format!("Concern {i:02}"),
                "General",
                100 - i64::from(i),
                Some(75.0),
            )
        })
        .collect();
    state.customer_store().insert_concerns(rows).unwrap();

    let (status, response) = get(app, "/api/v1/customers/concerns").await;
    assert_eq!(status, StatusCode::OK);

    let concerns = response["data"].as_array().unwrap();
    assert_eq!(concerns.len(), 10);
    assert_eq!(concerns[0]["concern_name"], "Concern 00");
    assert_eq!(concerns[0]["query_count"], 100);
    assert_eq!(concerns[9]["query_count"], 91);
}

#[tokio::test]
async fn test_clv_averages_per_cohort_in_age_order() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

    state
        .customer_store()
        .insert_clv(vec![
            ClvRecord::new(today, "1-2y", 700.0, 800.0),
            ClvRecord::new(yesterday, "1-2y", 500.0, 600.0),
            ClvRecord::new(today, "0-30d", 40.0, 120.0),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/v1/customers/lifetime-value?period=30d").await;
    assert_eq!(status, StatusCode::OK);

    let cohorts = response["data"].as_array().unwrap();
    assert_eq!(cohorts.len(), 2);
    assert_eq!(cohorts[0]["cohort"], "0-30d");
    assert_eq!(cohorts[1]["cohort"], "1-2y");
    assert_eq!(cohorts[1]["current_clv"], 600.0);
    assert_eq!(cohorts[1]["predicted_clv"], 700.0);
}
