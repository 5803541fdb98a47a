//! Integration tests for the AI endpoints.

use axum::http::StatusCode;
use shared::chrono::{Days, Utc};
use shared::models::{FeaturePerformanceRecord, InteractionSummaryRecord, ModelPerformanceRecord};

use super::common::{get, test_app};

#[tokio::test]
async fn test_model_performance_series_per_model() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    for i in 0..7 {
        let day = today.checked_sub_days(Days::new(i)).unwrap();
        state
            .ai_store()
            .insert_model_performance(vec![
                ModelPerformanceRecord::new(day, "Recommendation v2.3", 94.0, 115.0),
                ModelPerformanceRecord::new(day, "Baseline v1.0", 86.0, 210.0),
            ])
            .unwrap();
    }

    let (status, response) = get(app, "/api/v1/ai/model-performance?period=7d").await;
    assert_eq!(status, StatusCode::OK);

    let points = response["data"].as_array().unwrap();
    // 7 daily buckets x 2 models.
    assert_eq!(points.len(), 14);
    assert_eq!(points[0]["model_name"], "Baseline v1.0");
    assert_eq!(points[0]["accuracy"], 86.0);
    assert_eq!(points[1]["model_name"], "Recommendation v2.3");
    assert_eq!(points[1]["response_time_ms"], 115.0);
}

#[tokio::test]
async fn test_feature_performance_aggregates() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    state
        .ai_store()
        .insert_feature_performance(vec![
            FeaturePerformanceRecord::new(today, "Routine Planner", 150, 82.0, Some(4.1)),
            FeaturePerformanceRecord::new(today, "Chat", 900, 91.0, Some(4.6)),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/v1/ai/feature-performance").await;
    assert_eq!(status, StatusCode::OK);

    let features = response["data"].as_array().unwrap();
    assert_eq!(features[0]["feature_name"], "Chat");
    assert_eq!(features[0]["usage_count"], 900);
    assert_eq!(features[1]["avg_rating"], 4.1);
}

#[tokio::test]
async fn test_interaction_summary_includes_timeline() {
    let (app, state) = test_app();
    let today = Utc::now().date_naive();

    for i in 0..30 {
        let day = today.checked_sub_days(Days::new(i)).unwrap();
        state
            .ai_store()
            .insert_interaction_summaries(vec![InteractionSummaryRecord::new(day, 20, 10, 5, 5, 1.5)])
            .unwrap();
    }

    let (status, response) = get(app, "/api/v1/interactions/summary?period=30d").await;
    assert_eq!(status, StatusCode::OK);

    let data = &response["data"];
    assert_eq!(data["total_interactions"], 1200);
    assert_eq!(data["chat_interactions"], 600);
    assert_eq!(data["avg_response_time"], 1.5);

    let timeline = data["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 30);
    assert!(timeline.iter().all(|p| p["chat_interactions"] == 20));
}
