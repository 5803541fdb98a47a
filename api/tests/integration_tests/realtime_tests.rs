//! Integration tests for the realtime system health endpoint.

use axum::http::StatusCode;
use shared::chrono::{TimeDelta, Utc};
use shared::models::RealtimeMetricRecord;

use super::common::{get, test_app};

#[tokio::test]
async fn test_system_health_caps_at_sixty_samples() {
    let (app, state) = test_app();
    let now = Utc::now();

    let rows: Vec<RealtimeMetricRecord> = (0..90)
        .map(|i| {
            RealtimeMetricRecord::new(
                now - TimeDelta::minutes(i),
                100 + i,
                150,
                40.0,
                55.0,
                3,
            )
        })
        .collect();
    state.ops_store().insert_realtime(rows).unwrap();

    let (status, response) = get(app, "/api/v1/realtime/system-health").await;
    assert_eq!(status, StatusCode::OK);

    let samples = response["data"].as_array().unwrap();
    assert_eq!(samples.len(), 60);
    // Chronological: the newest sample is last.
    assert_eq!(samples.last().unwrap()["active_sessions"], 100);
    assert_eq!(samples.first().unwrap()["active_sessions"], 159);
}
