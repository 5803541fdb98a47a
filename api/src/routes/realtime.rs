//! Realtime endpoint: the live system health monitor.
//!
//! Unlike the period-scoped endpoints this one is polled by the frontend;
//! it serves the trailing samples, or the samples after a `since` cursor
//! for incremental polls.

use crate::response::{store_failure, ApiResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Trailing samples served when no cursor is given: one hour at one
/// sample per minute.
const TRAILING_SAMPLES: usize = 60;

/// Query parameters for the system health endpoint.
#[derive(Debug, Deserialize)]
pub struct SystemHealthParams {
    /// Return only samples recorded after this instant.
    pub since: Option<DateTime<Utc>>,
}

/// Creates the realtime routes.
///
/// # Routes
///
/// - `GET /api/v1/realtime/system-health` - live monitor samples
pub fn realtime_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/realtime/system-health", get(system_health))
        .with_state(state)
}

async fn system_health(
    State(state): State<AppState>,
    Query(params): Query<SystemHealthParams>,
) -> Response {
    let result = match params.since {
        Some(since) => state.ops_store().realtime_since(since),
        None => state.ops_store().recent_realtime(TRAILING_SAMPLES),
    };

    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::TimeDelta;
    use http_body_util::BodyExt;
    use shared::models::RealtimeMetricRecord;
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

    fn sample(at: DateTime<Utc>, sessions: i64) -> RealtimeMetricRecord {
        RealtimeMetricRecord::new(at, sessions, 150, 40.0, 50.0, 2)
    }

    #[tokio::test]
    async fn test_system_health_serves_trailing_samples_chronologically() {
        let state = AppState::with_in_memory_store();
        let now = Utc::now();

        state
            .ops_store()
            .insert_realtime(vec![
                sample(now - TimeDelta::minutes(2), 10),
                sample(now, 12),
                sample(now - TimeDelta::minutes(1), 11),
            ])
            .unwrap();

        let app = realtime_routes(state);
        let json = get_json(app, "/api/v1/realtime/system-health").await;

        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["active_sessions"], 10);
        assert_eq!(rows[2]["active_sessions"], 12);
    }

    #[tokio::test]
    async fn test_system_health_since_cursor() {
        let state = AppState::with_in_memory_store();
        let now = Utc::now();
        let cursor = now - TimeDelta::minutes(1);

        state
            .ops_store()
            .insert_realtime(vec![
                sample(now - TimeDelta::minutes(2), 10),
                sample(cursor, 11),
                sample(now, 12),
            ])
            .unwrap();

        let app = realtime_routes(state);
        let uri = format!(
            "/api/v1/realtime/system-health?since={}",
            cursor.to_rfc3339().replace('+', "%2B")
        );
        let json = get_json(app, &uri).await;

        let rows = json["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["active_sessions"], 12);
    }

    #[tokio::test]
    async fn test_system_health_empty_store() {
        let app = realtime_routes(AppState::with_in_memory_store());
        let json = get_json(app, "/api/v1/realtime/system-health").await;

        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 0);
    }
}
