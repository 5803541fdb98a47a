//! Customer endpoints: segments, concerns, and lifetime value by cohort.
//!
//! All three are snapshot-style: the window's rows are collapsed into one
//! row per dimension value rather than bucketed over time.

use crate::response::{store_failure, ApiResponse};
use crate::routes::{today, PeriodParams};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Serialize;
use shared::models::cohort_rank;
use shared::period::PeriodWindow;
use shared::rollup::ratio_pct;
use shared::storage::StoreError;
use std::collections::BTreeMap;

/// Maximum number of concerns returned, busiest first.
const CONCERN_LIMIT: usize = 10;

/// One aggregated customer segment.
#[derive(Debug, Serialize)]
pub struct SegmentSummary {
    /// Segment name.
    pub segment_name: String,
    /// Segment size summed across the window.
    pub segment_size: i64,
    /// Share of the customer base, in percent.
    pub segment_percentage: f64,
    /// Average lifetime value across the window.
    pub avg_lifetime_value: f64,
    /// Average order value across the window.
    pub avg_order_value: f64,
}

/// One aggregated customer concern.
#[derive(Debug, Serialize)]
pub struct ConcernSummary {
    /// Concern name.
    pub concern_name: String,
    /// Concern category.
    pub concern_category: String,
    /// Queries raising the concern, summed across the window.
    pub query_count: i64,
    /// Average AI resolution rate, in percent.
    pub ai_success_rate: f64,
}

/// Lifetime value of one cohort, averaged across the window.
#[derive(Debug, Serialize)]
pub struct ClvSummary {
    /// Cohort name (account age band).
    pub cohort: String,
    /// Observed lifetime value.
    pub current_clv: f64,
    /// Predicted lifetime value.
    pub predicted_clv: f64,
}

/// Creates the customer routes.
///
/// # Routes
///
/// - `GET /api/v1/customers/segments` - segment distribution
/// - `GET /api/v1/customers/concerns` - top concerns
/// - `GET /api/v1/customers/lifetime-value` - CLV by cohort
pub fn customer_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/customers/segments", get(customer_segments))
        .route("/api/v1/customers/concerns", get(customer_concerns))
        .route("/api/v1/customers/lifetime-value", get(customer_clv))
        .with_state(state)
}

async fn customer_segments(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match segment_summaries(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn customer_concerns(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match concern_summaries(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn customer_clv(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match clv_summaries(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

#[allow(clippy::cast_precision_loss)]
fn segment_summaries(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<Vec<SegmentSummary>, StoreError> {
    let rows = state
        .customer_store()
        .segments_in_range(window.start, window.end)?;

    struct Acc {
        size: i64,
        percentage_sum: f64,
        clv_sum: f64,
        aov_sum: f64,
        samples: usize,
    }

    let mut segments: BTreeMap<String, Acc> = BTreeMap::new();
    for row in rows {
        let acc = segments.entry(row.segment_name).or_insert(Acc {
            size: 0,
            percentage_sum: 0.0,
            clv_sum: 0.0,
            aov_sum: 0.0,
            samples: 0,
        });
        acc.size += row.segment_size;
        acc.percentage_sum += row.percentage.unwrap_or(0.0);
        acc.clv_sum += row.avg_lifetime_value;
        acc.aov_sum += row.avg_order_value;
        acc.samples += 1;
    }

    let total_size: i64 = segments.values().map(|acc| acc.size).sum();

    let mut summaries: Vec<SegmentSummary> = segments
        .into_iter()
        .map(|(segment_name, acc)| {
            let samples = acc.samples as f64;
            let stored_pct = acc.percentage_sum / samples;
            SegmentSummary {
                segment_name,
                segment_size: acc.size,
                // Recompute from window totals when the stored share is
                // missing (averages to zero).
                segment_percentage: if stored_pct > 0.0 {
                    stored_pct
                } else {
                    ratio_pct(acc.size as f64, total_size as f64)
                },
                avg_lifetime_value: acc.clv_sum / samples,
                avg_order_value: acc.aov_sum / samples,
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.segment_size.cmp(&a.segment_size));
    Ok(summaries)
}

#[allow(clippy::cast_precision_loss)]
fn concern_summaries(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<Vec<ConcernSummary>, StoreError> {
    let rows = state
        .customer_store()
        .concerns_in_range(window.start, window.end)?;

    struct Acc {
        category: String,
        count: i64,
        success_sum: f64,
        samples: usize,
    }

    let mut concerns: BTreeMap<String, Acc> = BTreeMap::new();
    for row in rows {
        let acc = concerns.entry(row.concern_name).or_insert(Acc {
            category: row.concern_category,
            count: 0,
            success_sum: 0.0,
            samples: 0,
        });
        acc.count += row.query_count;
        acc.success_sum += row.ai_success_rate.unwrap_or(0.0);
        acc.samples += 1;
    }

    let mut summaries: Vec<ConcernSummary> = concerns
        .into_iter()
        .map(|(concern_name, acc)| ConcernSummary {
            concern_name,
            concern_category: acc.category,
            query_count: acc.count,
            ai_success_rate: acc.success_sum / acc.samples as f64,
        })
        .collect();

    summaries.sort_by(|a, b| b.query_count.cmp(&a.query_count));
    summaries.truncate(CONCERN_LIMIT);
    Ok(summaries)
}

#[allow(clippy::cast_precision_loss)]
fn clv_summaries(state: &AppState, window: &PeriodWindow) -> Result<Vec<ClvSummary>, StoreError> {
    let rows = state.customer_store().clv_in_range(window.start, window.end)?;

    struct Acc {
        current_sum: f64,
        predicted_sum: f64,
        samples: usize,
    }

    let mut cohorts: BTreeMap<String, Acc> = BTreeMap::new();
    for row in rows {
        let acc = cohorts.entry(row.cohort).or_insert(Acc {
            current_sum: 0.0,
            predicted_sum: 0.0,
            samples: 0,
        });
        acc.current_sum += row.current_clv;
        acc.predicted_sum += row.predicted_clv;
        acc.samples += 1;
    }

    let mut summaries: Vec<ClvSummary> = cohorts
        .into_iter()
        .map(|(cohort, acc)| {
            let samples = acc.samples as f64;
            ClvSummary {
                cohort,
                current_clv: acc.current_sum / samples,
                predicted_clv: acc.predicted_sum / samples,
            }
        })
        .collect();

    summaries.sort_by_key(|s| cohort_rank(&s.cohort));
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Days;
    use http_body_util::BodyExt;
    use shared::models::{ClvRecord, ConcernRecord, SegmentRecord};
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
    async fn test_segments_aggregate_and_order_by_size() {
        let state = AppState::with_in_memory_store();
        let today = today();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

        state
            .customer_store()
            .insert_segments(vec![
                SegmentRecord::new(today, "New", 100, Some(20.0), 50.0, 20.0),
                SegmentRecord::new(yesterday, "New", 80, Some(20.0), 40.0, 18.0),
                SegmentRecord::new(today, "Loyal", 400, Some(80.0), 500.0, 90.0),
            ])
            .unwrap();

        let app = customer_routes(state);
        let json = get_json(app, "/api/v1/customers/segments").await;

        let segments = json["data"].as_array().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0]["segment_name"], "Loyal");
        assert_eq!(segments[1]["segment_size"], 180);
        assert_eq!(segments[1]["avg_lifetime_value"], 45.0);
    }

    #[tokio::test]
    async fn test_segment_percentage_recomputed_when_missing() {
        let state = AppState::with_in_memory_store();
        let today = today();

        state
            .customer_store()
            .insert_segments(vec![
                SegmentRecord::new(today, "New", 25, None, 50.0, 20.0),
                SegmentRecord::new(today, "Loyal", 75, None, 500.0, 90.0),
            ])
            .unwrap();

        let app = customer_routes(state);
        let json = get_json(app, "/api/v1/customers/segments").await;

        let segments = json["data"].as_array().unwrap();
        assert_eq!(segments[0]["segment_percentage"], 75.0);
        assert_eq!(segments[1]["segment_percentage"], 25.0);
    }

    #[tokio::test]
    async fn test_concerns_capped_and_ordered_by_volume() {
        let state = AppState::with_in_memory_store();
        let today = today();

        let rows = (0..12)
            .map(|i| {
                ConcernRecord::new(
                    today,
                    format!("Concern {i}"),
                    "General",
                    i64::from(i) * 10,
                    Some(80.0),
                )
            })
            .collect();
        state.customer_store().insert_concerns(rows).unwrap();

        let app = customer_routes(state);
        let json = get_json(app, "/api/v1/customers/concerns").await;

        let concerns = json["data"].as_array().unwrap();
        assert_eq!(concerns.len(), 10);
        assert_eq!(concerns[0]["concern_name"], "Concern 11");
        assert_eq!(concerns[0]["query_count"], 110);
    }

    #[tokio::test]
    async fn test_clv_cohorts_in_age_order() {
        let state = AppState::with_in_memory_store();
        let today = today();

        state
            .customer_store()
            .insert_clv(vec![
                ClvRecord::new(today, "2y+", 900.0, 1000.0),
                ClvRecord::new(today, "0-30d", 40.0, 120.0),
                ClvRecord::new(today, "91-180d", 200.0, 300.0),
            ])
            .unwrap();

        let app = customer_routes(state);
        let json = get_json(app, "/api/v1/customers/lifetime-value").await;

        let cohorts = json["data"].as_array().unwrap();
        let names: Vec<&str> = cohorts.iter().map(|c| c["cohort"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["0-30d", "91-180d", "2y+"]);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_arrays() {
        let app = customer_routes(AppState::with_in_memory_store());
        let json = get_json(app, "/api/v1/customers/concerns?period=90d").await;

        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 0);
    }
}
