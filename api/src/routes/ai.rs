//! AI endpoints: model performance, feature performance, and the
//! interaction summary with its timeline.

use crate::response::{store_failure, ApiResponse};
use crate::routes::{as_count, today, PeriodParams};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{InteractionSummaryRecord, ModelPerformanceRecord};
use shared::period::PeriodWindow;
use shared::rollup::{reduce_window, rollup, ColumnSpec, Reduction};
use shared::storage::StoreError;
use std::collections::BTreeMap;

/// One (bucket, model) cell of the model performance chart.
#[derive(Debug, Serialize)]
pub struct ModelPoint {
    /// Bucket start date in ISO form.
    pub bucket_label: String,
    /// Model name.
    pub model_name: String,
    /// Average accuracy in the bucket, in percent.
    pub accuracy: f64,
    /// Average response time in the bucket, in milliseconds.
    pub response_time_ms: f64,
}

/// One aggregated AI feature.
#[derive(Debug, Serialize)]
pub struct FeatureSummary {
    /// Feature name.
    pub feature_name: String,
    /// Uses summed across the window.
    pub usage_count: i64,
    /// Average success rate, in percent.
    pub success_rate: f64,
    /// Average user rating out of five.
    pub avg_rating: f64,
}

/// Interaction summary payload: window totals plus a bucketed timeline.
#[derive(Debug, Serialize)]
pub struct InteractionSummary {
    /// Total interactions across all channels.
    pub total_interactions: i64,
    /// Chat interactions.
    pub chat_interactions: i64,
    /// Questionnaire interactions.
    pub questionnaire_interactions: i64,
    /// Image analysis interactions.
    pub image_analysis_interactions: i64,
    /// Routine planner interactions.
    pub routine_planner_interactions: i64,
    /// Average assistant response time in seconds.
    pub avg_response_time: f64,
    /// Per-bucket channel counts, oldest first.
    pub timeline: Vec<InteractionPoint>,
}

/// One bucket of the interaction timeline.
#[derive(Debug, Serialize)]
pub struct InteractionPoint {
    /// Bucket start date in ISO form.
    pub bucket_label: String,
    /// Questionnaire interactions in the bucket.
    pub questionnaire_interactions: i64,
    /// Chat interactions in the bucket.
    pub chat_interactions: i64,
    /// Image analysis interactions in the bucket.
    pub image_analysis_interactions: i64,
    /// Routine planner interactions in the bucket.
    pub routine_planner_interactions: i64,
}

/// Creates the AI routes.
///
/// # Routes
///
/// - `GET /api/v1/ai/model-performance` - bucketed per-model series
/// - `GET /api/v1/ai/feature-performance` - aggregated feature figures
/// - `GET /api/v1/interactions/summary` - totals plus timeline
pub fn ai_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ai/model-performance", get(model_performance))
        .route("/api/v1/ai/feature-performance", get(feature_performance))
        .route("/api/v1/interactions/summary", get(interactions_summary))
        .with_state(state)
}

async fn model_performance(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match model_series(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn feature_performance(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match feature_summaries(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn interactions_summary(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match summarize_interactions(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

fn model_series(state: &AppState, window: &PeriodWindow) -> Result<Vec<ModelPoint>, StoreError> {
    let rows = state
        .ai_store()
        .model_performance_in_range(window.start, window.end)?;

    let mut by_model: BTreeMap<String, Vec<ModelPerformanceRecord>> = BTreeMap::new();
    for row in rows {
        by_model.entry(row.model_name.clone()).or_default().push(row);
    }

    let columns = [
        ColumnSpec::new("accuracy", Reduction::Avg, |r: &ModelPerformanceRecord| {
            Some(r.accuracy)
        }),
        ColumnSpec::new("response_time_ms", Reduction::Avg, |r| {
            Some(r.response_time_ms)
        }),
    ];

    let mut points: Vec<(NaiveDate, ModelPoint)> = Vec::new();
    for (model, model_rows) in by_model {
        let buckets = rollup(
            &model_rows,
            window.start,
            window.end,
            window.granularity,
            &columns,
        );
        for bucket in buckets {
            points.push((
                bucket.start,
                ModelPoint {
                    bucket_label: bucket.label(),
                    model_name: model.clone(),
                    accuracy: bucket.value(0),
                    response_time_ms: bucket.value(1),
                },
            ));
        }
    }

    points.sort_by(|(a_date, a), (b_date, b)| {
        a_date
            .cmp(b_date)
            .then_with(|| a.model_name.cmp(&b.model_name))
    });

    Ok(points.into_iter().map(|(_, point)| point).collect())
}

#[allow(clippy::cast_precision_loss)]
fn feature_summaries(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<Vec<FeatureSummary>, StoreError> {
    let rows = state
        .ai_store()
        .feature_performance_in_range(window.start, window.end)?;

    struct Acc {
        usage: i64,
        success_sum: f64,
        rating_sum: f64,
        samples: usize,
    }

    let mut features: BTreeMap<String, Acc> = BTreeMap::new();
    for row in rows {
        let acc = features.entry(row.feature_name).or_insert(Acc {
            usage: 0,
            success_sum: 0.0,
            rating_sum: 0.0,
            samples: 0,
        });
        acc.usage += row.usage_count;
        acc.success_sum += row.success_rate;
        acc.rating_sum += row.avg_rating.unwrap_or(0.0);
        acc.samples += 1;
    }

    let mut summaries: Vec<FeatureSummary> = features
        .into_iter()
        .map(|(feature_name, acc)| {
            let samples = acc.samples as f64;
            FeatureSummary {
                feature_name,
                usage_count: acc.usage,
                success_rate: acc.success_sum / samples,
                avg_rating: acc.rating_sum / samples,
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
    Ok(summaries)
}

#[allow(clippy::cast_precision_loss)]
fn summarize_interactions(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<InteractionSummary, StoreError> {
    let rows = state
        .ai_store()
        .interaction_summaries_in_range(window.start, window.end)?;

    let sum = |value: fn(&InteractionSummaryRecord) -> Option<f64>| {
        reduce_window(&rows, window.start, window.end, Reduction::Sum, value)
    };

    let columns = [
        ColumnSpec::new(
            "questionnaire_interactions",
            Reduction::Sum,
            |r: &InteractionSummaryRecord| Some(r.questionnaire_interactions as f64),
        ),
        ColumnSpec::new("chat_interactions", Reduction::Sum, |r| {
            Some(r.chat_interactions as f64)
        }),
        ColumnSpec::new("image_analysis_interactions", Reduction::Sum, |r| {
            Some(r.image_analysis_interactions as f64)
        }),
        ColumnSpec::new("routine_planner_interactions", Reduction::Sum, |r| {
            Some(r.routine_planner_interactions as f64)
        }),
    ];
    let timeline = rollup(&rows, window.start, window.end, window.granularity, &columns)
        .iter()
        .map(|bucket| InteractionPoint {
            bucket_label: bucket.label(),
            questionnaire_interactions: as_count(bucket.value(0)),
            chat_interactions: as_count(bucket.value(1)),
            image_analysis_interactions: as_count(bucket.value(2)),
            routine_planner_interactions: as_count(bucket.value(3)),
        })
        .collect();

    Ok(InteractionSummary {
        total_interactions: as_count(sum(|r| Some(r.total_interactions as f64))),
        chat_interactions: as_count(sum(|r| Some(r.chat_interactions as f64))),
        questionnaire_interactions: as_count(sum(|r| Some(r.questionnaire_interactions as f64))),
        image_analysis_interactions: as_count(sum(|r| Some(r.image_analysis_interactions as f64))),
        routine_planner_interactions: as_count(sum(|r| Some(r.routine_planner_interactions as f64))),
        avg_response_time: reduce_window(&rows, window.start, window.end, Reduction::Avg, |r| {
            Some(r.avg_response_time)
        }),
        timeline,
    })
}
