//! Overview endpoints: top-level KPIs, the conversion funnel, and the
//! conversion trend chart.

use crate::response::{store_failure, ApiResponse};
use crate::routes::{as_count, today, PeriodParams};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Serialize;
use shared::models::{ConversionTrendRecord, KpiRecord};
use shared::period::PeriodWindow;
use shared::rollup::{percent_change, ratio_pct, reduce_window, rollup, ColumnSpec, Reduction};
use shared::storage::StoreError;
use std::collections::BTreeMap;

/// KPI payload: current value plus period-over-period change per metric.
#[derive(Debug, Serialize)]
pub struct KpiSummary {
    /// Customer count at the end of the window.
    pub total_customers: i64,
    /// Change vs. the preceding window, in percent.
    pub total_customers_change: f64,
    /// Average conversion rate across the window, in percent.
    pub conversion_rate: f64,
    /// Change vs. the preceding window, in percent.
    pub conversion_rate_change: f64,
    /// AI interactions summed across the window.
    pub ai_interactions: i64,
    /// Change vs. the preceding window, in percent.
    pub ai_interactions_change: f64,
    /// AI-attributed revenue summed across the window.
    pub revenue_impact: f64,
    /// Change vs. the preceding window, in percent.
    pub revenue_impact_change: f64,
}

/// One aggregated funnel stage.
#[derive(Debug, Serialize)]
pub struct FunnelStage {
    /// Stage name.
    pub stage_name: String,
    /// Stage position, top of funnel first.
    pub stage_order: i32,
    /// Visitors reaching the stage, summed across the window.
    pub count: i64,
    /// Average share of top-of-funnel visitors, in percent.
    pub percentage: f64,
    /// Average dropoff from the previous stage, in percent.
    pub dropoff_rate: f64,
}

/// One bucket of the conversion trend chart.
#[derive(Debug, Serialize)]
pub struct TrendPoint {
    /// Bucket start date in ISO form.
    pub bucket_label: String,
    /// Conversions in the bucket.
    pub conversions: i64,
    /// AI-attributed conversions in the bucket.
    pub ai_attributed_conversions: i64,
    /// Conversions per visitor, in percent; zero when visitors are unknown.
    pub conversion_rate: f64,
}

/// Creates the overview routes.
///
/// # Routes
///
/// - `GET /api/v1/overview/kpis` - KPI figures with deltas
/// - `GET /api/v1/overview/funnel` - aggregated conversion funnel
/// - `GET /api/v1/overview/conversion-trends` - bucketed trend series
pub fn overview_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/overview/kpis", get(overview_kpis))
        .route("/api/v1/overview/funnel", get(overview_funnel))
        .route(
            "/api/v1/overview/conversion-trends",
            get(overview_conversion_trends),
        )
        .with_state(state)
}

async fn overview_kpis(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match kpi_summary(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn overview_funnel(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match funnel_stages(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn overview_conversion_trends(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match conversion_trends(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

fn kpi_metric(
    rows: &[KpiRecord],
    window: &PeriodWindow,
    reduction: Reduction,
    value: fn(&KpiRecord) -> Option<f64>,
) -> f64 {
    reduce_window(rows, window.start, window.end, reduction, value)
}

#[allow(clippy::cast_precision_loss)]
fn kpi_summary(state: &AppState, window: &PeriodWindow) -> Result<KpiSummary, StoreError> {
    let previous_window = window.preceding();
    let current = state
        .overview_store()
        .kpis_in_range(window.start, window.end)?;
    let previous = state
        .overview_store()
        .kpis_in_range(previous_window.start, previous_window.end)?;

    let customers: fn(&KpiRecord) -> Option<f64> = |r| Some(r.total_customers as f64);
    let rate: fn(&KpiRecord) -> Option<f64> = |r| Some(r.conversion_rate);
    let interactions: fn(&KpiRecord) -> Option<f64> = |r| Some(r.ai_interactions as f64);
    let revenue: fn(&KpiRecord) -> Option<f64> = |r| Some(r.revenue_impact);

    let total_customers = kpi_metric(&current, window, Reduction::Last, customers);
    let conversion_rate = kpi_metric(&current, window, Reduction::Avg, rate);
    let ai_interactions = kpi_metric(&current, window, Reduction::Sum, interactions);
    let revenue_impact = kpi_metric(&current, window, Reduction::Sum, revenue);

    Ok(KpiSummary {
        total_customers: as_count(total_customers),
        total_customers_change: percent_change(
            total_customers,
            kpi_metric(&previous, &previous_window, Reduction::Last, customers),
        ),
        conversion_rate,
        conversion_rate_change: percent_change(
            conversion_rate,
            kpi_metric(&previous, &previous_window, Reduction::Avg, rate),
        ),
        ai_interactions: as_count(ai_interactions),
        ai_interactions_change: percent_change(
            ai_interactions,
            kpi_metric(&previous, &previous_window, Reduction::Sum, interactions),
        ),
        revenue_impact,
        revenue_impact_change: percent_change(
            revenue_impact,
            kpi_metric(&previous, &previous_window, Reduction::Sum, revenue),
        ),
    })
}

struct StageAccumulator {
    name: String,
    count: i64,
    percentage_sum: f64,
    dropoff_sum: f64,
    samples: usize,
}

#[allow(clippy::cast_precision_loss)]
fn funnel_stages(state: &AppState, window: &PeriodWindow) -> Result<Vec<FunnelStage>, StoreError> {
    let rows = state
        .overview_store()
        .funnel_in_range(window.start, window.end)?;

    let mut stages: BTreeMap<i32, StageAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = stages
            .entry(row.stage_order)
            .or_insert_with(|| StageAccumulator {
                name: row.stage_name.clone(),
                count: 0,
                percentage_sum: 0.0,
                dropoff_sum: 0.0,
                samples: 0,
            });
        acc.count += row.count;
        acc.percentage_sum += row.percentage.unwrap_or(0.0);
        acc.dropoff_sum += row.dropoff_rate.unwrap_or(0.0);
        acc.samples += 1;
    }

    Ok(stages
        .into_iter()
        .map(|(stage_order, acc)| {
            let samples = acc.samples as f64;
            FunnelStage {
                stage_name: acc.name,
                stage_order,
                count: acc.count,
                percentage: acc.percentage_sum / samples,
                dropoff_rate: acc.dropoff_sum / samples,
            }
        })
        .collect())
}

#[allow(clippy::cast_precision_loss)]
fn conversion_trends(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<Vec<TrendPoint>, StoreError> {
    let rows = state
        .overview_store()
        .trends_in_range(window.start, window.end)?;

    let columns = [
        ColumnSpec::new("conversions", Reduction::Sum, |r: &ConversionTrendRecord| {
            Some(r.conversions as f64)
        }),
        ColumnSpec::new("ai_attributed_conversions", Reduction::Sum, |r| {
            Some(r.ai_attributed_conversions as f64)
        }),
        ColumnSpec::new("visitors", Reduction::Sum, |r| {
            r.visitors.map(|v| v as f64)
        }),
    ];
    let buckets = rollup(&rows, window.start, window.end, window.granularity, &columns);

    Ok(buckets
        .iter()
        .map(|bucket| TrendPoint {
            bucket_label: bucket.label(),
            conversions: as_count(bucket.value(0)),
            ai_attributed_conversions: as_count(bucket.value(1)),
            conversion_rate: ratio_pct(bucket.value(0), bucket.value(2)),
        })
        .collect())
}
