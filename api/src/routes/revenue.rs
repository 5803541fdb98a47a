//! Revenue endpoints: the revenue summary and per-feature attribution.

use crate::response::{store_failure, ApiResponse};
use crate::routes::{today, PeriodParams};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{RevenueAttributionRecord, RevenueSummaryRecord};
use shared::period::PeriodWindow;
use shared::rollup::{ratio_pct, reduce_window, rollup, ColumnSpec, Reduction};
use shared::storage::StoreError;
use std::collections::BTreeMap;

/// Revenue summary payload, averaged across the window.
#[derive(Debug, Serialize)]
pub struct RevenueSummary {
    /// Total revenue impact attributed to AI features.
    pub total_revenue_impact: f64,
    /// Average order value without AI involvement.
    pub avg_order_value: f64,
    /// Average order value of AI-assisted orders.
    pub avg_order_value_with_ai: f64,
    /// AI order-value uplift, in percent (derived).
    pub avg_order_value_improvement: f64,
    /// Monthly spend on the AI features.
    pub monthly_investment: f64,
    /// Monthly return generated by the AI features.
    pub monthly_return: f64,
    /// Return on investment, in percent.
    pub roi_percentage: f64,
    /// Return on investment as a decimal (derived).
    pub roi: f64,
}

/// One (bucket, feature) cell of the attribution chart.
#[derive(Debug, Serialize)]
pub struct AttributionPoint {
    /// Bucket start date in ISO form.
    pub bucket_label: String,
    /// AI feature the revenue is attributed to.
    pub ai_feature: String,
    /// Attributed revenue in the bucket.
    pub revenue_amount: f64,
    /// Average share of attributed revenue, in percent.
    pub percentage: f64,
}

/// Creates the revenue routes.
///
/// # Routes
///
/// - `GET /api/v1/revenue/summary` - averaged revenue figures with ROI
/// - `GET /api/v1/revenue/attribution` - bucketed per-feature series
pub fn revenue_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/revenue/summary", get(revenue_summary))
        .route("/api/v1/revenue/attribution", get(revenue_attribution))
        .with_state(state)
}

async fn revenue_summary(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match summarize_revenue(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

async fn revenue_attribution(
    State(state): State<AppState>,
    Query(params): Query<PeriodParams>,
) -> Response {
    let window = PeriodWindow::resolve_or_default(params.period.as_deref(), today());
    match attribution_series(&state, &window) {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => store_failure(&err),
    }
}

fn summarize_revenue(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<RevenueSummary, StoreError> {
    let rows = state
        .revenue_store()
        .summaries_in_range(window.start, window.end)?;

    let avg = |value: fn(&RevenueSummaryRecord) -> Option<f64>| {
        reduce_window(&rows, window.start, window.end, Reduction::Avg, value)
    };

    let avg_order_value = avg(|r| Some(r.avg_order_value));
    let avg_order_value_with_ai = avg(|r| Some(r.avg_order_value_with_ai));
    let roi_percentage = avg(|r| Some(r.roi_percentage));

    Ok(RevenueSummary {
        total_revenue_impact: avg(|r| Some(r.total_revenue_impact)),
        avg_order_value,
        avg_order_value_with_ai,
        avg_order_value_improvement: ratio_pct(
            avg_order_value_with_ai - avg_order_value,
            avg_order_value,
        ),
        monthly_investment: avg(|r| Some(r.monthly_investment)),
        monthly_return: avg(|r| Some(r.monthly_return)),
        roi_percentage,
        roi: roi_percentage / 100.0,
    })
}

fn attribution_series(
    state: &AppState,
    window: &PeriodWindow,
) -> Result<Vec<AttributionPoint>, StoreError> {
    let rows = state
        .revenue_store()
        .attribution_in_range(window.start, window.end)?;

    let mut by_feature: BTreeMap<String, Vec<RevenueAttributionRecord>> = BTreeMap::new();
    for row in rows {
        by_feature.entry(row.ai_feature.clone()).or_default().push(row);
    }

    let columns = [
        ColumnSpec::new(
            "revenue_amount",
            Reduction::Sum,
            |r: &RevenueAttributionRecord| Some(r.revenue_amount),
        ),
        ColumnSpec::new("percentage", Reduction::Avg, |r| r.percentage),
    ];

    let mut points: Vec<(NaiveDate, AttributionPoint)> = Vec::new();
    for (feature, feature_rows) in by_feature {
        let buckets = rollup(
            &feature_rows,
            window.start,
            window.end,
            window.granularity,
            &columns,
        );
        for bucket in buckets {
            points.push((
                bucket.start,
                AttributionPoint {
                    bucket_label: bucket.label(),
                    ai_feature: feature.clone(),
                    revenue_amount: bucket.value(0),
                    percentage: bucket.value(1),
                },
            ));
        }
    }

    // Chronological, highest-earning feature first within each bucket.
    points.sort_by(|(a_date, a), (b_date, b)| {
        a_date
            .cmp(b_date)
            .then_with(|| b.revenue_amount.total_cmp(&a.revenue_amount))
    });

    Ok(points.into_iter().map(|(_, point)| point).collect())
}
