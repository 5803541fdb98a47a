//! Operational records: realtime system metrics and billing/usage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One sample of the live system monitor.
///
/// Unlike the daily metric families, realtime rows carry a full timestamp
/// and are read by trailing count or `since` cursor rather than by period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeMetricRecord {
    /// When the sample was taken.
    pub recorded_at: DateTime<Utc>,
    /// Concurrent shopper sessions.
    pub active_sessions: i64,
    /// API response time in milliseconds.
    pub api_response_time_ms: i64,
    /// CPU utilisation, in percent.
    pub cpu_usage_pct: f64,
    /// Memory utilisation, in percent.
    pub memory_usage_pct: f64,
    /// Conversions observed in the last minute.
    pub conversions_per_min: i64,
}

impl RealtimeMetricRecord {
    /// Creates a new realtime sample.
    #[must_use]
    pub fn new(
        recorded_at: DateTime<Utc>,
        active_sessions: i64,
        api_response_time_ms: i64,
        cpu_usage_pct: f64,
        memory_usage_pct: f64,
        conversions_per_min: i64,
    ) -> Self {
        Self {
            recorded_at,
            active_sessions,
            api_response_time_ms,
            cpu_usage_pct,
            memory_usage_pct,
            conversions_per_min,
        }
    }
}

/// The current billing plan snapshot.
///
/// A single-row table; the dashboard shows it as-is without any temporal
/// aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSummaryRecord {
    /// Subscribed plan name.
    pub plan_name: String,
    /// Monthly plan cost, in currency units.
    pub monthly_cost: f64,
    /// API calls consumed in the current billing period.
    pub api_calls_used: i64,
    /// API call allowance for the billing period.
    pub api_calls_limit: i64,
    /// Last day of the current billing period.
    pub period_ends: NaiveDate,
}

impl BillingSummaryRecord {
    /// Creates a new billing snapshot.
    #[must_use]
    pub fn new(
        plan_name: impl Into<String>,
        monthly_cost: f64,
        api_calls_used: i64,
        api_calls_limit: i64,
        period_ends: NaiveDate,
    ) -> Self {
        Self {
            plan_name: plan_name.into(),
            monthly_cost,
            api_calls_used,
            api_calls_limit,
            period_ends,
        }
    }
}

/// API usage and cost for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Month in `YYYY-MM` form.
    pub month: String,
    /// API calls made during the month.
    pub api_calls: i64,
    /// Cost incurred during the month, in currency units.
    pub cost: f64,
}

impl UsageRecord {
    /// Creates a new monthly usage record.
    #[must_use]
    pub fn new(month: impl Into<String>, api_calls: i64, cost: f64) -> Self {
        Self {
            month: month.into(),
            api_calls,
            cost,
        }
    }
}
