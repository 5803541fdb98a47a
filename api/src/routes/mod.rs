//! API route definitions.
//!
//! This module organizes all HTTP routes for the Shopsight API server, one
//! module per dashboard page.

mod ai;
mod billing;
mod customers;
mod health;
mod overview;
mod realtime;
mod revenue;

pub use ai::ai_routes;
pub use billing::billing_routes;
pub use customers::customer_routes;
pub use health::health_routes;
pub use overview::overview_routes;
pub use realtime::realtime_routes;
pub use revenue::revenue_routes;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

/// Query parameters accepted by every period-scoped endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct PeriodParams {
    /// Reporting period token (`7d`, `30d`, `90d`, `1y`). Missing or
    /// unrecognized tokens fall back to `30d`.
    pub period: Option<String>,
}

/// The dashboard's "today": wall-clock date at request time.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Rounds a reduced count metric back to a whole number for the response.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn as_count(value: f64) -> i64 {
    value.round() as i64
}
