//! Record types for the stored metric families.
//!
//! Every table read by the dashboard has an explicit record type with named
//! columns. Rows are normalized into these records once, at the store-read
//! boundary, so the rest of the system never touches loosely-typed maps.
//!
//! Nullable metric columns are modelled as `Option<f64>`; the rollup engine
//! reduces a missing value as zero so a single bad row cannot blank a chart.

mod ai;
mod customer;
mod ops;
mod overview;
mod revenue;

pub use ai::{FeaturePerformanceRecord, InteractionSummaryRecord, ModelPerformanceRecord};
pub use customer::{cohort_rank, ClvRecord, ConcernRecord, SegmentRecord};
pub use ops::{BillingSummaryRecord, RealtimeMetricRecord, UsageRecord};
pub use overview::{ConversionTrendRecord, FunnelStageRecord, KpiRecord};
pub use revenue::{RevenueAttributionRecord, RevenueSummaryRecord};

use chrono::NaiveDate;

/// Trait for records scoped to a single calendar date.
///
/// Implemented by every daily metric record so the rollup engine can assign
/// rows to buckets without knowing the concrete record type.
pub trait Dated {
    /// The calendar date this record belongs to.
    fn record_date(&self) -> NaiveDate;
}
