//! Overview-page records: daily KPIs, the conversion funnel, and conversion
//! trends.

use super::Dated;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One day of top-level dashboard KPIs.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use shared::models::KpiRecord;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let record = KpiRecord::new(day, 12_400, 3.2, 860, 15_200.0);
/// assert_eq!(record.total_customers, 12_400);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Total registered customers as of this date.
    pub total_customers: i64,
    /// Overall conversion rate for the day, in percent.
    pub conversion_rate: f64,
    /// Number of AI-assisted interactions recorded on this date.
    pub ai_interactions: i64,
    /// Revenue attributed to AI features on this date, in currency units.
    pub revenue_impact: f64,
}

impl KpiRecord {
    /// Creates a new KPI record for the given date.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        total_customers: i64,
        conversion_rate: f64,
        ai_interactions: i64,
        revenue_impact: f64,
    ) -> Self {
        Self {
            record_date,
            total_customers,
            conversion_rate,
            ai_interactions,
            revenue_impact,
        }
    }
}

impl Dated for KpiRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// One funnel stage on one calendar date.
///
/// Stages are ordered by `stage_order` (0 = top of funnel). `percentage` and
/// `dropoff_rate` are nullable in the source data; a missing value reduces
/// as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FunnelStageRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Human-readable stage name (e.g. "Product View").
    #[validate(length(min = 1, message = "Stage name cannot be empty"))]
    pub stage_name: String,
    /// Position of the stage within the funnel, starting at zero.
    pub stage_order: i32,
    /// Number of visitors that reached this stage.
    pub count: i64,
    /// Share of top-of-funnel visitors that reached this stage, in percent.
    pub percentage: Option<f64>,
    /// Share of visitors lost between the previous stage and this one.
    pub dropoff_rate: Option<f64>,
}

impl FunnelStageRecord {
    /// Creates a new funnel stage record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        stage_name: impl Into<String>,
        stage_order: i32,
        count: i64,
        percentage: Option<f64>,
        dropoff_rate: Option<f64>,
    ) -> Self {
        Self {
            record_date,
            stage_name: stage_name.into(),
            stage_order,
            count,
            percentage,
            dropoff_rate,
        }
    }
}

impl Dated for FunnelStageRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// Daily conversion totals used for the trend chart.
///
/// `visitors` is the denominator for the derived conversion rate. It comes
/// from a different source table than the conversion counts and may be
/// absent for a date; the derived rate is zero in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionTrendRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Total conversions recorded on this date.
    pub conversions: i64,
    /// Conversions attributed to an AI feature.
    pub ai_attributed_conversions: i64,
    /// Unique visitors on this date, when known.
    pub visitors: Option<i64>,
}

impl ConversionTrendRecord {
    /// Creates a new conversion trend record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        conversions: i64,
        ai_attributed_conversions: i64,
        visitors: Option<i64>,
    ) -> Self {
        Self {
            record_date,
            conversions,
            ai_attributed_conversions,
            visitors,
        }
    }
}

impl Dated for ConversionTrendRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}
