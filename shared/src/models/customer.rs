//! Customer-page records: segments, concerns, and lifetime value by cohort.

use super::Dated;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One customer segment on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SegmentRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Segment name (e.g. "New Customers", "Loyal Customers").
    #[validate(length(min = 1, message = "Segment name cannot be empty"))]
    pub segment_name: String,
    /// Number of customers in the segment on this date.
    pub segment_size: i64,
    /// Share of the customer base, in percent. Recomputed from segment
    /// sizes when missing.
    pub percentage: Option<f64>,
    /// Average lifetime value of customers in the segment.
    pub avg_lifetime_value: f64,
    /// Average order value of customers in the segment.
    pub avg_order_value: f64,
}

impl SegmentRecord {
    /// Creates a new segment record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        segment_name: impl Into<String>,
        segment_size: i64,
        percentage: Option<f64>,
        avg_lifetime_value: f64,
        avg_order_value: f64,
    ) -> Self {
        Self {
            record_date,
            segment_name: segment_name.into(),
            segment_size,
            percentage,
            avg_lifetime_value,
            avg_order_value,
        }
    }
}

impl Dated for SegmentRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// One customer concern (support/search topic) on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConcernRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Concern name (e.g. "Shipping times").
    #[validate(length(min = 1, message = "Concern name cannot be empty"))]
    pub concern_name: String,
    /// Broader category the concern belongs to.
    pub concern_category: String,
    /// Number of customer queries raising this concern.
    pub query_count: i64,
    /// Share of those queries the AI assistant resolved, in percent.
    pub ai_success_rate: Option<f64>,
}

impl ConcernRecord {
    /// Creates a new concern record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        concern_name: impl Into<String>,
        concern_category: impl Into<String>,
        query_count: i64,
        ai_success_rate: Option<f64>,
    ) -> Self {
        Self {
            record_date,
            concern_name: concern_name.into(),
            concern_category: concern_category.into(),
            query_count,
            ai_success_rate,
        }
    }
}

impl Dated for ConcernRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// Lifetime value of one customer-age cohort on one calendar date.
///
/// Cohorts are named by account age band ("0-30d" through "2y+"); see
/// [`cohort_rank`] for the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClvRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Cohort name (account age band).
    pub cohort: String,
    /// Observed lifetime value to date.
    pub current_clv: f64,
    /// Model-predicted lifetime value.
    pub predicted_clv: f64,
}

impl ClvRecord {
    /// Creates a new lifetime-value record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        cohort: impl Into<String>,
        current_clv: f64,
        predicted_clv: f64,
    ) -> Self {
        Self {
            record_date,
            cohort: cohort.into(),
            current_clv,
            predicted_clv,
        }
    }
}

impl Dated for ClvRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// Display rank of a lifetime-value cohort, youngest accounts first.
///
/// Unknown cohort names sort last.
#[must_use]
pub fn cohort_rank(cohort: &str) -> u8 {
    match cohort {
        "0-30d" => 0,
        "31-60d" => 1,
        "61-90d" => 2,
        "91-180d" => 3,
        "181-365d" => 4,
        "1-2y" => 5,
        "2y+" => 6,
        _ => 7,
    }
}
