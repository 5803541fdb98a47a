//! Revenue-page records: per-feature attribution and the revenue summary.

use super::Dated;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Revenue attributed to one AI feature on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RevenueAttributionRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// AI feature the revenue is attributed to (e.g. "Chat Assistant").
    #[validate(length(min = 1, message = "Feature name cannot be empty"))]
    pub ai_feature: String,
    /// Attributed revenue, in currency units.
    pub revenue_amount: f64,
    /// Share of the day's attributed revenue, in percent.
    pub percentage: Option<f64>,
}

impl RevenueAttributionRecord {
    /// Creates a new attribution record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        ai_feature: impl Into<String>,
        revenue_amount: f64,
        percentage: Option<f64>,
    ) -> Self {
        Self {
            record_date,
            ai_feature: ai_feature.into(),
            revenue_amount,
            percentage,
        }
    }
}

impl Dated for RevenueAttributionRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// One day of revenue summary figures.
///
/// `roi_percentage` is stored as a percent figure; the response layer also
/// derives a decimal `roi` and the AI order-value uplift from these columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummaryRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Total revenue impact attributed to AI features.
    pub total_revenue_impact: f64,
    /// Average order value without AI involvement.
    pub avg_order_value: f64,
    /// Average order value of AI-assisted orders.
    pub avg_order_value_with_ai: f64,
    /// Monthly spend on the AI features.
    pub monthly_investment: f64,
    /// Monthly return generated by the AI features.
    pub monthly_return: f64,
    /// Return on investment, in percent.
    pub roi_percentage: f64,
}

impl RevenueSummaryRecord {
    /// Creates a new revenue summary record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        total_revenue_impact: f64,
        avg_order_value: f64,
        avg_order_value_with_ai: f64,
        monthly_investment: f64,
        monthly_return: f64,
        roi_percentage: f64,
    ) -> Self {
        Self {
            record_date,
            total_revenue_impact,
            avg_order_value,
            avg_order_value_with_ai,
            monthly_investment,
            monthly_return,
            roi_percentage,
        }
    }
}

impl Dated for RevenueSummaryRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribution_record_roundtrip() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let record = RevenueAttributionRecord::new(day, "Chat Assistant", 1250.0, Some(41.5));
        let json = serde_json::to_string(&record).unwrap();
        let back: RevenueAttributionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_attribution_feature_name_required() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let record = RevenueAttributionRecord::new(day, "", 10.0, None);
        assert!(record.validate().is_err());
    }
}
