//! AI-page records: model performance, feature performance, and the
//! interaction summary.

use super::Dated;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Accuracy and latency of one AI model on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModelPerformanceRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Model name (e.g. "Recommendation v2.3").
    #[validate(length(min = 1, message = "Model name cannot be empty"))]
    pub model_name: String,
    /// Recommendation accuracy, in percent.
    pub accuracy: f64,
    /// Average model response time in milliseconds.
    pub response_time_ms: f64,
}

impl ModelPerformanceRecord {
    /// Creates a new model performance record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        model_name: impl Into<String>,
        accuracy: f64,
        response_time_ms: f64,
    ) -> Self {
        Self {
            record_date,
            model_name: model_name.into(),
            accuracy,
            response_time_ms,
        }
    }
}

impl Dated for ModelPerformanceRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// Usage and outcome figures for one AI feature on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePerformanceRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Feature name (e.g. "Image Analysis").
    pub feature_name: String,
    /// Number of times the feature was used.
    pub usage_count: i64,
    /// Share of uses that ended in a successful outcome, in percent.
    pub success_rate: f64,
    /// Average user rating of the feature, out of five, when collected.
    pub avg_rating: Option<f64>,
}

impl FeaturePerformanceRecord {
    /// Creates a new feature performance record.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        feature_name: impl Into<String>,
        usage_count: i64,
        success_rate: f64,
        avg_rating: Option<f64>,
    ) -> Self {
        Self {
            record_date,
            feature_name: feature_name.into(),
            usage_count,
            success_rate,
            avg_rating,
        }
    }
}

impl Dated for FeaturePerformanceRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

/// Daily interaction counts across the assistant's channels.
///
/// `total_interactions` is stored denormalized alongside the per-channel
/// counts; [`InteractionSummaryRecord::new`] derives it from the channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSummaryRecord {
    /// The calendar date this row describes.
    pub record_date: NaiveDate,
    /// Total interactions across all channels.
    pub total_interactions: i64,
    /// Free-form chat interactions.
    pub chat_interactions: i64,
    /// Guided questionnaire interactions.
    pub questionnaire_interactions: i64,
    /// Image analysis interactions.
    pub image_analysis_interactions: i64,
    /// Routine planner interactions.
    pub routine_planner_interactions: i64,
    /// Average assistant response time in seconds.
    pub avg_response_time: f64,
}

impl InteractionSummaryRecord {
    /// Creates a new interaction summary record, deriving the total from
    /// the per-channel counts.
    #[must_use]
    pub fn new(
        record_date: NaiveDate,
        chat_interactions: i64,
        questionnaire_interactions: i64,
        image_analysis_interactions: i64,
        routine_planner_interactions: i64,
        avg_response_time: f64,
    ) -> Self {
        Self {
            record_date,
            total_interactions: chat_interactions
                + questionnaire_interactions
                + image_analysis_interactions
                + routine_planner_interactions,
            chat_interactions,
            questionnaire_interactions,
            image_analysis_interactions,
            routine_planner_interactions,
            avg_response_time,
        }
    }
}

impl Dated for InteractionSummaryRecord {
    fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_summary_total_is_derived() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let record = InteractionSummaryRecord::new(day, 10, 20, 5, 3, 1.4);
        assert_eq!(record.total_interactions, 38);
    }

    #[test]
    fn test_model_name_required() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let record = ModelPerformanceRecord::new(day, "", 91.0, 120.0);
        assert!(record.validate().is_err());
    }
}
