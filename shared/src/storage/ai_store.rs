//! AI-page storage: model performance, feature performance, and interaction
//! summaries.

use super::{block_on, date_from_days, days_since_epoch, load_range, upsert_rows, StoreError};
use crate::models::{FeaturePerformanceRecord, InteractionSummaryRecord, ModelPerformanceRecord};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock};

/// Trait for AI-page storage implementations.
pub trait AiStore: Send + Sync {
    /// Upserts model performance rows, keyed by (`record_date`, `model_name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_model_performance(&self, rows: Vec<ModelPerformanceRecord>)
        -> Result<(), StoreError>;

    /// Loads model performance rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn model_performance_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ModelPerformanceRecord>, StoreError>;

    /// Upserts feature performance rows, keyed by (`record_date`, `feature_name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_feature_performance(
        &self,
        rows: Vec<FeaturePerformanceRecord>,
    ) -> Result<(), StoreError>;

    /// Loads feature performance rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn feature_performance_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FeaturePerformanceRecord>, StoreError>;

    /// Upserts interaction summary rows, keyed by `record_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_interaction_summaries(
        &self,
        rows: Vec<InteractionSummaryRecord>,
    ) -> Result<(), StoreError>;

    /// Loads interaction summary rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn interaction_summaries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InteractionSummaryRecord>, StoreError>;
}

/// In-memory AI store implementation.
#[derive(Debug, Default)]
pub struct InMemoryAiStore {
    models: RwLock<Vec<ModelPerformanceRecord>>,
    features: RwLock<Vec<FeaturePerformanceRecord>>,
    interactions: RwLock<Vec<InteractionSummaryRecord>>,
}

impl InMemoryAiStore {
    /// Creates a new empty in-memory AI store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AiStore for InMemoryAiStore {
    fn insert_model_performance(
        &self,
        rows: Vec<ModelPerformanceRecord>,
    ) -> Result<(), StoreError> {
        let mut models = self.models.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut models, rows, |r| (r.record_date, r.model_name.clone()));
        Ok(())
    }

    fn model_performance_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ModelPerformanceRecord>, StoreError> {
        load_range(&self.models, start, end, |r| r.record_date)
    }

    fn insert_feature_performance(
        &self,
        rows: Vec<FeaturePerformanceRecord>,
    ) -> Result<(), StoreError> {
        let mut features = self.features.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut features, rows, |r| {
            (r.record_date, r.feature_name.clone())
        });
        Ok(())
    }

    fn feature_performance_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FeaturePerformanceRecord>, StoreError> {
        load_range(&self.features, start, end, |r| r.record_date)
    }

    fn insert_interaction_summaries(
        &self,
        rows: Vec<InteractionSummaryRecord>,
    ) -> Result<(), StoreError> {
        let mut interactions = self.interactions.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut interactions, rows, |r| r.record_date);
        Ok(())
    }

    fn interaction_summaries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InteractionSummaryRecord>, StoreError> {
        load_range(&self.interactions, start, end, |r| r.record_date)
    }
}

/// `ClickHouse`-backed AI store implementation.
#[derive(Clone)]
pub struct ClickHouseAiStore {
    client: Arc<clickhouse::Client>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct ModelRow {
    record_date: i32,
    model_name: String,
    accuracy: f64,
    response_time_ms: f64,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct FeatureRow {
    record_date: i32,
    feature_name: String,
    usage_count: i64,
    success_rate: f64,
    avg_rating: Option<f64>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct InteractionRow {
    record_date: i32,
    total_interactions: i64,
    chat_interactions: i64,
    questionnaire_interactions: i64,
    image_analysis_interactions: i64,
    routine_planner_interactions: i64,
    avg_response_time: f64,
}

impl ClickHouseAiStore {
    /// Creates a new `ClickHouse` AI store with the given client.
    #[must_use]
    pub fn new(client: Arc<clickhouse::Client>) -> Self {
        Self { client }
    }
}

impl AiStore for ClickHouseAiStore {
    fn insert_model_performance(
        &self,
        rows: Vec<ModelPerformanceRecord>,
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<ModelRow>("ai_model_performance").await?;
            for record in rows {
                inserter
                    .write(&ModelRow {
                        record_date: days_since_epoch(record.record_date),
                        model_name: record.model_name,
                        accuracy: record.accuracy,
                        response_time_ms: record.response_time_ms,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn model_performance_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ModelPerformanceRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, model_name, accuracy, response_time_ms \
             FROM ai_model_performance WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<ModelRow> = client.query(&sql).fetch_all::<ModelRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| ModelPerformanceRecord {
                    record_date: date_from_days(row.record_date),
                    model_name: row.model_name,
                    accuracy: row.accuracy,
                    response_time_ms: row.response_time_ms,
                })
                .collect())
        })
    }

    fn insert_feature_performance(
        &self,
        rows: Vec<FeaturePerformanceRecord>,
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<FeatureRow>("ai_feature_performance").await?;
            for record in rows {
                inserter
                    .write(&FeatureRow {
                        record_date: days_since_epoch(record.record_date),
                        feature_name: record.feature_name,
                        usage_count: record.usage_count,
                        success_rate: record.success_rate,
                        avg_rating: record.avg_rating,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn feature_performance_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FeaturePerformanceRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, feature_name, usage_count, success_rate, avg_rating \
             FROM ai_feature_performance WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<FeatureRow> = client.query(&sql).fetch_all::<FeatureRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| FeaturePerformanceRecord {
                    record_date: date_from_days(row.record_date),
                    feature_name: row.feature_name,
                    usage_count: row.usage_count,
                    success_rate: row.success_rate,
                    avg_rating: row.avg_rating,
                })
                .collect())
        })
    }

    fn insert_interaction_summaries(
        &self,
        rows: Vec<InteractionSummaryRecord>,
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<InteractionRow>("interaction_summary").await?;
            for record in rows {
                inserter
                    .write(&InteractionRow {
                        record_date: days_since_epoch(record.record_date),
                        total_interactions: record.total_interactions,
                        chat_interactions: record.chat_interactions,
                        questionnaire_interactions: record.questionnaire_interactions,
                        image_analysis_interactions: record.image_analysis_interactions,
                        routine_planner_interactions: record.routine_planner_interactions,
                        avg_response_time: record.avg_response_time,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn interaction_summaries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InteractionSummaryRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, total_interactions, chat_interactions, questionnaire_interactions, \
             image_analysis_interactions, routine_planner_interactions, avg_response_time \
             FROM interaction_summary WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<InteractionRow> = client.query(&sql).fetch_all::<InteractionRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| InteractionSummaryRecord {
                    record_date: date_from_days(row.record_date),
                    total_interactions: row.total_interactions,
                    chat_interactions: row.chat_interactions,
                    questionnaire_interactions: row.questionnaire_interactions,
                    image_analysis_interactions: row.image_analysis_interactions,
                    routine_planner_interactions: row.routine_planner_interactions,
                    avg_response_time: row.avg_response_time,
                })
                .collect())
        })
    }
}
