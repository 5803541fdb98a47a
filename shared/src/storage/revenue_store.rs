//! Revenue-page storage: per-feature attribution and revenue summaries.

use super::{block_on, date_from_days, days_since_epoch, load_range, upsert_rows, StoreError};
use crate::models::{RevenueAttributionRecord, RevenueSummaryRecord};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock};

/// Trait for revenue-page storage implementations.
pub trait RevenueStore: Send + Sync {
    /// Upserts attribution rows, keyed by (`record_date`, `ai_feature`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_attribution(&self, rows: Vec<RevenueAttributionRecord>) -> Result<(), StoreError>;

    /// Loads attribution rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn attribution_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RevenueAttributionRecord>, StoreError>;

    /// Upserts revenue summary rows, keyed by `record_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_summaries(&self, rows: Vec<RevenueSummaryRecord>) -> Result<(), StoreError>;

    /// Loads revenue summary rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn summaries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RevenueSummaryRecord>, StoreError>;
}

/// In-memory revenue store implementation.
#[derive(Debug, Default)]
pub struct InMemoryRevenueStore {
    attribution: RwLock<Vec<RevenueAttributionRecord>>,
    summaries: RwLock<Vec<RevenueSummaryRecord>>,
}

impl InMemoryRevenueStore {
    /// Creates a new empty in-memory revenue store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevenueStore for InMemoryRevenueStore {
    fn insert_attribution(&self, rows: Vec<RevenueAttributionRecord>) -> Result<(), StoreError> {
        let mut attribution = self.attribution.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut attribution, rows, |r| {
            (r.record_date, r.ai_feature.clone())
        });
        Ok(())
    }

    fn attribution_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RevenueAttributionRecord>, StoreError> {
        load_range(&self.attribution, start, end, |r| r.record_date)
    }

    fn insert_summaries(&self, rows: Vec<RevenueSummaryRecord>) -> Result<(), StoreError> {
        let mut summaries = self.summaries.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut summaries, rows, |r| r.record_date);
        Ok(())
    }

    fn summaries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RevenueSummaryRecord>, StoreError> {
        load_range(&self.summaries, start, end, |r| r.record_date)
    }
}

/// `ClickHouse`-backed revenue store implementation.
#[derive(Clone)]
pub struct ClickHouseRevenueStore {
    client: Arc<clickhouse::Client>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct AttributionRow {
    record_date: i32,
    ai_feature: String,
    revenue_amount: f64,
    percentage: Option<f64>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct SummaryRow {
    record_date: i32,
    total_revenue_impact: f64,
    avg_order_value: f64,
    avg_order_value_with_ai: f64,
    monthly_investment: f64,
    monthly_return: f64,
    roi_percentage: f64,
}

impl ClickHouseRevenueStore {
    /// Creates a new `ClickHouse` revenue store with the given client.
    #[must_use]
    pub fn new(client: Arc<clickhouse::Client>) -> Self {
        Self { client }
    }
}

impl RevenueStore for ClickHouseRevenueStore {
    fn insert_attribution(&self, rows: Vec<RevenueAttributionRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client
                .insert::<AttributionRow>("revenue_attribution")
                .await?;
            for record in rows {
                inserter
                    .write(&AttributionRow {
                        record_date: days_since_epoch(record.record_date),
                        ai_feature: record.ai_feature,
                        revenue_amount: record.revenue_amount,
                        percentage: record.percentage,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn attribution_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RevenueAttributionRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, ai_feature, revenue_amount, percentage \
             FROM revenue_attribution WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<AttributionRow> = client.query(&sql).fetch_all::<AttributionRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| RevenueAttributionRecord {
                    record_date: date_from_days(row.record_date),
                    ai_feature: row.ai_feature,
                    revenue_amount: row.revenue_amount,
                    percentage: row.percentage,
                })
                .collect())
        })
    }

    fn insert_summaries(&self, rows: Vec<RevenueSummaryRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<SummaryRow>("revenue_summary").await?;
            for record in rows {
                inserter
                    .write(&SummaryRow {
                        record_date: days_since_epoch(record.record_date),
                        total_revenue_impact: record.total_revenue_impact,
                        avg_order_value: record.avg_order_value,
                        avg_order_value_with_ai: record.avg_order_value_with_ai,
                        monthly_investment: record.monthly_investment,
                        monthly_return: record.monthly_return,
                        roi_percentage: record.roi_percentage,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn summaries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RevenueSummaryRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, total_revenue_impact, avg_order_value, avg_order_value_with_ai, \
             monthly_investment, monthly_return, roi_percentage \
             FROM revenue_summary WHERE record_date >= {} AND record_date <= {} ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<SummaryRow> = client.query(&sql).fetch_all::<SummaryRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| RevenueSummaryRecord {
                    record_date: date_from_days(row.record_date),
                    total_revenue_impact: row.total_revenue_impact,
                    avg_order_value: row.avg_order_value,
                    avg_order_value_with_ai: row.avg_order_value_with_ai,
                    monthly_investment: row.monthly_investment,
                    monthly_return: row.monthly_return,
                    roi_percentage: row.roi_percentage,
                })
                .collect())
        })
    }
}
