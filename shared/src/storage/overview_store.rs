//! Overview-page storage: daily KPIs, funnel stages, and conversion trends.
//!
//! Provides the `OverviewStore` trait, an `InMemoryOverviewStore` for
//! development and testing, and a `ClickHouseOverviewStore` for production.

use super::{block_on, date_from_days, days_since_epoch, load_range, upsert_rows, StoreError};
use crate::models::{ConversionTrendRecord, FunnelStageRecord, KpiRecord};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock};

/// Trait for overview-page storage implementations.
///
/// Range loads return rows with `record_date` inside `[start, end]`
/// (inclusive), ordered by date ascending. Inserts upsert on the row's
/// natural key.
pub trait OverviewStore: Send + Sync {
    /// Upserts daily KPI rows, keyed by `record_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_kpis(&self, rows: Vec<KpiRecord>) -> Result<(), StoreError>;

    /// Loads KPI rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn kpis_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<KpiRecord>, StoreError>;

    /// Upserts funnel stage rows, keyed by (`record_date`, `stage_order`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_funnel_stages(&self, rows: Vec<FunnelStageRecord>) -> Result<(), StoreError>;

    /// Loads funnel stage rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn funnel_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FunnelStageRecord>, StoreError>;

    /// Upserts conversion trend rows, keyed by `record_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_trends(&self, rows: Vec<ConversionTrendRecord>) -> Result<(), StoreError>;

    /// Loads conversion trend rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn trends_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConversionTrendRecord>, StoreError>;
}

/// In-memory overview store implementation.
#[derive(Debug, Default)]
pub struct InMemoryOverviewStore {
    kpis: RwLock<Vec<KpiRecord>>,
    funnel: RwLock<Vec<FunnelStageRecord>>,
    trends: RwLock<Vec<ConversionTrendRecord>>,
}

impl InMemoryOverviewStore {
    /// Creates a new empty in-memory overview store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverviewStore for InMemoryOverviewStore {
    fn insert_kpis(&self, rows: Vec<KpiRecord>) -> Result<(), StoreError> {
        let mut kpis = self.kpis.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut kpis, rows, |r| r.record_date);
        Ok(())
    }

    fn kpis_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<KpiRecord>, StoreError> {
        load_range(&self.kpis, start, end, |r| r.record_date)
    }

    fn insert_funnel_stages(&self, rows: Vec<FunnelStageRecord>) -> Result<(), StoreError> {
        let mut funnel = self.funnel.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut funnel, rows, |r| (r.record_date, r.stage_order));
        Ok(())
    }

    fn funnel_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FunnelStageRecord>, StoreError> {
        load_range(&self.funnel, start, end, |r| r.record_date)
    }

    fn insert_trends(&self, rows: Vec<ConversionTrendRecord>) -> Result<(), StoreError> {
        let mut trends = self.trends.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut trends, rows, |r| r.record_date);
        Ok(())
    }

    fn trends_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConversionTrendRecord>, StoreError> {
        load_range(&self.trends, start, end, |r| r.record_date)
    }
}

/// `ClickHouse`-backed overview store implementation.
///
/// Tables are `ReplacingMergeTree` ordered by the row's natural key, so a
/// re-written (date, dimension) key collapses to one row at merge time.
#[derive(Clone)]
pub struct ClickHouseOverviewStore {
    client: Arc<clickhouse::Client>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct KpiRow {
    record_date: i32,
    total_customers: i64,
    conversion_rate: f64,
    ai_interactions: i64,
    revenue_impact: f64,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct FunnelRow {
    record_date: i32,
    stage_name: String,
    stage_order: i32,
    count: i64,
    percentage: Option<f64>,
    dropoff_rate: Option<f64>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct TrendRow {
    record_date: i32,
    conversions: i64,
    ai_attributed_conversions: i64,
    visitors: Option<i64>,
}

impl ClickHouseOverviewStore {
    /// Creates a new `ClickHouse` overview store with the given client.
    #[must_use]
    pub fn new(client: Arc<clickhouse::Client>) -> Self {
        Self { client }
    }
}

impl OverviewStore for ClickHouseOverviewStore {
    fn insert_kpis(&self, rows: Vec<KpiRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<KpiRow>("overview_kpis").await?;
            for record in rows {
                inserter
                    .write(&KpiRow {
                        record_date: days_since_epoch(record.record_date),
                        total_customers: record.total_customers,
                        conversion_rate: record.conversion_rate,
                        ai_interactions: record.ai_interactions,
                        revenue_impact: record.revenue_impact,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn kpis_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<KpiRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, total_customers, conversion_rate, ai_interactions, revenue_impact \
             FROM overview_kpis WHERE record_date >= {} AND record_date <= {} ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<KpiRow> = client.query(&sql).fetch_all::<KpiRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| KpiRecord {
                    record_date: date_from_days(row.record_date),
                    total_customers: row.total_customers,
                    conversion_rate: row.conversion_rate,
                    ai_interactions: row.ai_interactions,
                    revenue_impact: row.revenue_impact,
                })
                .collect())
        })
    }

    fn insert_funnel_stages(&self, rows: Vec<FunnelStageRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<FunnelRow>("conversion_funnel").await?;
            for record in rows {
                inserter
                    .write(&FunnelRow {
                        record_date: days_since_epoch(record.record_date),
                        stage_name: record.stage_name,
                        stage_order: record.stage_order,
                        count: record.count,
                        percentage: record.percentage,
                        dropoff_rate: record.dropoff_rate,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn funnel_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FunnelStageRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, stage_name, stage_order, count, percentage, dropoff_rate \
             FROM conversion_funnel WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date, stage_order",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<FunnelRow> = client.query(&sql).fetch_all::<FunnelRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| FunnelStageRecord {
                    record_date: date_from_days(row.record_date),
                    stage_name: row.stage_name,
                    stage_order: row.stage_order,
                    count: row.count,
                    percentage: row.percentage,
                    dropoff_rate: row.dropoff_rate,
                })
                .collect())
        })
    }

    fn insert_trends(&self, rows: Vec<ConversionTrendRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<TrendRow>("conversion_trends").await?;
            for record in rows {
                inserter
                    .write(&TrendRow {
                        record_date: days_since_epoch(record.record_date),
                        conversions: record.conversions,
                        ai_attributed_conversions: record.ai_attributed_conversions,
                        visitors: record.visitors,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn trends_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConversionTrendRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, conversions, ai_attributed_conversions, visitors \
             FROM conversion_trends WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<TrendRow> = client.query(&sql).fetch_all::<TrendRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| ConversionTrendRecord {
                    record_date: date_from_days(row.record_date),
                    conversions: row.conversions,
                    ai_attributed_conversions: row.ai_attributed_conversions,
                    visitors: row.visitors,
                })
                .collect())
        })
    }
}
