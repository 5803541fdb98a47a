//! Customer-page storage: segments, concerns, and lifetime value cohorts.

use super::{block_on, date_from_days, days_since_epoch, load_range, upsert_rows, StoreError};
use crate::models::{ClvRecord, ConcernRecord, SegmentRecord};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock};

/// Trait for customer-page storage implementations.
pub trait CustomerStore: Send + Sync {
    /// Upserts segment rows, keyed by (`record_date`, `segment_name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_segments(&self, rows: Vec<SegmentRecord>) -> Result<(), StoreError>;

    /// Loads segment rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn segments_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SegmentRecord>, StoreError>;

    /// Upserts concern rows, keyed by (`record_date`, `concern_name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_concerns(&self, rows: Vec<ConcernRecord>) -> Result<(), StoreError>;

    /// Loads concern rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn concerns_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConcernRecord>, StoreError>;

    /// Upserts lifetime-value rows, keyed by (`record_date`, `cohort`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_clv(&self, rows: Vec<ClvRecord>) -> Result<(), StoreError>;

    /// Loads lifetime-value rows for the given date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn clv_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClvRecord>, StoreError>;
}

/// In-memory customer store implementation.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    segments: RwLock<Vec<SegmentRecord>>,
    concerns: RwLock<Vec<ConcernRecord>>,
    clv: RwLock<Vec<ClvRecord>>,
}

impl InMemoryCustomerStore {
    /// Creates a new empty in-memory customer store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CustomerStore for InMemoryCustomerStore {
    fn insert_segments(&self, rows: Vec<SegmentRecord>) -> Result<(), StoreError> {
        let mut segments = self.segments.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut segments, rows, |r| {
            (r.record_date, r.segment_name.clone())
        });
        Ok(())
    }

    fn segments_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SegmentRecord>, StoreError> {
        load_range(&self.segments, start, end, |r| r.record_date)
    }

    fn insert_concerns(&self, rows: Vec<ConcernRecord>) -> Result<(), StoreError> {
        let mut concerns = self.concerns.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut concerns, rows, |r| {
            (r.record_date, r.concern_name.clone())
        });
        Ok(())
    }

    fn concerns_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConcernRecord>, StoreError> {
        load_range(&self.concerns, start, end, |r| r.record_date)
    }

    fn insert_clv(&self, rows: Vec<ClvRecord>) -> Result<(), StoreError> {
        let mut clv = self.clv.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut clv, rows, |r| (r.record_date, r.cohort.clone()));
        Ok(())
    }

    fn clv_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClvRecord>, StoreError> {
        load_range(&self.clv, start, end, |r| r.record_date)
    }
}

/// `ClickHouse`-backed customer store implementation.
#[derive(Clone)]
pub struct ClickHouseCustomerStore {
    client: Arc<clickhouse::Client>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct SegmentRow {
    record_date: i32,
    segment_name: String,
    segment_size: i64,
    percentage: Option<f64>,
    avg_lifetime_value: f64,
    avg_order_value: f64,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct ConcernRow {
    record_date: i32,
    concern_name: String,
    concern_category: String,
    query_count: i64,
    ai_success_rate: Option<f64>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct ClvRow {
    record_date: i32,
    cohort: String,
    current_clv: f64,
    predicted_clv: f64,
}

impl ClickHouseCustomerStore {
    /// Creates a new `ClickHouse` customer store with the given client.
    #[must_use]
    pub fn new(client: Arc<clickhouse::Client>) -> Self {
        Self { client }
    }
}

impl CustomerStore for ClickHouseCustomerStore {
    fn insert_segments(&self, rows: Vec<SegmentRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<SegmentRow>("customer_segments").await?;
            for record in rows {
                inserter
                    .write(&SegmentRow {
                        record_date: days_since_epoch(record.record_date),
                        segment_name: record.segment_name,
                        segment_size: record.segment_size,
                        percentage: record.percentage,
                        avg_lifetime_value: record.avg_lifetime_value,
                        avg_order_value: record.avg_order_value,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn segments_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SegmentRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, segment_name, segment_size, percentage, avg_lifetime_value, avg_order_value \
             FROM customer_segments WHERE record_date >= {} AND record_date <= {} ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<SegmentRow> = client.query(&sql).fetch_all::<SegmentRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| SegmentRecord {
                    record_date: date_from_days(row.record_date),
                    segment_name: row.segment_name,
                    segment_size: row.segment_size,
                    percentage: row.percentage,
                    avg_lifetime_value: row.avg_lifetime_value,
                    avg_order_value: row.avg_order_value,
                })
                .collect())
        })
    }

    fn insert_concerns(&self, rows: Vec<ConcernRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<ConcernRow>("customer_concerns").await?;
            for record in rows {
                inserter
                    .write(&ConcernRow {
                        record_date: days_since_epoch(record.record_date),
                        concern_name: record.concern_name,
                        concern_category: record.concern_category,
                        query_count: record.query_count,
                        ai_success_rate: record.ai_success_rate,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn concerns_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConcernRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, concern_name, concern_category, query_count, ai_success_rate \
             FROM customer_concerns WHERE record_date >= {} AND record_date <= {} ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<ConcernRow> = client.query(&sql).fetch_all::<ConcernRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| ConcernRecord {
                    record_date: date_from_days(row.record_date),
                    concern_name: row.concern_name,
                    concern_category: row.concern_category,
                    query_count: row.query_count,
                    ai_success_rate: row.ai_success_rate,
                })
                .collect())
        })
    }

    fn insert_clv(&self, rows: Vec<ClvRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<ClvRow>("customer_lifetime_value").await?;
            for record in rows {
                inserter
                    .write(&ClvRow {
                        record_date: days_since_epoch(record.record_date),
                        cohort: record.cohort,
                        current_clv: record.current_clv,
                        predicted_clv: record.predicted_clv,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn clv_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ClvRecord>, StoreError> {
        let sql = format!(
            "SELECT record_date, cohort, current_clv, predicted_clv \
             FROM customer_lifetime_value WHERE record_date >= {} AND record_date <= {} \
             ORDER BY record_date",
            days_since_epoch(start),
            days_since_epoch(end)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<ClvRow> = client.query(&sql).fetch_all::<ClvRow>().await?;
            Ok(rows
                .into_iter()
                .map(|row| ClvRecord {
                    record_date: date_from_days(row.record_date),
                    cohort: row.cohort,
                    current_clv: row.current_clv,
                    predicted_clv: row.predicted_clv,
                })
                .collect())
        })
    }
}
