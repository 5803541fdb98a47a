//! Operational storage: realtime system metrics, billing, and usage.
//!
//! The realtime table is timestamp-keyed and read by trailing count or
//! `since` cursor; billing and usage are snapshot tables with no period
//! scoping. This store also carries the reachability probe backing the
//! health endpoint.

use super::{block_on, date_from_days, days_since_epoch, upsert_rows, StoreError};
use crate::models::{BillingSummaryRecord, RealtimeMetricRecord, UsageRecord};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

/// Trait for operational storage implementations.
pub trait OpsStore: Send + Sync {
    /// Checks that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or queried.
    fn ping(&self) -> Result<(), StoreError>;

    /// Upserts realtime samples, keyed by `recorded_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_realtime(&self, rows: Vec<RealtimeMetricRecord>) -> Result<(), StoreError>;

    /// Loads the trailing `limit` realtime samples in chronological order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn recent_realtime(&self, limit: usize) -> Result<Vec<RealtimeMetricRecord>, StoreError>;

    /// Loads realtime samples recorded strictly after `since`, oldest
    /// first, capped at 120 samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn realtime_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<RealtimeMetricRecord>, StoreError>;

    /// Replaces the billing plan snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn set_billing_summary(&self, summary: BillingSummaryRecord) -> Result<(), StoreError>;

    /// Loads the billing plan snapshot, if one has been stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn billing_summary(&self) -> Result<Option<BillingSummaryRecord>, StoreError>;

    /// Upserts monthly usage rows, keyed by `month`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_usage(&self, rows: Vec<UsageRecord>) -> Result<(), StoreError>;

    /// Loads all monthly usage rows, oldest month first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn usage_breakdown(&self) -> Result<Vec<UsageRecord>, StoreError>;
}

/// In-memory operational store implementation.
#[derive(Debug, Default)]
pub struct InMemoryOpsStore {
    realtime: RwLock<Vec<RealtimeMetricRecord>>,
    billing: RwLock<Option<BillingSummaryRecord>>,
    usage: RwLock<Vec<UsageRecord>>,
}

impl InMemoryOpsStore {
    /// Creates a new empty in-memory operational store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpsStore for InMemoryOpsStore {
    fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn insert_realtime(&self, rows: Vec<RealtimeMetricRecord>) -> Result<(), StoreError> {
        let mut realtime = self.realtime.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut realtime, rows, |r| r.recorded_at);
        realtime.sort_by_key(|r| r.recorded_at);
        Ok(())
    }

    fn recent_realtime(&self, limit: usize) -> Result<Vec<RealtimeMetricRecord>, StoreError> {
        let realtime = self.realtime.read().map_err(|_| StoreError::LockError)?;
        let skip = realtime.len().saturating_sub(limit);
        Ok(realtime[skip..].to_vec())
    }

    fn realtime_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<RealtimeMetricRecord>, StoreError> {
        let realtime = self.realtime.read().map_err(|_| StoreError::LockError)?;
        Ok(realtime
            .iter()
            .filter(|r| r.recorded_at > since)
            .take(120)
            .cloned()
            .collect())
    }

    fn set_billing_summary(&self, summary: BillingSummaryRecord) -> Result<(), StoreError> {
        let mut billing = self.billing.write().map_err(|_| StoreError::LockError)?;
        *billing = Some(summary);
        Ok(())
    }

    fn billing_summary(&self) -> Result<Option<BillingSummaryRecord>, StoreError> {
        let billing = self.billing.read().map_err(|_| StoreError::LockError)?;
        Ok(billing.clone())
    }

    fn insert_usage(&self, rows: Vec<UsageRecord>) -> Result<(), StoreError> {
        let mut usage = self.usage.write().map_err(|_| StoreError::LockError)?;
        upsert_rows(&mut usage, rows, |r| r.month.clone());
        usage.sort_by(|a, b| a.month.cmp(&b.month));
        Ok(())
    }

    fn usage_breakdown(&self) -> Result<Vec<UsageRecord>, StoreError> {
        let usage = self.usage.read().map_err(|_| StoreError::LockError)?;
        Ok(usage.clone())
    }
}

/// `ClickHouse`-backed operational store implementation.
#[derive(Clone)]
pub struct ClickHouseOpsStore {
    client: Arc<clickhouse::Client>,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct RealtimeRow {
    recorded_at: i64,
    active_sessions: i64,
    api_response_time_ms: i64,
    cpu_usage_pct: f64,
    memory_usage_pct: f64,
    conversions_per_min: i64,
}

impl RealtimeRow {
    fn into_record(self) -> RealtimeMetricRecord {
        RealtimeMetricRecord {
            recorded_at: DateTime::from_timestamp_nanos(self.recorded_at),
            active_sessions: self.active_sessions,
            api_response_time_ms: self.api_response_time_ms,
            cpu_usage_pct: self.cpu_usage_pct,
            memory_usage_pct: self.memory_usage_pct,
            conversions_per_min: self.conversions_per_min,
        }
    }
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct BillingRow {
    plan_name: String,
    monthly_cost: f64,
    api_calls_used: i64,
    api_calls_limit: i64,
    period_ends: i32,
}

#[derive(clickhouse::Row, serde::Serialize, serde::Deserialize)]
struct UsageRow {
    month: String,
    api_calls: i64,
    cost: f64,
}

impl ClickHouseOpsStore {
    /// Creates a new `ClickHouse` operational store with the given client.
    #[must_use]
    pub fn new(client: Arc<clickhouse::Client>) -> Self {
        Self { client }
    }
}

impl OpsStore for ClickHouseOpsStore {
    fn ping(&self) -> Result<(), StoreError> {
        let client = Arc::clone(&self.client);
        block_on(async move { client.query("SELECT 1").fetch_one::<u8>().await })?;
        Ok(())
    }

    fn insert_realtime(&self, rows: Vec<RealtimeMetricRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<RealtimeRow>("realtime_metrics").await?;
            for record in rows {
                inserter
                    .write(&RealtimeRow {
                        recorded_at: record.recorded_at.timestamp_nanos_opt().unwrap_or(0),
                        active_sessions: record.active_sessions,
                        api_response_time_ms: record.api_response_time_ms,
                        cpu_usage_pct: record.cpu_usage_pct,
                        memory_usage_pct: record.memory_usage_pct,
                        conversions_per_min: record.conversions_per_min,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn recent_realtime(&self, limit: usize) -> Result<Vec<RealtimeMetricRecord>, StoreError> {
        let sql = format!(
            "SELECT recorded_at, active_sessions, api_response_time_ms, cpu_usage_pct, \
             memory_usage_pct, conversions_per_min \
             FROM realtime_metrics ORDER BY recorded_at DESC LIMIT {limit}"
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<RealtimeRow> = client.query(&sql).fetch_all::<RealtimeRow>().await?;
            let mut records: Vec<RealtimeMetricRecord> =
                rows.into_iter().map(RealtimeRow::into_record).collect();
            records.reverse();
            Ok(records)
        })
    }

    fn realtime_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<RealtimeMetricRecord>, StoreError> {
        let sql = format!(
            "SELECT recorded_at, active_sessions, api_response_time_ms, cpu_usage_pct, \
             memory_usage_pct, conversions_per_min \
             FROM realtime_metrics WHERE recorded_at > {} ORDER BY recorded_at LIMIT 120",
            since.timestamp_nanos_opt().unwrap_or(0)
        );
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<RealtimeRow> = client.query(&sql).fetch_all::<RealtimeRow>().await?;
            Ok(rows.into_iter().map(RealtimeRow::into_record).collect())
        })
    }

    fn set_billing_summary(&self, summary: BillingSummaryRecord) -> Result<(), StoreError> {
        let client = Arc::clone(&self.client);
        block_on(async move {
            client.query("TRUNCATE TABLE billing_summary").execute().await?;
            let mut inserter = client.insert::<BillingRow>("billing_summary").await?;
            inserter
                .write(&BillingRow {
                    plan_name: summary.plan_name,
                    monthly_cost: summary.monthly_cost,
                    api_calls_used: summary.api_calls_used,
                    api_calls_limit: summary.api_calls_limit,
                    period_ends: days_since_epoch(summary.period_ends),
                })
                .await?;
            inserter.end().await?;
            Ok(())
        })
    }

    fn billing_summary(&self) -> Result<Option<BillingSummaryRecord>, StoreError> {
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<BillingRow> = client
                .query(
                    "SELECT plan_name, monthly_cost, api_calls_used, api_calls_limit, period_ends \
                     FROM billing_summary LIMIT 1",
                )
                .fetch_all::<BillingRow>()
                .await?;
            Ok(rows.into_iter().next().map(|row| BillingSummaryRecord {
                plan_name: row.plan_name,
                monthly_cost: row.monthly_cost,
                api_calls_used: row.api_calls_used,
                api_calls_limit: row.api_calls_limit,
                period_ends: date_from_days(row.period_ends),
            }))
        })
    }

    fn insert_usage(&self, rows: Vec<UsageRecord>) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let client = Arc::clone(&self.client);
        block_on(async move {
            let mut inserter = client.insert::<UsageRow>("usage_breakdown").await?;
            for record in rows {
                inserter
                    .write(&UsageRow {
                        month: record.month,
                        api_calls: record.api_calls,
                        cost: record.cost,
                    })
                    .await?;
            }
            inserter.end().await?;
            Ok(())
        })
    }

    fn usage_breakdown(&self) -> Result<Vec<UsageRecord>, StoreError> {
        let client = Arc::clone(&self.client);
        block_on(async move {
            let rows: Vec<UsageRow> = client
                .query("SELECT month, api_calls, cost FROM usage_breakdown ORDER BY month")
                .fetch_all::<UsageRow>()
                .await?;
            Ok(rows
                .into_iter()
                .map(|row| UsageRecord {
                    month: row.month,
                    api_calls: row.api_calls,
                    cost: row.cost,
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn sample(s: &str, sessions: i64) -> RealtimeMetricRecord {
        RealtimeMetricRecord::new(at(s), sessions, 150, 40.0, 50.0, 2)
    }

    #[test]
    fn test_recent_realtime_is_chronological_and_capped() {
        let store = InMemoryOpsStore::new();
        store
            .insert_realtime(vec![
                sample("2024-06-01T12:02:00Z", 12),
                sample("2024-06-01T12:00:00Z", 10),
                sample("2024-06-01T12:01:00Z", 11),
            ])
            .unwrap();

        let rows = store.recent_realtime(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].active_sessions, 11);
        assert_eq!(rows[1].active_sessions, 12);
    }

    #[test]
    fn test_realtime_since_excludes_cursor() {
        let store = InMemoryOpsStore::new();
        store
            .insert_realtime(vec![
                sample("2024-06-01T12:00:00Z", 10),
                sample("2024-06-01T12:01:00Z", 11),
            ])
            .unwrap();

        let rows = store.realtime_since(at("2024-06-01T12:00:00Z")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].active_sessions, 11);
    }

    #[test]
    fn test_billing_summary_replaces() {
        let store = InMemoryOpsStore::new();
        assert!(store.billing_summary().unwrap().is_none());

        let ends = chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        store
            .set_billing_summary(BillingSummaryRecord::new("Growth", 499.0, 10_000, 50_000, ends))
            .unwrap();
        store
            .set_billing_summary(BillingSummaryRecord::new("Scale", 999.0, 10_000, 250_000, ends))
            .unwrap();

        let summary = store.billing_summary().unwrap().unwrap();
        assert_eq!(summary.plan_name, "Scale");
    }

    #[test]
    fn test_usage_breakdown_sorted_by_month() {
        let store = InMemoryOpsStore::new();
        store
            .insert_usage(vec![
                UsageRecord::new("2024-06", 9000, 90.0),
                UsageRecord::new("2024-04", 7000, 70.0),
                UsageRecord::new("2024-05", 8000, 80.0),
            ])
            .unwrap();
        // Re-reporting a month replaces it.
        store.insert_usage(vec![UsageRecord::new("2024-05", 8100, 81.0)]).unwrap();

        let rows = store.usage_breakdown().unwrap();
        let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, vec!["2024-04", "2024-05", "2024-06"]);
        assert_eq!(rows[1].api_calls, 8100);
    }
}
