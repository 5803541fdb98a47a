//! Storage traits and implementations.
//!
//! Each dashboard page has a store trait abstracting the flat tables it
//! reads, with two implementations apiece: an in-memory store for
//! development and testing, and a `ClickHouse`-backed store for production.
//!
//! Date-keyed tables are written with upsert semantics: inserting a row
//! whose (date, dimension) key already exists replaces the old row, so
//! reads may assume at most one row per key.

pub mod ai_store;
pub mod customer_store;
pub mod ops_store;
pub mod overview_store;
pub mod revenue_store;

pub use ai_store::{AiStore, ClickHouseAiStore, InMemoryAiStore};
pub use customer_store::{ClickHouseCustomerStore, CustomerStore, InMemoryCustomerStore};
pub use ops_store::{ClickHouseOpsStore, InMemoryOpsStore, OpsStore};
pub use overview_store::{ClickHouseOverviewStore, InMemoryOverviewStore, OverviewStore};
pub use revenue_store::{ClickHouseRevenueStore, InMemoryRevenueStore, RevenueStore};

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Helper to execute async `ClickHouse` operations synchronously.
pub(crate) fn block_on<F, T>(future: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, clickhouse::error::Error>>,
{
    tokio::task::block_in_place(|| {
        tokio::runtime::Handle::current()
            .block_on(future)
            .map_err(|e| StoreError::StorageError(e.to_string()))
    })
}

/// Replaces rows whose key already exists, appends the rest.
///
/// This is the in-memory side of the upsert invariant: at most one row per
/// (date, dimension) key.
pub(crate) fn upsert_rows<T, K: PartialEq>(rows: &mut Vec<T>, incoming: Vec<T>, key: fn(&T) -> K) {
    for row in incoming {
        let row_key = key(&row);
        if let Some(existing) = rows.iter_mut().find(|r| key(*r) == row_key) {
            *existing = row;
        } else {
            rows.push(row);
        }
    }
}

/// Loads rows dated inside `[start, end]` inclusive, ordered by date.
pub(crate) fn load_range<T: Clone>(
    table: &std::sync::RwLock<Vec<T>>,
    start: NaiveDate,
    end: NaiveDate,
    date_of: fn(&T) -> NaiveDate,
) -> Result<Vec<T>, StoreError> {
    let rows = table.read().map_err(|_| StoreError::LockError)?;
    let mut matching: Vec<T> = rows
        .iter()
        .filter(|r| date_of(r) >= start && date_of(r) <= end)
        .cloned()
        .collect();
    matching.sort_by_key(date_of);
    Ok(matching)
}

/// Days since the Unix epoch, as stored in `ClickHouse` date columns.
pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    i32::try_from((date - NaiveDate::default()).num_days()).unwrap_or(0)
}

/// Inverse of [`days_since_epoch`].
pub(crate) fn date_from_days(days: i32) -> NaiveDate {
    NaiveDate::default()
        .checked_add_signed(chrono::TimeDelta::days(i64::from(days)))
        .unwrap_or_default()
}
