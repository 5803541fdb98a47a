//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::db::Database;
use shared::storage::{
    AiStore, ClickHouseAiStore, ClickHouseCustomerStore, ClickHouseOpsStore,
    ClickHouseOverviewStore, ClickHouseRevenueStore, CustomerStore, InMemoryAiStore,
    InMemoryCustomerStore, InMemoryOpsStore, InMemoryOverviewStore, InMemoryRevenueStore,
    OpsStore, OverviewStore, RevenueStore,
};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds one store handle per dashboard page plus the operational store.
/// Handlers only see the trait objects, so the same routes serve both the
/// in-memory and the `ClickHouse` backend.
#[derive(Clone)]
pub struct AppState {
    overview_store: Arc<dyn OverviewStore>,
    customer_store: Arc<dyn CustomerStore>,
    revenue_store: Arc<dyn RevenueStore>,
    ai_store: Arc<dyn AiStore>,
    ops_store: Arc<dyn OpsStore>,
}

impl AppState {
    /// Creates a new application state with the given stores.
    pub fn new(
        overview_store: Arc<dyn OverviewStore>,
        customer_store: Arc<dyn CustomerStore>,
        revenue_store: Arc<dyn RevenueStore>,
        ai_store: Arc<dyn AiStore>,
        ops_store: Arc<dyn OpsStore>,
    ) -> Self {
        Self {
            overview_store,
            customer_store,
            revenue_store,
            ai_store,
            ops_store,
        }
    }

    /// Creates a new application state with in-memory stores.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self {
            overview_store: Arc::new(InMemoryOverviewStore::new()),
            customer_store: Arc::new(InMemoryCustomerStore::new()),
            revenue_store: Arc::new(InMemoryRevenueStore::new()),
            ai_store: Arc::new(InMemoryAiStore::new()),
            ops_store: Arc::new(InMemoryOpsStore::new()),
        }
    }

    /// Creates a new application state backed by `ClickHouse`.
    #[must_use]
    pub fn with_clickhouse(database: &Database) -> Self {
        let client = database.client();
        Self {
            overview_store: Arc::new(ClickHouseOverviewStore::new(Arc::clone(&client))),
            customer_store: Arc::new(ClickHouseCustomerStore::new(Arc::clone(&client))),
            revenue_store: Arc::new(ClickHouseRevenueStore::new(Arc::clone(&client))),
            ai_store: Arc::new(ClickHouseAiStore::new(Arc::clone(&client))),
            ops_store: Arc::new(ClickHouseOpsStore::new(client)),
        }
    }

    /// Returns a reference to the overview store.
    #[must_use]
    pub fn overview_store(&self) -> &dyn OverviewStore {
        self.overview_store.as_ref()
    }

    /// Returns a reference to the customer store.
    #[must_use]
    pub fn customer_store(&self) -> &dyn CustomerStore {
        self.customer_store.as_ref()
    }

    /// Returns a reference to the revenue store.
    #[must_use]
    pub fn revenue_store(&self) -> &dyn RevenueStore {
        self.revenue_store.as_ref()
    }

    /// Returns a reference to the AI store.
    #[must_use]
    pub fn ai_store(&self) -> &dyn AiStore {
        self.ai_store.as_ref()
    }

    /// Returns a reference to the operational store.
    #[must_use]
    pub fn ops_store(&self) -> &dyn OpsStore {
        self.ops_store.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
