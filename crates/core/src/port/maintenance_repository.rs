// Maintenance Repository Port
// CRUD over page_maintenance rows, keyed by page key

use crate::domain::{ChangeKind, MaintenanceRecord, PageKey};
use crate::error::Result;
use async_trait::async_trait;

/// Maintenance record store
///
/// Implementations publish a change event for every row they insert,
/// update, or delete.
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Find the record for a page key
    async fn find(&self, key: &PageKey) -> Result<Option<MaintenanceRecord>>;

    /// All records, ordered by page key
    async fn list(&self) -> Result<Vec<MaintenanceRecord>>;

    /// Insert or replace a record
    ///
    /// # Returns
    /// `ChangeKind::Insert` for a new row, `ChangeKind::Update` otherwise
    async fn upsert(&self, record: &MaintenanceRecord) -> Result<ChangeKind>;

    /// Delete the record for a page key
    ///
    /// # Returns
    /// Whether a row existed
    async fn delete(&self, key: &PageKey) -> Result<bool>;
}

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// In-memory store (no change events)
    #[derive(Clone, Default)]
    pub struct InMemoryMaintenanceRepository {
        rows: Arc<Mutex<BTreeMap<PageKey, MaintenanceRecord>>>,
    }

    impl InMemoryMaintenanceRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MaintenanceRepository for InMemoryMaintenanceRepository {
        async fn find(&self, key: &PageKey) -> Result<Option<MaintenanceRecord>> {
            Ok(self.rows.lock().unwrap().get(key).cloned())
        }

        async fn list(&self) -> Result<Vec<MaintenanceRecord>> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn upsert(&self, record: &MaintenanceRecord) -> Result<ChangeKind> {
            let previous = self
                .rows
                .lock()
                .unwrap()
                .insert(record.page_path.clone(), record.clone());
            Ok(match previous {
                Some(_) => ChangeKind::Update,
                None => ChangeKind::Insert,
            })
        }

        async fn delete(&self, key: &PageKey) -> Result<bool> {
            Ok(self.rows.lock().unwrap().remove(key).is_some())
        }
    }
}
