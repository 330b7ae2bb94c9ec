// Content Repository Port
// Admin component collections (casinos, banners, content blocks, media)

use crate::domain::{AdminComponent, ContentItem};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// All items of a component, ordered by id
    async fn list(&self, component: AdminComponent) -> Result<Vec<ContentItem>>;

    async fn find(&self, component: AdminComponent, id: &str) -> Result<Option<ContentItem>>;

    /// Insert or replace an item. An existing row keeps its `created_at`.
    async fn upsert(&self, item: &ContentItem) -> Result<ContentItem>;

    /// # Returns
    /// Whether a row existed
    async fn delete(&self, component: AdminComponent, id: &str) -> Result<bool>;
}

pub mod mocks {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct InMemoryContentRepository {
        rows: Arc<Mutex<BTreeMap<(String, String), ContentItem>>>,
    }

    impl InMemoryContentRepository {
        pub fn new() -> Self {
            Self::default()
        }
    }

    fn row_key(component: AdminComponent, id: &str) -> (String, String) {
        (component.as_str().to_string(), id.to_string())
    }

    #[async_trait]
    impl ContentRepository for InMemoryContentRepository {
        async fn list(&self, component: AdminComponent) -> Result<Vec<ContentItem>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|item| item.component == component)
                .cloned()
                .collect())
        }

        async fn find(&self, component: AdminComponent, id: &str) -> Result<Option<ContentItem>> {
            Ok(self.rows.lock().unwrap().get(&row_key(component, id)).cloned())
        }

        async fn upsert(&self, item: &ContentItem) -> Result<ContentItem> {
            let mut rows = self.rows.lock().unwrap();
            let key = row_key(item.component, &item.id);
            let mut stored = item.clone();
            if let Some(existing) = rows.get(&key) {
                stored.created_at = existing.created_at;
            }
            rows.insert(key, stored.clone());
            Ok(stored)
        }

        async fn delete(&self, component: AdminComponent, id: &str) -> Result<bool> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .remove(&row_key(component, id))
                .is_some())
        }
    }
}
