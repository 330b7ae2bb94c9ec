// Content Service
// CRUD over admin component collections

use crate::domain::component::{validate_item_data, validate_item_id};
use crate::domain::{AdminComponent, ContentItem};
use crate::error::Result;
use crate::port::{ContentRepository, TimeProvider};
use std::sync::Arc;
use tracing::info;

pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn ContentRepository>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            repo,
            time_provider,
        }
    }

    pub async fn list(&self, component: AdminComponent) -> Result<Vec<ContentItem>> {
        self.repo.list(component).await
    }

    pub async fn get(&self, component: AdminComponent, id: &str) -> Result<Option<ContentItem>> {
        validate_item_id(id)?;
        self.repo.find(component, id).await
    }

    /// Validate and store an item
    pub async fn upsert(
        &self,
        component: AdminComponent,
        id: &str,
        data: serde_json::Value,
    ) -> Result<ContentItem> {
        validate_item_id(id)?;
        validate_item_data(component, &data)?;

        let now = self.time_provider.now_millis();
        let item = ContentItem {
            id: id.to_string(),
            component,
            data,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repo.upsert(&item).await?;
        info!(component = %component, id = %id, "Content item saved");
        Ok(stored)
    }

    pub async fn delete(&self, component: AdminComponent, id: &str) -> Result<bool> {
        validate_item_id(id)?;
        let removed = self.repo.delete(component, id).await?;
        if removed {
            info!(component = %component, id = %id, "Content item deleted");
        }
        Ok(removed)
    }
}
