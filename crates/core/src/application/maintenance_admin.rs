// Maintenance Admin Service
// Toggle and inspect per-page maintenance records

use crate::domain::maintenance::MAX_MESSAGE_LEN;
use crate::domain::{ChangeKind, MaintenanceRecord, MaintenanceStatus, PageKey};
use crate::error::{AppError, Result};
use crate::port::{FetchError, MaintenanceRepository, MaintenanceStatusSource, TimeProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Admin write for one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMaintenanceRequest {
    pub is_maintenance: bool,
    #[serde(default)]
    pub maintenance_message: Option<String>,
}

pub struct MaintenanceAdminService {
    repo: Arc<dyn MaintenanceRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl MaintenanceAdminService {
    pub fn new(repo: Arc<dyn MaintenanceRepository>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            repo,
            time_provider,
        }
    }

    pub async fn get(&self, key: &PageKey) -> Result<Option<MaintenanceRecord>> {
        self.repo.find(key).await
    }

    /// Status for the read endpoint. A page without a record is not in
    /// maintenance.
    pub async fn status(&self, key: &PageKey) -> Result<MaintenanceStatus> {
        Ok(self
            .repo
            .find(key)
            .await?
            .map(|record| record.status())
            .unwrap_or_default())
    }

    pub async fn list(&self) -> Result<Vec<MaintenanceRecord>> {
        self.repo.list().await
    }

    /// Insert or update the record for `key`
    pub async fn set(
        &self,
        key: PageKey,
        req: SetMaintenanceRequest,
    ) -> Result<MaintenanceRecord> {
        let message = normalize_message(req.maintenance_message)?;

        let record = MaintenanceRecord {
            page_path: key,
            is_maintenance: req.is_maintenance,
            maintenance_message: message,
            updated_at: self.time_provider.now_millis(),
        };

        let kind = self.repo.upsert(&record).await?;

        info!(
            page_key = %record.page_path,
            is_maintenance = record.is_maintenance,
            change = %kind,
            "Maintenance record saved"
        );

        Ok(record)
    }

    /// Remove the record for `key`. Returns whether one existed.
    pub async fn clear(&self, key: &PageKey) -> Result<bool> {
        let removed = self.repo.delete(key).await?;
        if removed {
            info!(page_key = %key, change = %ChangeKind::Delete, "Maintenance record removed");
        }
        Ok(removed)
    }
}

/// Serves the resolver directly from the store (in-process read path)
#[async_trait]
impl MaintenanceStatusSource for MaintenanceAdminService {
    async fn fetch_status(&self, key: &PageKey) -> std::result::Result<MaintenanceStatus, FetchError> {
        self.status(key)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

fn normalize_message(message: Option<String>) -> Result<Option<String>> {
    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    if let Some(m) = &message {
        if m.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "Maintenance message too long (max {} chars)",
                MAX_MESSAGE_LEN
            )));
        }
    }
    Ok(message)
}
