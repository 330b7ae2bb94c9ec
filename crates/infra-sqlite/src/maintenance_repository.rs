// SQLite MaintenanceRepository Implementation

use crate::change_feed::BroadcastChangeFeed;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use cgsg_core::domain::{ChangeEvent, ChangeKind, MaintenanceRecord, PageKey};
use cgsg_core::error::{AppError, Result};
use cgsg_core::port::MaintenanceRepository;
use sqlx::SqlitePool;

/// page_maintenance store. Every committed write is published on the feed.
pub struct SqliteMaintenanceRepository {
    pool: SqlitePool,
    feed: BroadcastChangeFeed,
}

impl SqliteMaintenanceRepository {
    pub fn new(pool: SqlitePool, feed: BroadcastChangeFeed) -> Self {
        Self { pool, feed }
    }
}

#[async_trait]
impl MaintenanceRepository for SqliteMaintenanceRepository {
    async fn find(&self, key: &PageKey) -> Result<Option<MaintenanceRecord>> {
        let row = sqlx::query_as::<_, MaintenanceRow>(
            "SELECT page_path, is_maintenance, maintenance_message, updated_at
             FROM page_maintenance WHERE page_path = ?",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(MaintenanceRow::into_record).transpose()
    }

    async fn list(&self) -> Result<Vec<MaintenanceRecord>> {
        let rows = sqlx::query_as::<_, MaintenanceRow>(
            "SELECT page_path, is_maintenance, maintenance_message, updated_at
             FROM page_maintenance ORDER BY page_path",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(MaintenanceRow::into_record).collect()
    }

    async fn upsert(&self, record: &MaintenanceRecord) -> Result<ChangeKind> {
        // One statement, so concurrent first writes cannot both see a missing row
        let revision: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO page_maintenance (page_path, is_maintenance, maintenance_message, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(page_path) DO UPDATE SET
                is_maintenance = excluded.is_maintenance,
                maintenance_message = excluded.maintenance_message,
                updated_at = excluded.updated_at,
                revision = page_maintenance.revision + 1
            RETURNING revision
            "#,
        )
        .bind(record.page_path.as_str())
        .bind(record.is_maintenance)
        .bind(&record.maintenance_message)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let kind = if revision == 1 {
            ChangeKind::Insert
        } else {
            ChangeKind::Update
        };
        self.feed
            .publish(ChangeEvent::new(kind, record.page_path.clone()));
        Ok(kind)
    }

    async fn delete(&self, key: &PageKey) -> Result<bool> {
        let result = sqlx::query("DELETE FROM page_maintenance WHERE page_path = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.feed
                .publish(ChangeEvent::new(ChangeKind::Delete, key.clone()));
        }
        Ok(removed)
    }
}

// Helper struct for sqlx::FromRow
#[derive(sqlx::FromRow)]
struct MaintenanceRow {
    page_path: String,
    is_maintenance: bool,
    maintenance_message: Option<String>,
    updated_at: i64,
}

impl MaintenanceRow {
    fn into_record(self) -> Result<MaintenanceRecord> {
        let page_path = PageKey::parse(&self.page_path).map_err(|e| {
            AppError::Database(format!("Corrupt page_path '{}': {}", self.page_path, e))
        })?;

        Ok(MaintenanceRecord {
            page_path,
            is_maintenance: self.is_maintenance,
            maintenance_message: self.maintenance_message,
            updated_at: self.updated_at,
        })
    }
}
