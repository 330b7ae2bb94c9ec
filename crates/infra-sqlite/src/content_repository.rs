// SQLite ContentRepository Implementation
// One table per AdminComponent; table names come only from the enum

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use cgsg_core::domain::{AdminComponent, ContentItem};
use cgsg_core::error::{AppError, Result};
use cgsg_core::port::ContentRepository;
use sqlx::SqlitePool;

pub struct SqliteContentRepository {
    pool: SqlitePool,
}

impl SqliteContentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for SqliteContentRepository {
    async fn list(&self, component: AdminComponent) -> Result<Vec<ContentItem>> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} ORDER BY id",
            component.table()
        );
        let rows = sqlx::query_as::<_, ContentRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| row.into_item(component))
            .collect()
    }

    async fn find(&self, component: AdminComponent, id: &str) -> Result<Option<ContentItem>> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} WHERE id = ?",
            component.table()
        );
        let row = sqlx::query_as::<_, ContentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|row| row.into_item(component)).transpose()
    }

    async fn upsert(&self, item: &ContentItem) -> Result<ContentItem> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, data, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
            item.component.table()
        );
        sqlx::query(&sql)
            .bind(&item.id)
            .bind(item.data.to_string())
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        self.find(item.component, &item.id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "{} item '{}' missing after upsert",
                item.component, item.id
            ))
        })
    }

    async fn delete(&self, component: AdminComponent, id: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", component.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// Helper struct for sqlx::FromRow
#[derive(sqlx::FromRow)]
struct ContentRow {
    id: String,
    data: String,
    created_at: i64,
    updated_at: i64,
}

impl ContentRow {
    fn into_item(self, component: AdminComponent) -> Result<ContentItem> {
        Ok(ContentItem {
            data: serde_json::from_str(&self.data)?,
            id: self.id,
            component,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use serde_json::json;

    async fn setup_repo() -> SqliteContentRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteContentRepository::new(pool)
    }

    fn item(component: AdminComponent, id: &str, data: serde_json::Value, at: i64) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            component,
            data,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_components_are_isolated() {
        let repo = setup_repo().await;
        repo.upsert(&item(AdminComponent::Casinos, "x", json!({"name": "X"}), 1))
            .await
            .unwrap();

        assert_eq!(repo.list(AdminComponent::Casinos).await.unwrap().len(), 1);
        assert!(repo.list(AdminComponent::Banners).await.unwrap().is_empty());
        assert!(repo
            .find(AdminComponent::Media, "x")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at() {
        let repo = setup_repo().await;
        repo.upsert(&item(AdminComponent::Content, "faq", json!({"v": 1}), 100))
            .await
            .unwrap();
        let stored = repo
            .upsert(&item(AdminComponent::Content, "faq", json!({"v": 2}), 200))
            .await
            .unwrap();

        assert_eq!(stored.created_at, 100);
        assert_eq!(stored.updated_at, 200);
        assert_eq!(stored.data, json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup_repo().await;
        repo.upsert(&item(AdminComponent::Banners, "b1", json!({"title": "T"}), 1))
            .await
            .unwrap();

        assert!(repo.delete(AdminComponent::Banners, "b1").await.unwrap());
        assert!(!repo.delete(AdminComponent::Banners, "b1").await.unwrap());
    }
}
