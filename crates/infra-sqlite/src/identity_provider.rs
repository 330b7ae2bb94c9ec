// SQLite IdentityProvider Implementation
// Bearer tokens are stored as SHA-256 hex digests

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use cgsg_core::domain::{Identity, Role};
use cgsg_core::error::{AppError, Result};
use cgsg_core::port::{IdentityProvider, TimeProvider};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Hex SHA-256 of a bearer token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub struct SqliteIdentityProvider {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteIdentityProvider {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Register (or re-activate) a token for a user
    pub async fn issue_token(&self, token: &str, user_id: &str, role: Role) -> Result<()> {
        if token.trim().is_empty() {
            return Err(AppError::Validation("Token cannot be empty".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO api_tokens (token_hash, user_id, role, created_at, revoked_at)
            VALUES (?, ?, ?, ?, NULL)
            ON CONFLICT(token_hash) DO UPDATE SET
                user_id = excluded.user_id,
                role = excluded.role,
                revoked_at = NULL
            "#,
        )
        .bind(hash_token(token))
        .bind(user_id)
        .bind(role.as_str())
        .bind(self.time_provider.now_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        info!(user_id = %user_id, role = %role, "API token issued");
        Ok(())
    }

    /// Revoke a token. Returns whether an active token was revoked.
    pub async fn revoke_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE api_tokens SET revoked_at = ? WHERE token_hash = ? AND revoked_at IS NULL",
        )
        .bind(self.time_provider.now_millis())
        .bind(hash_token(token))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IdentityProvider for SqliteIdentityProvider {
    async fn resolve_token(&self, token: &str) -> Result<Option<Identity>> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT user_id, role FROM api_tokens WHERE token_hash = ? AND revoked_at IS NULL",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|(user_id, role)| {
            Ok(Identity {
                user_id,
                role: role.parse()?,
            })
        })
        .transpose()
    }
}
