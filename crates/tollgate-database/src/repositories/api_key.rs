//! API key repository implementation.

use async_trait::async_trait;
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::api_key::{ApiKey, CreateApiKey, UpdateApiKey};

use crate::store::Store;
use crate::stores::ApiKeyStore;

use super::is_unique_violation;

/// Repository for API key rows.
#[derive(Debug, Clone)]
pub struct ApiKeyRepository {
    store: Store,
}

impl ApiKeyRepository {
    /// Create a new API key repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApiKeyStore for ApiKeyRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE id = $1")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find API key", e))
    }

    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key_hash = $1")
            .bind(key_hash)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find API key by hash", e)
            })
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<ApiKey>> {
        sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list API keys", e))
    }

    async fn create(
        &self,
        data: &CreateApiKey,
        key_hash: &str,
        key_prefix: &str,
    ) -> AppResult<ApiKey> {
        sqlx::query_as::<_, ApiKey>(
            "INSERT INTO api_keys \
             (tenant_id, name, key_hash, key_prefix, scopes, quota_limit, quota_period, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.tenant_id)
        .bind(&data.name)
        .bind(key_hash)
        .bind(key_prefix)
        .bind(&data.scopes)
        .bind(data.quota_limit)
        .bind(data.quota_period)
        .bind(data.expires_at)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                // Astronomically unlikely digest collision; surface as internal
                // rather than leaking key-space information.
                AppError::internal("Key digest collision")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create API key", e)
            }
        })
    }

    async fn update(&self, id: Uuid, tenant_id: Uuid, data: &UpdateApiKey) -> AppResult<ApiKey> {
        sqlx::query_as::<_, ApiKey>(
            "UPDATE api_keys SET \
               name = COALESCE($3, name), \
               scopes = COALESCE($4, scopes), \
               updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&data.name)
        .bind(&data.scopes)
        .fetch_optional(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update API key", e))?
        .ok_or_else(|| AppError::not_found("API key not found"))
    }

    async fn revoke(&self, id: Uuid, tenant_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE api_keys SET status = 'revoked', revoked_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 AND status = 'active'",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke API key", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Active API key not found"));
        }
        Ok(())
    }

    async fn touch_last_used(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to touch last_used_at", e)
            })?;
        Ok(())
    }
}
