//! Administrative override repository implementation.

use async_trait::async_trait;
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::overrides::{AdminOverride, CreateOverride};

use crate::store::Store;
use crate::stores::OverrideStore;

/// Repository for administrative override rows.
#[derive(Debug, Clone)]
pub struct OverrideRepository {
    store: Store,
}

impl OverrideRepository {
    /// Create a new override repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OverrideStore for OverrideRepository {
    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<AdminOverride>> {
        sqlx::query_as::<_, AdminOverride>(
            "SELECT * FROM admin_overrides WHERE tenant_id = $1 ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list overrides", e))
    }

    async fn create(&self, data: &CreateOverride) -> AppResult<AdminOverride> {
        sqlx::query_as::<_, AdminOverride>(
            "INSERT INTO admin_overrides (tenant_id, override_type, value, expires_at, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.tenant_id)
        .bind(data.override_type)
        .bind(&data.value)
        .bind(data.expires_at)
        .bind(data.created_by)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create override", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM admin_overrides WHERE id = $1")
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete override", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
