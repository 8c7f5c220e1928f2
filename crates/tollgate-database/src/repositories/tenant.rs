//! Tenant repository implementation.

use async_trait::async_trait;
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::membership::TenantRole;
use tollgate_entity::tenant::{CreateTenant, Tenant};

use crate::store::Store;
use crate::stores::TenantStore;

use super::is_unique_violation;

/// Repository for tenant rows.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    store: Store,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant", e))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE name = $1")
            .bind(name)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find tenant by name", e)
            })
    }

    async fn create_with_owner(
        &self,
        data: &CreateTenant,
        owner_user_id: Uuid,
    ) -> AppResult<Tenant> {
        let mut tx = self.store.begin().await?;

        let tenant = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (name, tier, global_quota_limit) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.tier)
        .bind(data.global_quota_limit)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("A tenant with this name already exists")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create tenant", e)
            }
        })?;

        sqlx::query("INSERT INTO tenant_users (tenant_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(tenant.id)
            .bind(owner_user_id)
            .bind(TenantRole::Owner)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create owner membership", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit tenant creation", e)
        })?;

        Ok(tenant)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete tenant", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
