//! Tenant membership repository implementation.

use async_trait::async_trait;
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::membership::{TenantRole, TenantUser};

use crate::store::Store;
use crate::stores::MembershipStore;

use super::is_unique_violation;

/// Repository for tenant membership rows.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    store: Store,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn find(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<Option<TenantUser>> {
        sqlx::query_as::<_, TenantUser>(
            "SELECT * FROM tenant_users WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find membership", e))
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<TenantUser>> {
        sqlx::query_as::<_, TenantUser>(
            "SELECT * FROM tenant_users WHERE tenant_id = $1 ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list memberships", e))
    }

    async fn add(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
    ) -> AppResult<TenantUser> {
        sqlx::query_as::<_, TenantUser>(
            "INSERT INTO tenant_users (tenant_id, user_id, role) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("User is already a member of this tenant")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to add membership", e)
            }
        })
    }

    async fn set_role(&self, tenant_id: Uuid, user_id: Uuid, role: TenantRole) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE tenant_users SET role = $3, updated_at = NOW() \
             WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(role)
        .execute(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update role", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Membership not found"));
        }
        Ok(())
    }

    async fn remove(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tenant_users WHERE tenant_id = $1 AND user_id = $2")
            .bind(tenant_id)
            .bind(user_id)
            .execute(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove membership", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_owners(&self, tenant_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tenant_users WHERE tenant_id = $1 AND role = 'owner'",
        )
        .bind(tenant_id)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count owners", e))?;
        Ok(count)
    }
}
