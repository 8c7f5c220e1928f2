//! Session repository implementation.

use async_trait::async_trait;
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::session::{Session, UpsertSession};

use crate::store::Store;
use crate::stores::SessionStore;

/// Repository for session rows.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    store: Store,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn find_by_refresh_hash(&self, hash: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE refresh_token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash)
        .fetch_optional(self.store.pool())
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find session by refresh token",
                e,
            )
        })
    }

    async fn upsert(&self, data: &UpsertSession) -> AppResult<Session> {
        // The partial unique index on (user_id, tenant_id, service) covers
        // NULL tenant_id via COALESCE to the nil UUID, so a second login for
        // the same triple always lands on the conflict arm.
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (user_id, tenant_id, service, refresh_token_hash, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, COALESCE(tenant_id, '00000000-0000-0000-0000-000000000000'::uuid), service) \
             DO UPDATE SET refresh_token_hash = EXCLUDED.refresh_token_hash, \
                           expires_at = EXCLUDED.expires_at, \
                           revoked_at = NULL, \
                           updated_at = NOW() \
             RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.tenant_id)
        .bind(&data.service)
        .bind(&data.refresh_token_hash)
        .bind(data.expires_at)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert session", e))
    }

    async fn rotate_refresh_hash(&self, id: Uuid, new_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE sessions SET refresh_token_hash = $2, updated_at = NOW() \
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(new_hash)
        .execute(self.store.pool())
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rotate refresh token", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::authentication("Session is no longer live"));
        }
        Ok(())
    }

    async fn revoke(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE sessions SET revoked_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke session", e))?;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(self.store.pool())
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke user sessions", e)
        })?;
        Ok(result.rows_affected())
    }
}
