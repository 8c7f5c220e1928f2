//! Usage event repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::usage::{RecordUsage, UsageEvent};

use crate::store::Store;
use crate::stores::UsageStore;

/// Repository for the append-only usage event log.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    store: Store,
}

impl UsageRepository {
    /// Create a new usage repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UsageStore for UsageRepository {
    async fn find_by_idempotency_key(&self, key: &str) -> AppResult<Option<UsageEvent>> {
        sqlx::query_as::<_, UsageEvent>("SELECT * FROM usage_events WHERE idempotency_key = $1")
            .bind(key)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find usage event", e)
            })
    }

    async fn insert(&self, data: &RecordUsage, period_bucket: &str) -> AppResult<UsageEvent> {
        // ON CONFLICT DO NOTHING covers the race between two writers with the
        // same idempotency key; the loser re-reads and returns the original.
        let inserted = sqlx::query_as::<_, UsageEvent>(
            "INSERT INTO usage_events \
             (tenant_id, api_key_id, user_id, service, action, quantity, period_bucket, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (idempotency_key) DO NOTHING \
             RETURNING *",
        )
        .bind(data.tenant_id)
        .bind(data.api_key_id)
        .bind(data.user_id)
        .bind(&data.service)
        .bind(&data.action)
        .bind(data.quantity)
        .bind(period_bucket)
        .bind(&data.idempotency_key)
        .fetch_optional(self.store.pool())
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert usage event", e)
        })?;

        match inserted {
            Some(event) => Ok(event),
            None => self
                .find_by_idempotency_key(&data.idempotency_key)
                .await?
                .ok_or_else(|| {
                    AppError::internal("Usage event vanished after idempotency conflict")
                }),
        }
    }

    async fn sum_for_api_key(&self, api_key_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let sum: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM usage_events WHERE api_key_id = $1 AND created_at >= $2",
        )
        .bind(api_key_id)
        .bind(since)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to sum key usage", e))?;
        Ok(sum.unwrap_or(0))
    }

    async fn sum_for_tenant(&self, tenant_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let sum: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(quantity) FROM usage_events WHERE tenant_id = $1 AND created_at >= $2",
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sum tenant usage", e)
        })?;
        Ok(sum.unwrap_or(0))
    }
}
