//! Usage event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An append-only record of metered usage.
///
/// Rows are never mutated or deleted by the engine. The caller-supplied
/// `idempotency_key` is unique; replays return the original row unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Tenant the usage is billed against.
    pub tenant_id: Uuid,
    /// API key that performed the usage, if key-authenticated.
    pub api_key_id: Option<Uuid>,
    /// User that performed the usage, if session-authenticated.
    pub user_id: Option<Uuid>,
    /// Calling service.
    pub service: String,
    /// Metered action name.
    pub action: String,
    /// Units consumed.
    pub quantity: i64,
    /// Period bucket label the event was tagged with at record time.
    pub period_bucket: String,
    /// Caller-supplied globally unique de-duplication token.
    pub idempotency_key: String,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Input for recording a usage event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUsage {
    /// Tenant the usage is billed against.
    pub tenant_id: Uuid,
    /// API key that performed the usage, if any.
    pub api_key_id: Option<Uuid>,
    /// User that performed the usage, if any.
    pub user_id: Option<Uuid>,
    /// Calling service.
    pub service: String,
    /// Metered action name.
    pub action: String,
    /// Units consumed. Must be positive.
    pub quantity: i64,
    /// Caller-supplied globally unique de-duplication token.
    pub idempotency_key: String,
}
