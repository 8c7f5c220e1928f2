//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A live authentication context for a (user, tenant, service) triple.
///
/// At most one live session exists per triple; a second login replaces the
/// existing session's refresh token (upsert). Sessions are revoked on
/// logout, or lazily on first access after expiry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// The tenant scope, `None` for tenant-less sessions.
    pub tenant_id: Option<Uuid>,
    /// The service audience this session was issued for.
    pub service: String,
    /// SHA-256 hex digest of the current refresh token.
    pub refresh_token_hash: String,
    /// When the session expires (absolute timeout).
    pub expires_at: DateTime<Utc>,
    /// When the session was revoked, if it has been.
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session was last refreshed or replaced.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is live (not revoked and not expired).
    pub fn is_live(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Data for the session upsert performed on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSession {
    /// The user logging in.
    pub user_id: Uuid,
    /// The tenant scope, if any.
    pub tenant_id: Option<Uuid>,
    /// The service audience.
    pub service: String,
    /// SHA-256 hex digest of the freshly issued refresh token.
    pub refresh_token_hash: String,
    /// Absolute expiry for the new session.
    pub expires_at: DateTime<Utc>,
}
