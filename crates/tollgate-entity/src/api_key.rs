//! API key entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "api_key_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    /// Usable for authentication.
    Active,
    /// Soft-revoked; never usable again.
    Revoked,
}

/// Quota accounting period attached to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quota_period", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuotaPeriod {
    /// Resets every UTC hour.
    Hour,
    /// Resets every UTC day.
    Day,
    /// Resets every UTC month.
    Month,
}

impl QuotaPeriod {
    /// Compute the bucket label for a timestamp, always in UTC.
    ///
    /// Formats: hour `YYYY-MM-DD-HH`, day `YYYY-MM-DD`, month `YYYY-MM`.
    pub fn bucket_label(&self, at: DateTime<Utc>) -> String {
        match self {
            Self::Hour => at.format("%Y-%m-%d-%H").to_string(),
            Self::Day => at.format("%Y-%m-%d").to_string(),
            Self::Month => at.format("%Y-%m").to_string(),
        }
    }
}

/// A long-lived tenant credential, independent of user sessions.
///
/// Only the SHA-256 digest of the key is persisted; the plaintext is
/// returned exactly once at creation and is never retrievable again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiKey {
    /// Unique key identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Human-readable label.
    pub name: String,
    /// SHA-256 hex digest of the plaintext key.
    #[serde(skip_serializing)]
    pub key_hash: String,
    /// Display prefix for identification in listings (`tg_` + 8 chars).
    pub key_prefix: String,
    /// Actions this key may perform. `*` is the wildcard scope.
    pub scopes: Vec<String>,
    /// Usage ceiling within `quota_period`. `None` means no key-level limit.
    pub quota_limit: Option<i64>,
    /// Accounting period for `quota_limit`.
    pub quota_period: Option<QuotaPeriod>,
    /// Lifecycle status.
    pub status: ApiKeyStatus,
    /// Hard expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the key was revoked, if it has been.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Last successful validation time (best-effort).
    pub last_used_at: Option<DateTime<Utc>>,
    /// When the key was created.
    pub created_at: DateTime<Utc>,
    /// When the key was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    /// Check whether the key authorizes the given action.
    pub fn allows_scope(&self, action: &str) -> bool {
        self.scopes.iter().any(|s| s == "*" || s == action)
    }

    /// Check whether the key is currently usable.
    pub fn is_usable(&self) -> bool {
        self.status == ApiKeyStatus::Active
            && self.revoked_at.is_none()
            && self
                .expires_at
                .map(|exp| exp > Utc::now())
                .unwrap_or(true)
    }
}

/// Data required to create a new API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKey {
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Human-readable label.
    pub name: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// Key-level usage ceiling, if any.
    pub quota_limit: Option<i64>,
    /// Accounting period for the ceiling.
    pub quota_period: Option<QuotaPeriod>,
    /// Hard expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Mutable fields of an existing key. Hash, prefix, and tenant binding are
/// immutable post-creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApiKey {
    /// New label, if changing.
    pub name: Option<String>,
    /// New scope list, if changing.
    pub scopes: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bucket_labels_utc() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 9, 42, 5).unwrap();
        assert_eq!(QuotaPeriod::Hour.bucket_label(at), "2025-03-07-09");
        assert_eq!(QuotaPeriod::Day.bucket_label(at), "2025-03-07");
        assert_eq!(QuotaPeriod::Month.bucket_label(at), "2025-03");
    }

    #[test]
    fn test_scope_wildcard() {
        let mut key = sample_key();
        key.scopes = vec!["read".into(), "write".into()];
        assert!(key.allows_scope("read"));
        assert!(!key.allows_scope("delete"));

        key.scopes = vec!["*".into()];
        assert!(key.allows_scope("anything"));
    }

    #[test]
    fn test_usability() {
        let mut key = sample_key();
        assert!(key.is_usable());

        key.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        assert!(!key.is_usable());

        key.expires_at = None;
        key.status = ApiKeyStatus::Revoked;
        assert!(!key.is_usable());
    }

    fn sample_key() -> ApiKey {
        ApiKey {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "test".into(),
            key_hash: String::new(),
            key_prefix: "tg_abcd1234".into(),
            scopes: vec!["*".into()],
            quota_limit: None,
            quota_period: None,
            status: ApiKeyStatus::Active,
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
