//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tollgate_entity::api_key::{ApiKey, ApiKeyStatus, QuotaPeriod};
use tollgate_service::authorize::{Decision, DecisionLevel};
use tollgate_service::quota::QuotaCheck;

/// Body of a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed session JWT.
    pub access_token: String,
    /// When the access token expires.
    pub access_expires_at: DateTime<Utc>,
    /// One-time refresh token; the previous one is now dead.
    pub refresh_token: String,
    /// The session behind the tokens.
    pub session_id: Uuid,
}

/// Body of a signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    /// The created tenant.
    pub tenant_id: Uuid,
    /// The owner account.
    pub user_id: Uuid,
}

/// Decision metadata exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMetadata {
    /// Which check decided.
    pub level: DecisionLevel,
    /// Quota numbers, when the quota check ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaCheck>,
    /// The tenant's effective tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// Body of the authorize endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Why.
    pub reason: String,
    /// Enough detail for an actionable error message.
    pub metadata: DecisionMetadata,
}

impl From<Decision> for AuthorizeResponse {
    fn from(decision: Decision) -> Self {
        Self {
            allowed: decision.allowed,
            reason: decision.reason,
            metadata: DecisionMetadata {
                level: decision.level,
                quota: decision.quota,
                tier: decision.tier.map(|t| t.to_string()),
            },
        }
    }
}

/// Public API key metadata. Never contains key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    /// Key identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Label.
    pub name: String,
    /// Display prefix for identification.
    pub key_prefix: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// Key-level usage ceiling.
    pub quota_limit: Option<i64>,
    /// Accounting period.
    pub quota_period: Option<QuotaPeriod>,
    /// Lifecycle status.
    pub status: ApiKeyStatus,
    /// Hard expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Last validation time.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            tenant_id: key.tenant_id,
            name: key.name,
            key_prefix: key.key_prefix,
            scopes: key.scopes,
            quota_limit: key.quota_limit,
            quota_period: key.quota_period,
            status: key.status,
            expires_at: key.expires_at,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
        }
    }
}

/// Body returned exactly once at key creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedKeyResponse {
    /// The plaintext key. This is the only time it is ever returned.
    pub api_key: String,
    /// Public metadata.
    pub key: ApiKeyResponse,
}

/// Body of a successful usage recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecordedResponse {
    /// The recorded (or replayed) event.
    pub event_id: Uuid,
    /// Units still available after this recording.
    pub remaining: i64,
    /// Bucket the event was tagged with.
    pub period_bucket: String,
}

/// Body of a quota denial on the usage endpoint (HTTP 429).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageDeniedResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// The failing quota check.
    pub quota: QuotaCheck,
}

/// Tenant member representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    /// The member.
    pub user_id: Uuid,
    /// Their role.
    pub role: String,
    /// When they joined.
    pub created_at: DateTime<Utc>,
}

/// Health endpoint body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status string.
    pub status: String,
    /// Whether the store answered.
    pub database: bool,
}

/// Generic message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// The message.
    pub message: String,
}
