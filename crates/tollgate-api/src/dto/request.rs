//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tollgate_entity::api_key::QuotaPeriod;
use tollgate_entity::membership::TenantRole;
use tollgate_entity::tenant::TenantTier;

/// POST /api/auth/login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[validate(email)]
    pub email: String,
    /// Account password.
    #[validate(length(min = 1, max = 512))]
    pub password: String,
    /// Tenant scope for the session, if any.
    pub tenant_id: Option<Uuid>,
    /// Service audience the session token is bound to.
    #[validate(length(min = 1, max = 128))]
    pub service: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// The one-time refresh token from the previous login or refresh.
    #[validate(length(min = 1, max = 512))]
    pub refresh_token: String,
    /// Expected service audience; must match the session's.
    #[validate(length(min = 1, max = 128))]
    pub service: String,
}

/// POST /api/auth/logout
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    /// Service audience of the presented token.
    #[validate(length(min = 1, max = 128))]
    pub service: String,
}

/// POST /api/signup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Name of the tenant to create.
    #[validate(length(min = 1, max = 128))]
    pub tenant_name: String,
    /// Initial plan tier. Defaults to free.
    pub tier: Option<TenantTier>,
    /// Owner account email.
    #[validate(email)]
    pub email: String,
    /// Owner account password.
    #[validate(length(min = 8, max = 512))]
    pub password: String,
}

/// Context half of the authorize request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthorizeContext {
    /// The tenant the request acts within.
    pub tenant_id: Uuid,
    /// The calling service; must match the token audience.
    #[validate(length(min = 1, max = 128))]
    pub service: String,
    /// Session behind the token, if known to the caller.
    pub session_id: Option<Uuid>,
    /// API key behind the token, if known to the caller.
    pub api_key_id: Option<Uuid>,
    /// Feature the action depends on.
    pub required_feature: Option<String>,
    /// Minimum tenant role the action demands.
    pub required_role: Option<TenantRole>,
    /// Quota units the action will consume. Defaults to 1.
    pub quantity: Option<i64>,
}

/// POST /api/authorize
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthorizeRequest {
    /// The action being performed.
    #[validate(length(min = 1, max = 128))]
    pub action: String,
    /// The resource acted on, if relevant.
    pub resource: Option<String>,
    /// Request context.
    #[validate(nested)]
    pub context: AuthorizeContext,
}

/// POST /api/tenants/{tenant_id}/keys
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateKeyRequest {
    /// Human-readable label.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Granted scopes; `*` is the wildcard.
    pub scopes: Vec<String>,
    /// Key-level usage ceiling.
    pub quota_limit: Option<i64>,
    /// Accounting period for the ceiling.
    pub quota_period: Option<QuotaPeriod>,
    /// Hard expiry, if any.
    pub expires_at: Option<DateTime<Utc>>,
}

/// PATCH /api/tenants/{tenant_id}/keys/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateKeyRequest {
    /// New label.
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New scope list.
    pub scopes: Option<Vec<String>>,
}

/// POST /api/tenants/{tenant_id}/members
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: Uuid,
    /// Their role.
    pub role: TenantRole,
}

/// PATCH /api/tenants/{tenant_id}/members/{user_id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    /// The new role.
    pub role: TenantRole,
}

/// POST /internal/usage
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordUsageRequest {
    /// Tenant the usage is billed against.
    pub tenant_id: Uuid,
    /// API key that performed the usage, if any.
    pub api_key_id: Option<Uuid>,
    /// User that performed the usage, if any.
    pub user_id: Option<Uuid>,
    /// Calling service.
    #[validate(length(min = 1, max = 128))]
    pub service: String,
    /// Metered action name.
    #[validate(length(min = 1, max = 128))]
    pub action: String,
    /// Units consumed.
    #[validate(range(min = 1))]
    pub quantity: i64,
    /// Globally unique de-duplication token chosen by the caller.
    #[validate(length(min = 1, max = 256))]
    pub idempotency_key: String,
}
