//! Store-seam traits consumed by the auth and service layers.
//!
//! Each trait describes the persistence operations one service needs.
//! The concrete sqlx repositories in [`crate::repositories`] implement
//! them against PostgreSQL; tests implement them in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tollgate_core::result::AppResult;
use tollgate_entity::api_key::{ApiKey, CreateApiKey, UpdateApiKey};
use tollgate_entity::feature_flag::FeatureFlag;
use tollgate_entity::membership::{TenantRole, TenantUser};
use tollgate_entity::overrides::{AdminOverride, CreateOverride};
use tollgate_entity::session::{Session, UpsertSession};
use tollgate_entity::tenant::{CreateTenant, Tenant};
use tollgate_entity::usage::{RecordUsage, UsageEvent};
use tollgate_entity::user::{CreateUser, User};

/// Persistence operations for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by case-normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new user. Duplicate email surfaces as a conflict.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Record a failed login, optionally setting a lockout time.
    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Reset the failed-attempt counter and lockout.
    async fn reset_login_failures(&self, id: Uuid) -> AppResult<()>;

    /// Update the last-login timestamp.
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

/// Persistence operations for tenants.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Find a tenant by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>>;

    /// Find a tenant by unique name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Tenant>>;

    /// Atomically create a tenant and its owner membership.
    ///
    /// Both rows land in one batch; a partially created tenant is never
    /// observable. Duplicate name surfaces as a conflict.
    async fn create_with_owner(&self, data: &CreateTenant, owner_user_id: Uuid)
    -> AppResult<Tenant>;

    /// Delete a tenant. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Persistence operations for tenant memberships.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Find a membership by (tenant, user).
    async fn find(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<Option<TenantUser>>;

    /// List all memberships of a tenant.
    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<TenantUser>>;

    /// Add a membership. Duplicate (tenant, user) surfaces as a conflict.
    async fn add(&self, tenant_id: Uuid, user_id: Uuid, role: TenantRole)
    -> AppResult<TenantUser>;

    /// Change a member's role.
    async fn set_role(&self, tenant_id: Uuid, user_id: Uuid, role: TenantRole) -> AppResult<()>;

    /// Remove a membership. Returns `true` if a row was removed.
    async fn remove(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Count the tenant's owners.
    async fn count_owners(&self, tenant_id: Uuid) -> AppResult<i64>;
}

/// Persistence operations for sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Find a session by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Find a live session by refresh token digest.
    async fn find_by_refresh_hash(&self, hash: &str) -> AppResult<Option<Session>>;

    /// Upsert the session for (user, tenant, service).
    ///
    /// A second login for the same triple replaces the refresh token hash
    /// and expiry of the existing row instead of inserting a duplicate.
    async fn upsert(&self, data: &UpsertSession) -> AppResult<Session>;

    /// Rotate the refresh token digest after a successful refresh.
    async fn rotate_refresh_hash(&self, id: Uuid, new_hash: &str) -> AppResult<()>;

    /// Revoke a session.
    async fn revoke(&self, id: Uuid) -> AppResult<()>;

    /// Revoke every live session of a user. Returns the revoked count.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

/// Persistence operations for API keys.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Find a key by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ApiKey>>;

    /// Find a key by SHA-256 digest of the plaintext.
    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>>;

    /// List all keys of a tenant (metadata only by construction).
    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<ApiKey>>;

    /// Persist a freshly generated key.
    async fn create(
        &self,
        data: &CreateApiKey,
        key_hash: &str,
        key_prefix: &str,
    ) -> AppResult<ApiKey>;

    /// Update mutable fields (name, scopes) of a tenant's key.
    async fn update(&self, id: Uuid, tenant_id: Uuid, data: &UpdateApiKey) -> AppResult<ApiKey>;

    /// Soft-revoke a tenant's key.
    async fn revoke(&self, id: Uuid, tenant_id: Uuid) -> AppResult<()>;

    /// Best-effort `last_used_at` update.
    async fn touch_last_used(&self, id: Uuid) -> AppResult<()>;
}

/// Persistence operations for usage events.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Find an event by idempotency key.
    async fn find_by_idempotency_key(&self, key: &str) -> AppResult<Option<UsageEvent>>;

    /// Insert an event; on idempotency-key conflict the original row is
    /// returned unchanged (race-safe replay).
    async fn insert(&self, data: &RecordUsage, period_bucket: &str) -> AppResult<UsageEvent>;

    /// Sum quantities recorded for an API key since the given instant.
    async fn sum_for_api_key(&self, api_key_id: Uuid, since: DateTime<Utc>) -> AppResult<i64>;

    /// Sum quantities recorded for a tenant since the given instant.
    async fn sum_for_tenant(&self, tenant_id: Uuid, since: DateTime<Utc>) -> AppResult<i64>;
}

/// Persistence operations for administrative overrides.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// List all overrides of a tenant, including expired ones.
    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<AdminOverride>>;

    /// Create an override.
    async fn create(&self, data: &CreateOverride) -> AppResult<AdminOverride>;

    /// Delete an override. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Read access to externally resolved feature flags.
#[async_trait]
pub trait FeatureFlagStore: Send + Sync {
    /// Find a flag by name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<FeatureFlag>>;
}
