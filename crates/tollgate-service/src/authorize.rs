//! The central authorization decision.
//!
//! `authorize` is invoked once per protected request. It resolves tenant
//! membership, blends administrative overrides, evaluates feature gating
//! and key scopes, and runs the quota check, short-circuiting on the
//! first denial. It never records usage itself; check and consume are
//! decoupled so callers can dry-run.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::{ApiKeyStore, MembershipStore, TenantStore};
use tollgate_entity::membership::TenantRole;
use tollgate_entity::tenant::TenantTier;

use crate::features::FeatureGate;
use crate::overrides::OverrideService;
use crate::quota::{QuotaCheck, QuotaLevel, QuotaService};

/// TTL of the role-lookup read-through cache. Short enough that a role
/// change propagates within seconds; long enough to absorb bursts.
const ROLE_CACHE_TTL: Duration = Duration::from_secs(5);

/// Everything the caller knows about the request being authorized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzRequest {
    /// The acting user, absent for API-key callers.
    pub user_id: Option<Uuid>,
    /// The tenant the request acts within.
    pub tenant_id: Uuid,
    /// The session behind a user token, if any.
    pub session_id: Option<Uuid>,
    /// The API key behind a key token, if any.
    pub api_key_id: Option<Uuid>,
    /// The calling service.
    pub service: String,
    /// The action being performed.
    pub action: String,
    /// The resource acted on, if relevant.
    pub resource: Option<String>,
    /// Feature the action depends on, if any.
    pub required_feature: Option<String>,
    /// Minimum tenant role the action demands, if any.
    pub required_role: Option<TenantRole>,
    /// Units of quota the action will consume. Defaults to 1.
    pub quantity: Option<i64>,
}

/// Which check produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionLevel {
    /// Tenant membership resolution.
    Membership,
    /// Role seniority check.
    Role,
    /// Feature gating.
    Feature,
    /// API key scope check.
    Scope,
    /// Key-level quota.
    ApiKey,
    /// Tenant-level quota.
    Tenant,
    /// No quota limit configured.
    Unlimited,
}

impl From<QuotaLevel> for DecisionLevel {
    fn from(level: QuotaLevel) -> Self {
        match level {
            QuotaLevel::ApiKey => Self::ApiKey,
            QuotaLevel::Tenant => Self::Tenant,
            QuotaLevel::Unlimited => Self::Unlimited,
        }
    }
}

/// The allow/deny decision with enough metadata for an actionable error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Human-readable reason, stable enough to branch on.
    pub reason: String,
    /// Which check decided.
    pub level: DecisionLevel,
    /// Quota numbers, when the quota check ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaCheck>,
    /// The tenant's effective tier after override blending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<TenantTier>,
}

impl Decision {
    fn deny(level: DecisionLevel, reason: &str) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
            level,
            quota: None,
            tier: None,
        }
    }
}

/// The composition root of the decision engine.
#[derive(Clone)]
pub struct AuthorizationService {
    tenants: Arc<dyn TenantStore>,
    memberships: Arc<dyn MembershipStore>,
    keys: Arc<dyn ApiKeyStore>,
    overrides: OverrideService,
    features: FeatureGate,
    quota: QuotaService,
    /// Read-through cache of role lookups, keyed by (tenant, user).
    role_cache: Cache<(Uuid, Uuid), Option<TenantRole>>,
}

impl std::fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationService").finish()
    }
}

impl AuthorizationService {
    /// Create a new authorization service.
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        memberships: Arc<dyn MembershipStore>,
        keys: Arc<dyn ApiKeyStore>,
        overrides: OverrideService,
        features: FeatureGate,
        quota: QuotaService,
    ) -> Self {
        Self {
            tenants,
            memberships,
            keys,
            overrides,
            features,
            quota,
            role_cache: Cache::builder()
                .time_to_live(ROLE_CACHE_TTL)
                .max_capacity(10_000)
                .build(),
        }
    }

    /// The single decision entry point. Short-circuits on first denial.
    pub async fn authorize(&self, req: &AuthzRequest) -> AppResult<Decision> {
        let tenant = match self.tenants.find_by_id(req.tenant_id).await? {
            Some(tenant) => tenant,
            None => return Ok(Decision::deny(DecisionLevel::Membership, "tenant not found")),
        };

        // Step 1: membership, for user-backed identities.
        let member_role = match req.user_id {
            Some(user_id) => {
                let role = self.cached_role(req.tenant_id, user_id).await?;
                if role.is_none() {
                    debug!(
                        tenant_id = %req.tenant_id,
                        user_id = %user_id,
                        "Denied: not a member"
                    );
                    return Ok(Decision::deny(
                        DecisionLevel::Membership,
                        "not a member of this tenant",
                    ));
                }
                role
            }
            None => None,
        };

        let parsed = self.overrides.parsed(req.tenant_id).await?;
        let effective_tier = parsed.effective_tier(tenant.tier);

        // Step 2: role seniority. The override taxonomy carries no
        // role-granting type, so the blended role equals the stored one;
        // overrides could only ever raise it, never lower it.
        if let Some(required) = req.required_role {
            match member_role {
                Some(role) if role.has_at_least(&required) => {}
                _ => {
                    return Ok(Decision::deny(DecisionLevel::Role, "insufficient role"));
                }
            }
        }

        // Step 3: feature gating, with grant overrides winning.
        if let Some(feature) = &req.required_feature {
            let enabled = self
                .features
                .is_enabled(feature, req.tenant_id, effective_tier, &parsed)
                .await?;
            if !enabled {
                return Ok(Decision::deny(DecisionLevel::Feature, "feature not enabled"));
            }
        }

        // Step 4: key scope, for key-backed identities.
        if let Some(key_id) = req.api_key_id {
            let key = self
                .keys
                .find_by_id(key_id)
                .await?
                .filter(|k| k.tenant_id == req.tenant_id)
                .ok_or_else(|| AppError::not_found("API key not found"))?;
            if !key.allows_scope(&req.action) {
                return Ok(Decision::deny(DecisionLevel::Scope, "insufficient scope"));
            }
        }

        // Step 5: quota, with boost applied before the buffer.
        let quantity = req.quantity.unwrap_or(1);
        let check = self
            .quota
            .check_quota(req.tenant_id, quantity, req.api_key_id, parsed.quota_boost)
            .await?;

        if !check.allowed {
            let level = DecisionLevel::from(check.level);
            return Ok(Decision {
                allowed: false,
                reason: "quota exceeded".to_string(),
                level,
                quota: Some(check),
                tier: Some(effective_tier),
            });
        }

        Ok(Decision {
            allowed: true,
            reason: "allowed".to_string(),
            level: DecisionLevel::from(check.level),
            quota: Some(check),
            tier: Some(effective_tier),
        })
    }

    /// Role lookup through the short-TTL read-through cache.
    async fn cached_role(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<Option<TenantRole>> {
        let cache_key = (tenant_id, user_id);

        if let Some(cached) = self.role_cache.get(&cache_key).await {
            return Ok(cached);
        }

        let role = self
            .memberships
            .find(tenant_id, user_id)
            .await?
            .map(|m| m.role);

        self.role_cache.insert(cache_key, role).await;
        Ok(role)
    }

    /// Drop a cached role after a membership mutation, so the change is
    /// visible to decisions immediately rather than after TTL.
    pub async fn invalidate_role(&self, tenant_id: Uuid, user_id: Uuid) {
        self.role_cache.invalidate(&(tenant_id, user_id)).await;
    }
}
