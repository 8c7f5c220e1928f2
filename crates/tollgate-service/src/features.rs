//! Feature flag evaluation against a tenant's effective tier.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use tollgate_core::result::AppResult;
use tollgate_database::stores::FeatureFlagStore;
use tollgate_entity::feature_flag::FeatureFlag;
use tollgate_entity::tenant::TenantTier;

use crate::overrides::ParsedOverrides;

/// Evaluates externally resolved feature flags.
///
/// Flag storage and editing live elsewhere; this gate only answers
/// "is this feature on for this tenant right now".
#[derive(Clone)]
pub struct FeatureGate {
    flags: Arc<dyn FeatureFlagStore>,
}

impl std::fmt::Debug for FeatureGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureGate").finish()
    }
}

impl FeatureGate {
    /// Create a new feature gate.
    pub fn new(flags: Arc<dyn FeatureFlagStore>) -> Self {
        Self { flags }
    }

    /// Whether the feature is enabled for the tenant.
    ///
    /// A `feature_grant` override wins unconditionally. Otherwise the
    /// flag must be active and match the tenant by tier, by explicit
    /// listing, or by rollout bucket.
    pub async fn is_enabled(
        &self,
        feature: &str,
        tenant_id: Uuid,
        effective_tier: TenantTier,
        overrides: &ParsedOverrides,
    ) -> AppResult<bool> {
        if overrides.grants_feature(feature) {
            return Ok(true);
        }

        let Some(flag) = self.flags.find_by_name(feature).await? else {
            return Ok(false);
        };

        Ok(flag_matches(&flag, tenant_id, effective_tier))
    }
}

/// Pure flag evaluation, separated for testability.
fn flag_matches(flag: &FeatureFlag, tenant_id: Uuid, tier: TenantTier) -> bool {
    if !flag.active {
        return false;
    }

    if flag.enabled_tiers.iter().any(|t| t == tier.as_str()) {
        return true;
    }

    if flag.enabled_tenants.contains(&tenant_id) {
        return true;
    }

    flag.rollout_percentage > 0 && rollout_bucket(tenant_id) < flag.rollout_percentage as u64
}

/// Deterministic rollout bucket in `0..100`.
///
/// SHA-256 of the tenant UUID's hyphenated string, first 8 digest bytes
/// as a big-endian u64, modulo 100. Stable across processes and
/// restarts so a tenant never flaps in and out of a rollout.
fn rollout_bucket(tenant_id: Uuid) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(tenant_id.to_string().as_bytes());
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) % 100
}
