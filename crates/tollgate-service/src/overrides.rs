//! Administrative override storage and blending.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use tollgate_core::result::AppResult;
use tollgate_database::stores::OverrideStore;
use tollgate_entity::overrides::{AdminOverride, CreateOverride, OverrideType};
use tollgate_entity::tenant::TenantTier;

/// All currently-effective overrides of a tenant, blended into one
/// structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedOverrides {
    /// Sum of all numeric quota-boost values.
    pub quota_boost: i64,
    /// Highest granted tier, if any upgrade is in effect.
    pub tier_upgrade: Option<TenantTier>,
    /// Union of distinct granted feature names.
    pub feature_grants: BTreeSet<String>,
}

impl ParsedOverrides {
    /// Whether the given feature is granted by an override.
    pub fn grants_feature(&self, feature: &str) -> bool {
        self.feature_grants.contains(feature)
    }

    /// The tenant's effective tier given its stored tier.
    ///
    /// Upgrades only ever raise the tier; an override can never
    /// downgrade.
    pub fn effective_tier(&self, stored: TenantTier) -> TenantTier {
        match self.tier_upgrade {
            Some(upgraded) => stored.max(upgraded),
            None => stored,
        }
    }
}

/// Stores and blends administrative exceptions per tenant.
#[derive(Clone)]
pub struct OverrideService {
    overrides: Arc<dyn OverrideStore>,
}

impl std::fmt::Debug for OverrideService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideService").finish()
    }
}

impl OverrideService {
    /// Create a new override service.
    pub fn new(overrides: Arc<dyn OverrideStore>) -> Self {
        Self { overrides }
    }

    /// Blend every currently-effective override of a tenant.
    ///
    /// An override whose value fails to parse for its type is skipped
    /// for that field rather than failing the whole blend.
    pub async fn parsed(&self, tenant_id: Uuid) -> AppResult<ParsedOverrides> {
        let rows = self.overrides.list_for_tenant(tenant_id).await?;
        Ok(blend(&rows))
    }

    /// List all of a tenant's overrides, including expired ones.
    pub async fn list(&self, tenant_id: Uuid) -> AppResult<Vec<AdminOverride>> {
        self.overrides.list_for_tenant(tenant_id).await
    }

    /// Create an override.
    pub async fn create(&self, data: &CreateOverride) -> AppResult<AdminOverride> {
        let created = self.overrides.create(data).await?;
        info!(
            override_id = %created.id,
            tenant_id = %created.tenant_id,
            override_type = ?created.override_type,
            "Override created"
        );
        Ok(created)
    }

    /// Delete an override. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.overrides.delete(id).await
    }
}

/// Blend effective rows: boosts sum, tiers keep the highest, feature
/// grants union.
fn blend(rows: &[AdminOverride]) -> ParsedOverrides {
    let mut parsed = ParsedOverrides::default();

    for row in rows.iter().filter(|r| r.is_effective()) {
        match row.override_type {
            OverrideType::QuotaBoost => match row.value.trim().parse::<i64>() {
                Ok(boost) => parsed.quota_boost = parsed.quota_boost.saturating_add(boost),
                Err(_) => {
                    debug!(override_id = %row.id, value = %row.value, "Skipping non-numeric quota boost");
                }
            },
            OverrideType::TierUpgrade => match row.value.trim().parse::<TenantTier>() {
                Ok(tier) => {
                    parsed.tier_upgrade = Some(match parsed.tier_upgrade {
                        Some(current) => current.max(tier),
                        None => tier,
                    });
                }
                Err(_) => {
                    debug!(override_id = %row.id, value = %row.value, "Skipping unknown tier upgrade");
                }
            },
            OverrideType::FeatureGrant => {
                parsed.feature_grants.insert(row.value.trim().to_string());
            }
        }
    }

    parsed
}
