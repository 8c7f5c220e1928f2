//! Feature flag model, consumed but not owned by this engine.
//!
//! Flags are resolved and edited elsewhere; Tollgate only evaluates an
//! already-resolved row against a tenant's tier and overrides.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A resolved feature flag row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeatureFlag {
    /// Flag name, unique.
    pub name: String,
    /// Tiers for which the flag is enabled.
    pub enabled_tiers: Vec<String>,
    /// Tenants for which the flag is explicitly enabled.
    pub enabled_tenants: Vec<Uuid>,
    /// Percentage rollout (0–100) for tenants not explicitly listed.
    pub rollout_percentage: i32,
    /// Whether the flag is active at all.
    pub active: bool,
}
