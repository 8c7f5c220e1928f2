//! Administrative override entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kinds of administrative exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "override_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OverrideType {
    /// Additive headroom on top of the plan quota limit.
    QuotaBoost,
    /// Treat the tenant as a higher tier for feature gating.
    TierUpgrade,
    /// Grant a single feature regardless of flag state.
    FeatureGrant,
}

/// A tenant-scoped, optionally time-boxed administrative exception.
///
/// `value` is interpreted per type: a decimal number for quota boosts,
/// a tier name for tier upgrades, a feature name for feature grants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminOverride {
    /// Unique override identifier.
    pub id: Uuid,
    /// The tenant the exception applies to.
    pub tenant_id: Uuid,
    /// Kind of exception.
    pub override_type: OverrideType,
    /// Type-dependent payload.
    pub value: String,
    /// Effective until this time; `None` means no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin that created the override, when known.
    pub created_by: Option<Uuid>,
    /// When the override was created.
    pub created_at: DateTime<Utc>,
}

impl AdminOverride {
    /// Check whether the override is currently effective.
    pub fn is_effective(&self) -> bool {
        match self.expires_at {
            Some(exp) => exp > Utc::now(),
            None => true,
        }
    }
}

/// Data required to create a new override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOverride {
    /// The tenant the exception applies to.
    pub tenant_id: Uuid,
    /// Kind of exception.
    pub override_type: OverrideType,
    /// Type-dependent payload.
    pub value: String,
    /// Effective until this time; `None` means no expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin creating the override.
    pub created_by: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effectiveness() {
        let mut ov = AdminOverride {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            override_type: OverrideType::QuotaBoost,
            value: "1000".into(),
            expires_at: None,
            created_by: None,
            created_at: Utc::now(),
        };
        assert!(ov.is_effective());

        ov.expires_at = Some(Utc::now() + chrono::Duration::days(1));
        assert!(ov.is_effective());

        ov.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(!ov.is_effective());
    }
}
