//! Tenant entity model and plan tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Plan tiers, ordered by rank: Free < Pro < Enterprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantTier {
    /// Free plan.
    Free,
    /// Paid plan.
    Pro,
    /// Enterprise plan.
    Enterprise,
}

impl TenantTier {
    /// Return the tier rank (higher = more entitled).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Pro => 1,
            Self::Enterprise => 2,
        }
    }

    /// Return the more entitled of the two tiers.
    pub fn max(self, other: TenantTier) -> TenantTier {
        if other.rank() > self.rank() { other } else { self }
    }

    /// Return the tier as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for TenantTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TenantTier {
    type Err = tollgate_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(tollgate_core::AppError::validation(format!(
                "Invalid tier: '{s}'. Expected one of: free, pro, enterprise"
            ))),
        }
    }
}

/// A tenant: the top-level billing and isolation boundary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: Uuid,
    /// Unique tenant name.
    pub name: String,
    /// Plan tier.
    pub tier: TenantTier,
    /// Monthly usage ceiling across all keys. `None` means unlimited.
    pub global_quota_limit: Option<i64>,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Desired tenant name (must be unique).
    pub name: String,
    /// Initial plan tier.
    pub tier: TenantTier,
    /// Monthly usage ceiling, if any.
    pub global_quota_limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(TenantTier::Enterprise.rank() > TenantTier::Pro.rank());
        assert!(TenantTier::Pro.rank() > TenantTier::Free.rank());
        assert_eq!(TenantTier::Free.max(TenantTier::Pro), TenantTier::Pro);
        assert_eq!(
            TenantTier::Enterprise.max(TenantTier::Free),
            TenantTier::Enterprise
        );
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("pro".parse::<TenantTier>().unwrap(), TenantTier::Pro);
        assert_eq!(
            "ENTERPRISE".parse::<TenantTier>().unwrap(),
            TenantTier::Enterprise
        );
        assert!("platinum".parse::<TenantTier>().is_err());
    }
}
