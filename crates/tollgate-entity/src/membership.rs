//! Tenant membership entity and role hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Roles a user can hold within a tenant.
///
/// Roles are ordered by seniority: Owner > Admin > Member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    /// Regular member.
    Member,
    /// Can manage keys and members, but not ownership.
    Admin,
    /// Full control. Every tenant must retain at least one owner.
    Owner,
}

impl TenantRole {
    /// Return the seniority level (higher = more senior).
    pub fn seniority(&self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Admin => 1,
            Self::Owner => 2,
        }
    }

    /// Check if this role is equal to or senior to the given role.
    pub fn has_at_least(&self, other: &TenantRole) -> bool {
        self.seniority() >= other.seniority()
    }

    /// Check if this role can manage API keys (admin or owner).
    pub fn can_manage_keys(&self) -> bool {
        self.has_at_least(&Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for TenantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TenantRole {
    type Err = tollgate_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(tollgate_core::AppError::validation(format!(
                "Invalid tenant role: '{s}'. Expected one of: member, admin, owner"
            ))),
        }
    }
}

/// A user's membership in a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantUser {
    /// The tenant.
    pub tenant_id: Uuid,
    /// The member.
    pub user_id: Uuid,
    /// The member's role within the tenant.
    pub role: TenantRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the membership was last updated.
    pub updated_at: DateTime<Utc>,
}
