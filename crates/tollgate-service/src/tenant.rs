//! Tenant creation and membership management.
//!
//! Enforces the one invariant that can never be violated: a tenant must
//! retain at least one owner at all times.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tollgate_auth::credentials::PasswordHasher;
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::{MembershipStore, TenantStore, UserStore};
use tollgate_entity::membership::{TenantRole, TenantUser};
use tollgate_entity::tenant::{CreateTenant, Tenant};
use tollgate_entity::user::{CreateUser, User};

/// Manages tenants and their memberships.
#[derive(Clone)]
pub struct TenantService {
    tenants: Arc<dyn TenantStore>,
    memberships: Arc<dyn MembershipStore>,
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
}

impl std::fmt::Debug for TenantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantService").finish()
    }
}

impl TenantService {
    /// Create a new tenant service.
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        memberships: Arc<dyn MembershipStore>,
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            tenants,
            memberships,
            users,
            hasher,
        }
    }

    /// The signup flow: create a user and a tenant owned by them.
    ///
    /// The tenant row and the owner membership land in one atomic batch,
    /// so a tenant without an owner is never observable.
    pub async fn signup(
        &self,
        tenant: &CreateTenant,
        email: &str,
        password: &str,
    ) -> AppResult<(Tenant, User)> {
        if self.tenants.find_by_name(&tenant.name).await?.is_some() {
            return Err(AppError::conflict("A tenant with this name already exists"));
        }

        let password_hash = self.hash_password(password.to_string()).await?;

        let user = self
            .users
            .create(&CreateUser {
                email: email.to_string(),
                password_hash: Some(password_hash),
            })
            .await?;

        let tenant = self.tenants.create_with_owner(tenant, user.id).await?;

        info!(
            tenant_id = %tenant.id,
            user_id = %user.id,
            "Tenant created with owner"
        );

        Ok((tenant, user))
    }

    /// Fetch a tenant.
    pub async fn get(&self, id: Uuid) -> AppResult<Tenant> {
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tenant not found"))
    }

    /// Add a member to a tenant.
    pub async fn add_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
    ) -> AppResult<TenantUser> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let membership = self.memberships.add(tenant_id, user_id, role).await?;
        info!(tenant_id = %tenant_id, user_id = %user_id, role = %role, "Member added");
        Ok(membership)
    }

    /// Change a member's role.
    ///
    /// Demoting the sole owner is a conflict; with two or more owners the
    /// operation succeeds.
    pub async fn update_member_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        new_role: TenantRole,
    ) -> AppResult<()> {
        let membership = self
            .memberships
            .find(tenant_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))?;

        if membership.role == TenantRole::Owner && new_role != TenantRole::Owner {
            self.ensure_not_last_owner(tenant_id).await?;
        }

        self.memberships.set_role(tenant_id, user_id, new_role).await?;
        info!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            role = %new_role,
            "Member role updated"
        );
        Ok(())
    }

    /// Remove a member.
    ///
    /// Removing the sole owner is a conflict; with two or more owners the
    /// operation succeeds.
    pub async fn remove_member(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let membership = self
            .memberships
            .find(tenant_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))?;

        if membership.role == TenantRole::Owner {
            self.ensure_not_last_owner(tenant_id).await?;
        }

        self.memberships.remove(tenant_id, user_id).await?;
        info!(tenant_id = %tenant_id, user_id = %user_id, "Member removed");
        Ok(())
    }

    /// List a tenant's members.
    pub async fn list_members(&self, tenant_id: Uuid) -> AppResult<Vec<TenantUser>> {
        self.memberships.list_for_tenant(tenant_id).await
    }

    async fn ensure_not_last_owner(&self, tenant_id: Uuid) -> AppResult<()> {
        let owners = self.memberships.count_owners(tenant_id).await?;
        if owners <= 1 {
            return Err(AppError::conflict(
                "A tenant must retain at least one owner",
            ));
        }
        Ok(())
    }

    /// PBKDF2 on the blocking pool; hashing is CPU-bound.
    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
    }
}
