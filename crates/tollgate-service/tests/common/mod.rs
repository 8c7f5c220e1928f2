#![allow(dead_code)]

//! In-memory store implementations shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::{
    ApiKeyStore, FeatureFlagStore, MembershipStore, OverrideStore, SessionStore, TenantStore,
    UsageStore, UserStore,
};
use tollgate_entity::api_key::{ApiKey, ApiKeyStatus, CreateApiKey, QuotaPeriod, UpdateApiKey};
use tollgate_entity::feature_flag::FeatureFlag;
use tollgate_entity::membership::{TenantRole, TenantUser};
use tollgate_entity::overrides::{AdminOverride, CreateOverride};
use tollgate_entity::session::{Session, UpsertSession};
use tollgate_entity::tenant::{CreateTenant, Tenant, TenantTier};
use tollgate_entity::usage::{RecordUsage, UsageEvent};
use tollgate_entity::user::{CreateUser, User, normalize_email};

#[derive(Default)]
struct Inner {
    tenants: HashMap<Uuid, Tenant>,
    memberships: HashMap<(Uuid, Uuid), TenantUser>,
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
    api_keys: HashMap<Uuid, ApiKey>,
    usage: Vec<UsageEvent>,
    overrides: Vec<AdminOverride>,
    flags: HashMap<String, FeatureFlag>,
}

/// A single in-memory store implementing every store trait.
#[derive(Default)]
pub struct InMemory {
    inner: Mutex<Inner>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tenant directly.
    pub fn seed_tenant(&self, tier: TenantTier, global_quota_limit: Option<i64>) -> Tenant {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: format!("tenant-{}", Uuid::new_v4()),
            tier,
            global_quota_limit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .tenants
            .insert(tenant.id, tenant.clone());
        tenant
    }

    /// Seed a user directly.
    pub fn seed_user(&self, email: &str, password_hash: Option<String>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };
        self.inner.lock().unwrap().users.insert(user.id, user.clone());
        user
    }

    /// Seed a membership directly.
    pub fn seed_membership(&self, tenant_id: Uuid, user_id: Uuid, role: TenantRole) -> TenantUser {
        let membership = TenantUser {
            tenant_id,
            user_id,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .memberships
            .insert((tenant_id, user_id), membership.clone());
        membership
    }

    /// Seed an API key with an optional quota.
    pub fn seed_api_key(
        &self,
        tenant_id: Uuid,
        scopes: &[&str],
        quota_limit: Option<i64>,
        quota_period: Option<QuotaPeriod>,
    ) -> ApiKey {
        let key = ApiKey {
            id: Uuid::new_v4(),
            tenant_id,
            name: "seeded".into(),
            key_hash: format!("hash-{}", Uuid::new_v4()),
            key_prefix: "tg_seeded00".into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            quota_limit,
            quota_period,
            status: ApiKeyStatus::Active,
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .api_keys
            .insert(key.id, key.clone());
        key
    }

    /// Seed an override row.
    pub fn seed_override(
        &self,
        tenant_id: Uuid,
        override_type: tollgate_entity::overrides::OverrideType,
        value: &str,
        expires_at: Option<DateTime<Utc>>,
    ) {
        let row = AdminOverride {
            id: Uuid::new_v4(),
            tenant_id,
            override_type,
            value: value.to_string(),
            expires_at,
            created_by: None,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().overrides.push(row);
    }

    /// Seed a feature flag.
    pub fn seed_flag(&self, flag: FeatureFlag) {
        self.inner
            .lock()
            .unwrap()
            .flags
            .insert(flag.name.clone(), flag);
    }

    /// Total recorded usage quantity, for monotonicity assertions.
    pub fn total_recorded(&self, tenant_id: Uuid) -> i64 {
        self.inner
            .lock()
            .unwrap()
            .usage
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .map(|e| e.quantity)
            .sum()
    }
}

#[async_trait]
impl TenantStore for InMemory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        Ok(self.inner.lock().unwrap().tenants.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Tenant>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tenants
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn create_with_owner(
        &self,
        data: &CreateTenant,
        owner_user_id: Uuid,
    ) -> AppResult<Tenant> {
        let mut inner = self.inner.lock().unwrap();
        if inner.tenants.values().any(|t| t.name == data.name) {
            return Err(AppError::conflict("A tenant with this name already exists"));
        }
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            tier: data.tier,
            global_quota_limit: data.global_quota_limit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.tenants.insert(tenant.id, tenant.clone());
        inner.memberships.insert(
            (tenant.id, owner_user_id),
            TenantUser {
                tenant_id: tenant.id,
                user_id: owner_user_id,
                role: TenantRole::Owner,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
        Ok(tenant)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.lock().unwrap().tenants.remove(&id).is_some())
    }
}

#[async_trait]
impl MembershipStore for InMemory {
    async fn find(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<Option<TenantUser>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .memberships
            .get(&(tenant_id, user_id))
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<TenantUser>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .memberships
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn add(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
    ) -> AppResult<TenantUser> {
        let mut inner = self.inner.lock().unwrap();
        if inner.memberships.contains_key(&(tenant_id, user_id)) {
            return Err(AppError::conflict("User is already a member of this tenant"));
        }
        let membership = TenantUser {
            tenant_id,
            user_id,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner
            .memberships
            .insert((tenant_id, user_id), membership.clone());
        Ok(membership)
    }

    async fn set_role(&self, tenant_id: Uuid, user_id: Uuid, role: TenantRole) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.memberships.get_mut(&(tenant_id, user_id)) {
            Some(m) => {
                m.role = role;
                m.updated_at = Utc::now();
                Ok(())
            }
            None => Err(AppError::not_found("Membership not found")),
        }
    }

    async fn remove(&self, tenant_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .memberships
            .remove(&(tenant_id, user_id))
            .is_some())
    }

    async fn count_owners(&self, tenant_id: Uuid) -> AppResult<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .memberships
            .values()
            .filter(|m| m.tenant_id == tenant_id && m.role == TenantRole::Owner)
            .count() as i64)
    }
}

#[async_trait]
impl UserStore for InMemory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let email = normalize_email(&data.email);
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.email == email) {
            return Err(AppError::conflict("A user with this email already exists"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: data.password_hash.clone(),
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.failed_login_attempts = attempts;
            user.locked_until = locked_until;
        }
        Ok(())
    }

    async fn reset_login_failures(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.failed_login_attempts = 0;
            user.locked_until = None;
        }
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.inner.lock().unwrap().sessions.get(&id).cloned())
    }

    async fn find_by_refresh_hash(&self, hash: &str) -> AppResult<Option<Session>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sessions
            .values()
            .find(|s| s.refresh_token_hash == hash && s.revoked_at.is_none())
            .cloned())
    }

    async fn upsert(&self, data: &UpsertSession) -> AppResult<Session> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner
            .sessions
            .values()
            .find(|s| {
                s.user_id == data.user_id
                    && s.tenant_id == data.tenant_id
                    && s.service == data.service
            })
            .map(|s| s.id);

        match existing {
            Some(id) => {
                let session = inner.sessions.get_mut(&id).unwrap();
                session.refresh_token_hash = data.refresh_token_hash.clone();
                session.expires_at = data.expires_at;
                session.revoked_at = None;
                session.updated_at = Utc::now();
                Ok(session.clone())
            }
            None => {
                let session = Session {
                    id: Uuid::new_v4(),
                    user_id: data.user_id,
                    tenant_id: data.tenant_id,
                    service: data.service.clone(),
                    refresh_token_hash: data.refresh_token_hash.clone(),
                    expires_at: data.expires_at,
                    revoked_at: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };
                inner.sessions.insert(session.id, session.clone());
                Ok(session)
            }
        }
    }

    async fn rotate_refresh_hash(&self, id: Uuid, new_hash: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.sessions.get_mut(&id) {
            Some(s) if s.revoked_at.is_none() => {
                s.refresh_token_hash = new_hash.to_string();
                s.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(AppError::authentication("Session is no longer live")),
        }
    }

    async fn revoke(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(s) = inner.sessions.get_mut(&id) {
            if s.revoked_at.is_none() {
                s.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut revoked = 0;
        for s in inner.sessions.values_mut() {
            if s.user_id == user_id && s.revoked_at.is_none() {
                s.revoked_at = Some(Utc::now());
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

#[async_trait]
impl ApiKeyStore for InMemory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ApiKey>> {
        Ok(self.inner.lock().unwrap().api_keys.get(&id).cloned())
    }

    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .api_keys
            .values()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<ApiKey>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .api_keys
            .values()
            .filter(|k| k.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        data: &CreateApiKey,
        key_hash: &str,
        key_prefix: &str,
    ) -> AppResult<ApiKey> {
        let key = ApiKey {
            id: Uuid::new_v4(),
            tenant_id: data.tenant_id,
            name: data.name.clone(),
            key_hash: key_hash.to_string(),
            key_prefix: key_prefix.to_string(),
            scopes: data.scopes.clone(),
            quota_limit: data.quota_limit,
            quota_period: data.quota_period,
            status: ApiKeyStatus::Active,
            expires_at: data.expires_at,
            revoked_at: None,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .api_keys
            .insert(key.id, key.clone());
        Ok(key)
    }

    async fn update(&self, id: Uuid, tenant_id: Uuid, data: &UpdateApiKey) -> AppResult<ApiKey> {
        let mut inner = self.inner.lock().unwrap();
        match inner.api_keys.get_mut(&id) {
            Some(k) if k.tenant_id == tenant_id => {
                if let Some(name) = &data.name {
                    k.name = name.clone();
                }
                if let Some(scopes) = &data.scopes {
                    k.scopes = scopes.clone();
                }
                k.updated_at = Utc::now();
                Ok(k.clone())
            }
            _ => Err(AppError::not_found("API key not found")),
        }
    }

    async fn revoke(&self, id: Uuid, tenant_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.api_keys.get_mut(&id) {
            Some(k) if k.tenant_id == tenant_id && k.status == ApiKeyStatus::Active => {
                k.status = ApiKeyStatus::Revoked;
                k.revoked_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(AppError::not_found("Active API key not found")),
        }
    }

    async fn touch_last_used(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(k) = inner.api_keys.get_mut(&id) {
            k.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl UsageStore for InMemory {
    async fn find_by_idempotency_key(&self, key: &str) -> AppResult<Option<UsageEvent>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .usage
            .iter()
            .find(|e| e.idempotency_key == key)
            .cloned())
    }

    async fn insert(&self, data: &RecordUsage, period_bucket: &str) -> AppResult<UsageEvent> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .usage
            .iter()
            .find(|e| e.idempotency_key == data.idempotency_key)
        {
            return Ok(existing.clone());
        }
        let event = UsageEvent {
            id: Uuid::new_v4(),
            tenant_id: data.tenant_id,
            api_key_id: data.api_key_id,
            user_id: data.user_id,
            service: data.service.clone(),
            action: data.action.clone(),
            quantity: data.quantity,
            period_bucket: period_bucket.to_string(),
            idempotency_key: data.idempotency_key.clone(),
            created_at: Utc::now(),
        };
        inner.usage.push(event.clone());
        Ok(event)
    }

    async fn sum_for_api_key(&self, api_key_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .usage
            .iter()
            .filter(|e| e.api_key_id == Some(api_key_id) && e.created_at >= since)
            .map(|e| e.quantity)
            .sum())
    }

    async fn sum_for_tenant(&self, tenant_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .usage
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.created_at >= since)
            .map(|e| e.quantity)
            .sum())
    }
}

#[async_trait]
impl OverrideStore for InMemory {
    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<AdminOverride>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .overrides
            .iter()
            .filter(|o| o.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn create(&self, data: &CreateOverride) -> AppResult<AdminOverride> {
        let row = AdminOverride {
            id: Uuid::new_v4(),
            tenant_id: data.tenant_id,
            override_type: data.override_type,
            value: data.value.clone(),
            expires_at: data.expires_at,
            created_by: data.created_by,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().overrides.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.overrides.len();
        inner.overrides.retain(|o| o.id != id);
        Ok(inner.overrides.len() < before)
    }
}

#[async_trait]
impl FeatureFlagStore for InMemory {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<FeatureFlag>> {
        Ok(self.inner.lock().unwrap().flags.get(name).cloned())
    }
}
