#![allow(dead_code)]

//! In-memory user and session stores for the session service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::{SessionStore, UserStore};
use tollgate_entity::session::{Session, UpsertSession};
use tollgate_entity::user::{CreateUser, User, normalize_email};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
}

/// In-memory implementation of the stores the session service touches.
#[derive(Default)]
pub struct MemAuthStore {
    inner: Mutex<Inner>,
}

impl MemAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

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

    pub fn user(&self, id: Uuid) -> User {
        self.inner.lock().unwrap().users.get(&id).cloned().unwrap()
    }

    pub fn session(&self, id: Uuid) -> Session {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .get(&id)
            .cloned()
            .unwrap()
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    /// Force a session's expiry into the past.
    pub fn expire_session(&self, id: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(s) = inner.sessions.get_mut(&id) {
            s.expires_at = Utc::now() - chrono::Duration::minutes(1);
        }
    }
}

#[async_trait]
impl UserStore for MemAuthStore {
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
        Ok(self.seed_user(&data.email, data.password_hash.clone()))
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
impl SessionStore for MemAuthStore {
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

/// Auth configuration for HS256 tests.
pub fn hs_config() -> tollgate_core::config::auth::AuthConfig {
    tollgate_core::config::auth::AuthConfig {
        jwt_secret: "test-secret".to_string(),
        rsa_private_key_pem: None,
        rsa_public_key_pem: None,
        jwt_kid: "test-1".to_string(),
        jwt_access_ttl_minutes: 15,
        session_ttl_hours: 24,
        api_key_token_ttl_minutes: 60,
        pbkdf2_iterations: 1_000,
        max_failed_attempts: 3,
        lockout_duration_minutes: 30,
        internal_api_secret: "internal-secret".to_string(),
    }
}

// ---------------------------------------------------------------------------

use tollgate_database::stores::ApiKeyStore;
use tollgate_entity::api_key::{ApiKey, ApiKeyStatus, CreateApiKey, UpdateApiKey};

/// In-memory API key store for the key service tests.
#[derive(Default)]
pub struct MemKeyStore {
    keys: Mutex<HashMap<Uuid, ApiKey>>,
}

impl MemKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self, id: Uuid) -> ApiKey {
        self.keys.lock().unwrap().get(&id).cloned().unwrap()
    }

    /// Force a key's expiry into the past.
    pub fn expire_key(&self, id: Uuid) {
        let mut keys = self.keys.lock().unwrap();
        if let Some(k) = keys.get_mut(&id) {
            k.expires_at = Some(Utc::now() - chrono::Duration::minutes(1));
        }
    }
}

#[async_trait]
impl ApiKeyStore for MemKeyStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ApiKey>> {
        Ok(self.keys.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .values()
            .find(|k| k.key_hash == key_hash)
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .unwrap()
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
        self.keys.lock().unwrap().insert(key.id, key.clone());
        Ok(key)
    }

    async fn update(&self, id: Uuid, tenant_id: Uuid, data: &UpdateApiKey) -> AppResult<ApiKey> {
        let mut keys = self.keys.lock().unwrap();
        match keys.get_mut(&id) {
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
        let mut keys = self.keys.lock().unwrap();
        match keys.get_mut(&id) {
            Some(k) if k.tenant_id == tenant_id && k.status == ApiKeyStatus::Active => {
                k.status = ApiKeyStatus::Revoked;
                k.revoked_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(AppError::not_found("Active API key not found")),
        }
    }

    async fn touch_last_used(&self, id: Uuid) -> AppResult<()> {
        let mut keys = self.keys.lock().unwrap();
        if let Some(k) = keys.get_mut(&id) {
            k.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}
