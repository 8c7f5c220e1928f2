//! API key generation, validation, and lifecycle management.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::ApiKeyStore;
use tollgate_entity::api_key::{ApiKey, CreateApiKey, UpdateApiKey};

use crate::credentials::{generate_key_suffix, sha256_hex};

/// Fixed literal prefix distinguishing Tollgate keys from any other
/// credential type at a glance.
pub const KEY_PREFIX: &str = "tg_";

/// Number of suffix characters retained unhashed for display.
const DISPLAY_CHARS: usize = 8;

/// Result of key creation. The plaintext is returned exactly once and is
/// never retrievable again.
#[derive(Debug, Clone)]
pub struct CreatedKey {
    /// Public key metadata as persisted.
    pub key: ApiKey,
    /// The full plaintext key. Show it to the caller, then forget it.
    pub plaintext: String,
}

/// Generates, validates, revokes, and updates API keys.
#[derive(Clone)]
pub struct ApiKeyService {
    keys: Arc<dyn ApiKeyStore>,
}

impl std::fmt::Debug for ApiKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyService").finish()
    }
}

impl ApiKeyService {
    /// Create a new API key service.
    pub fn new(keys: Arc<dyn ApiKeyStore>) -> Self {
        Self { keys }
    }

    /// Generate and persist a new key for a tenant.
    ///
    /// Only the SHA-256 digest and the display prefix are stored.
    pub async fn create(&self, data: &CreateApiKey) -> AppResult<CreatedKey> {
        if data.quota_limit.is_some() != data.quota_period.is_some() {
            return Err(AppError::validation(
                "quota_limit and quota_period must be set together",
            ));
        }
        if let Some(limit) = data.quota_limit {
            if limit <= 0 {
                return Err(AppError::validation("quota_limit must be positive"));
            }
        }

        let suffix = generate_key_suffix();
        let plaintext = format!("{KEY_PREFIX}{suffix}");
        let key_hash = sha256_hex(&plaintext);
        let key_prefix = format!("{KEY_PREFIX}{}", &suffix[..DISPLAY_CHARS]);

        let key = self.keys.create(data, &key_hash, &key_prefix).await?;

        info!(
            key_id = %key.id,
            tenant_id = %key.tenant_id,
            key_prefix = %key.key_prefix,
            "API key created"
        );

        Ok(CreatedKey { key, plaintext })
    }

    /// Validate a bearer-presented plaintext key.
    ///
    /// The format prefix is checked before any hashing so obviously
    /// foreign credentials are rejected cheaply. A revoked or expired key
    /// fails with the same generic error as an unknown one.
    pub async fn validate(&self, plaintext: &str) -> AppResult<ApiKey> {
        if !plaintext.starts_with(KEY_PREFIX) {
            return Err(AppError::authentication("Invalid API key"));
        }

        let key_hash = sha256_hex(plaintext);
        let key = self
            .keys
            .find_by_hash(&key_hash)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid API key"))?;

        if !key.is_usable() {
            return Err(AppError::authentication("Invalid API key"));
        }

        // Best-effort: the validation result does not depend on this write.
        if let Err(e) = self.keys.touch_last_used(key.id).await {
            warn!(key_id = %key.id, error = %e, "Failed to update last_used_at");
        }

        Ok(key)
    }

    /// Fetch one of a tenant's keys. Cross-tenant IDs surface as not-found.
    pub async fn get(&self, id: Uuid, tenant_id: Uuid) -> AppResult<ApiKey> {
        self.keys
            .find_by_id(id)
            .await?
            .filter(|k| k.tenant_id == tenant_id)
            .ok_or_else(|| AppError::not_found("API key not found"))
    }

    /// List a tenant's keys.
    pub async fn list(&self, tenant_id: Uuid) -> AppResult<Vec<ApiKey>> {
        self.keys.list_for_tenant(tenant_id).await
    }

    /// Update name and scopes. Hash, prefix, and tenant binding are
    /// immutable post-creation by construction of the store call.
    pub async fn update(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        data: &UpdateApiKey,
    ) -> AppResult<ApiKey> {
        self.keys.update(id, tenant_id, data).await
    }

    /// Soft-revoke a key.
    pub async fn revoke(&self, id: Uuid, tenant_id: Uuid) -> AppResult<()> {
        self.keys.revoke(id, tenant_id).await?;
        info!(key_id = %id, tenant_id = %tenant_id, "API key revoked");
        Ok(())
    }
}
