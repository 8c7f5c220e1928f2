//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use tollgate_auth::apikey::ApiKeyService;
use tollgate_auth::credentials::PasswordHasher;
use tollgate_auth::jwt::{JwksDocument, TokenSigner, TokenVerifier};
use tollgate_auth::session::SessionService;
use tollgate_core::config::AppConfig;
use tollgate_core::error::AppError;
use tollgate_database::Store;
use tollgate_database::stores::MembershipStore;
use tollgate_database::repositories::{
    ApiKeyRepository, FeatureFlagRepository, MembershipRepository, OverrideRepository,
    SessionRepository, TenantRepository, UsageRepository, UserRepository,
};
use tollgate_service::authorize::AuthorizationService;
use tollgate_service::features::FeatureGate;
use tollgate_service::overrides::OverrideService;
use tollgate_service::quota::QuotaService;
use tollgate_service::tenant::TenantService;

/// Audience of the management API's own session tokens. Logging in with
/// this service name yields a token that can manage keys and members.
pub const MANAGEMENT_AUDIENCE: &str = "tollgate";

/// Application state containing all shared dependencies.
///
/// Passed to every axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Consistent store accessor over the primary pool.
    pub store: Store,

    /// JWT signer (HS256 or RS256 per configuration).
    pub signer: Arc<TokenSigner>,
    /// JWT verifier, pinned to the signer's algorithm.
    pub verifier: Arc<TokenVerifier>,
    /// Published verification keys; `None` in symmetric-only mode.
    pub jwks: Option<Arc<JwksDocument>>,

    /// Session lifecycle service.
    pub sessions: Arc<SessionService>,
    /// API key lifecycle service.
    pub api_keys: Arc<ApiKeyService>,
    /// Quota decision and usage recording service.
    pub quota: Arc<QuotaService>,
    /// Override storage and blending.
    pub overrides: Arc<OverrideService>,
    /// The central authorization decision service.
    pub authz: Arc<AuthorizationService>,
    /// Tenant and membership management.
    pub tenants: Arc<TenantService>,
    /// Membership lookups for role gating on management routes.
    pub memberships: Arc<dyn MembershipStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("signer", &self.signer)
            .field("jwks_published", &self.jwks.is_some())
            .finish()
    }
}

impl AppState {
    /// Wire every repository and service from configuration and a
    /// connected pool.
    pub fn initialize(config: AppConfig, pool: PgPool) -> Result<Self, AppError> {
        let store = Store::new(pool);

        let users = Arc::new(UserRepository::new(store.clone()));
        let tenant_repo = Arc::new(TenantRepository::new(store.clone()));
        let memberships = Arc::new(MembershipRepository::new(store.clone()));
        let session_repo = Arc::new(SessionRepository::new(store.clone()));
        let key_repo = Arc::new(ApiKeyRepository::new(store.clone()));
        let usage_repo = Arc::new(UsageRepository::new(store.clone()));
        let override_repo = Arc::new(OverrideRepository::new(store.clone()));
        let flag_repo = Arc::new(FeatureFlagRepository::new(store.clone()));

        let signer = Arc::new(TokenSigner::from_config(&config.auth)?);
        let verifier = Arc::new(TokenVerifier::from_config(&config.auth)?);
        let hasher = Arc::new(PasswordHasher::new(config.auth.pbkdf2_iterations));

        let jwks = match &config.auth.rsa_public_key_pem {
            Some(pem) if config.auth.has_rsa_keys() => Some(Arc::new(JwksDocument::from_rsa_pem(
                pem,
                &config.auth.jwt_kid,
            )?)),
            _ => None,
        };

        let sessions = Arc::new(SessionService::new(
            users.clone(),
            session_repo,
            hasher.clone(),
            signer.clone(),
            config.auth.clone(),
        ));

        let api_keys = Arc::new(ApiKeyService::new(key_repo.clone()));

        let quota = Arc::new(QuotaService::new(
            usage_repo,
            key_repo.clone(),
            tenant_repo.clone(),
        ));

        let overrides = Arc::new(OverrideService::new(override_repo));
        let features = FeatureGate::new(flag_repo);

        let authz = Arc::new(AuthorizationService::new(
            tenant_repo.clone(),
            memberships.clone(),
            key_repo,
            (*overrides).clone(),
            features,
            (*quota).clone(),
        ));

        let tenants = Arc::new(TenantService::new(
            tenant_repo,
            memberships.clone(),
            users,
            hasher,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            signer,
            verifier,
            jwks,
            sessions,
            api_keys,
            quota,
            overrides,
            authz,
            tenants,
            memberships,
        })
    }
}
