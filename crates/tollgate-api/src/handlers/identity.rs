//! Bearer credential resolution shared by the protected handlers.

use uuid::Uuid;

use tollgate_auth::apikey::KEY_PREFIX;
use tollgate_auth::jwt::TokenClaims;
use tollgate_core::error::AppError;
use tollgate_entity::membership::TenantRole;

use crate::state::AppState;

/// The verified caller behind a bearer credential.
#[derive(Debug, Clone)]
pub enum Identity {
    /// A user session, backed by a live session row.
    Session {
        /// The authenticated user.
        user_id: Uuid,
        /// Tenant scope of the session, if any.
        tenant_id: Option<Uuid>,
        /// The live session.
        session_id: Uuid,
    },
    /// An API key, presented as a key token or as the raw key.
    ApiKey {
        /// The key's tenant binding.
        tenant_id: Uuid,
        /// The key.
        api_key_id: Uuid,
    },
}

/// Resolve a bearer credential into a verified identity.
///
/// A `tg_`-prefixed credential is treated as a raw API key and validated
/// against the store. Anything else must be a JWT for the expected
/// service audience; session tokens additionally require their session
/// to still be live, which lazily revokes expired ones.
pub async fn resolve(
    state: &AppState,
    bearer: &str,
    expected_service: &str,
) -> Result<Identity, AppError> {
    if bearer.starts_with(KEY_PREFIX) {
        let key = state.api_keys.validate(bearer).await?;
        return Ok(Identity::ApiKey {
            tenant_id: key.tenant_id,
            api_key_id: key.id,
        });
    }

    let claims = state.verifier.verify(bearer, expected_service)?;

    match claims {
        TokenClaims::Session(c) => {
            state.sessions.validate_session(c.session_id).await?;
            Ok(Identity::Session {
                user_id: c.sub,
                tenant_id: c.tenant_id,
                session_id: c.session_id,
            })
        }
        TokenClaims::ApiKey(c) => Ok(Identity::ApiKey {
            tenant_id: c.sub,
            api_key_id: c.api_key_id,
        }),
    }
}

/// Resolve a management-API session identity and check the caller's role
/// within the tenant.
///
/// Non-members get not-found rather than forbidden, so a probing caller
/// cannot confirm the tenant exists.
pub async fn require_member_role(
    state: &AppState,
    bearer: &str,
    tenant_id: Uuid,
    minimum: TenantRole,
) -> Result<Uuid, AppError> {
    let identity = resolve(state, bearer, crate::state::MANAGEMENT_AUDIENCE).await?;

    let Identity::Session {
        user_id,
        tenant_id: token_tenant,
        ..
    } = identity
    else {
        return Err(AppError::authorization(
            "API keys cannot call management endpoints",
        ));
    };

    if let Some(token_tenant) = token_tenant {
        if token_tenant != tenant_id {
            return Err(AppError::not_found("Tenant not found"));
        }
    }

    let membership = state
        .memberships
        .find(tenant_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tenant not found"))?;

    if !membership.role.has_at_least(&minimum) {
        return Err(AppError::authorization("Insufficient role"));
    }

    Ok(user_id)
}
