//! API key management handlers.
//!
//! Issuance, mutation, and revocation require admin or owner; listing
//! requires membership. Key material appears exactly once, in the
//! creation response.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use tollgate_core::error::AppError;
use tollgate_entity::api_key::{CreateApiKey, UpdateApiKey};
use tollgate_entity::membership::TenantRole;

use crate::dto::request::{CreateKeyRequest, UpdateKeyRequest};
use crate::dto::response::{ApiKeyResponse, CreatedKeyResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::Bearer;
use crate::handlers::identity::require_member_role;
use crate::state::AppState;

/// POST /api/tenants/{tenant_id}/keys
pub async fn create(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<CreatedKeyResponse>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_member_role(&state, &bearer.0, tenant_id, TenantRole::Admin).await?;

    let created = state
        .api_keys
        .create(&CreateApiKey {
            tenant_id,
            name: req.name,
            scopes: req.scopes,
            quota_limit: req.quota_limit,
            quota_period: req.quota_period,
            expires_at: req.expires_at,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedKeyResponse {
            api_key: created.plaintext,
            key: created.key.into(),
        }),
    ))
}

/// GET /api/tenants/{tenant_id}/keys
pub async fn list(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<ApiKeyResponse>>, ApiError> {
    require_member_role(&state, &bearer.0, tenant_id, TenantRole::Member).await?;

    let keys = state.api_keys.list(tenant_id).await?;
    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

/// GET /api/tenants/{tenant_id}/keys/{id}
pub async fn get(
    State(state): State<AppState>,
    bearer: Bearer,
    Path((tenant_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    require_member_role(&state, &bearer.0, tenant_id, TenantRole::Member).await?;

    let key = state.api_keys.get(id, tenant_id).await?;
    Ok(Json(key.into()))
}

/// PATCH /api/tenants/{tenant_id}/keys/{id}
pub async fn update(
    State(state): State<AppState>,
    bearer: Bearer,
    Path((tenant_id, id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_member_role(&state, &bearer.0, tenant_id, TenantRole::Admin).await?;

    let key = state
        .api_keys
        .update(
            id,
            tenant_id,
            &UpdateApiKey {
                name: req.name,
                scopes: req.scopes,
            },
        )
        .await?;

    Ok(Json(key.into()))
}

/// DELETE /api/tenants/{tenant_id}/keys/{id} (soft revocation).
pub async fn revoke(
    State(state): State<AppState>,
    bearer: Bearer,
    Path((tenant_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_member_role(&state, &bearer.0, tenant_id, TenantRole::Admin).await?;

    state.api_keys.revoke(id, tenant_id).await?;

    Ok(Json(MessageResponse {
        message: "API key revoked".to_string(),
    }))
}
