//! Signup and membership management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use tollgate_core::error::AppError;
use tollgate_entity::membership::TenantRole;
use tollgate_entity::tenant::{CreateTenant, TenantTier};

use crate::dto::request::{AddMemberRequest, SignupRequest, UpdateMemberRequest};
use crate::dto::response::{MemberResponse, MessageResponse, SignupResponse};
use crate::error::ApiError;
use crate::extractors::Bearer;
use crate::handlers::identity::require_member_role;
use crate::state::AppState;

/// POST /api/signup: create a tenant and its owner account.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let (tenant, user) = state
        .tenants
        .signup(
            &CreateTenant {
                name: req.tenant_name,
                tier: req.tier.unwrap_or(TenantTier::Free),
                global_quota_limit: None,
            },
            &req.email,
            &req.password,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            tenant_id: tenant.id,
            user_id: user.id,
        }),
    ))
}

/// GET /api/tenants/{tenant_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    require_member_role(&state, &bearer.0, tenant_id, TenantRole::Member).await?;

    let members = state.tenants.list_members(tenant_id).await?;
    Ok(Json(
        members
            .into_iter()
            .map(|m| MemberResponse {
                user_id: m.user_id,
                role: m.role.to_string(),
                created_at: m.created_at,
            })
            .collect(),
    ))
}

/// POST /api/tenants/{tenant_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    // Minting an owner takes an owner; everything else takes an admin.
    let minimum = if req.role == TenantRole::Owner {
        TenantRole::Owner
    } else {
        TenantRole::Admin
    };
    require_member_role(&state, &bearer.0, tenant_id, minimum).await?;

    let membership = state
        .tenants
        .add_member(tenant_id, req.user_id, req.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MemberResponse {
            user_id: membership.user_id,
            role: membership.role.to_string(),
            created_at: membership.created_at,
        }),
    ))
}

/// PATCH /api/tenants/{tenant_id}/members/{user_id}
pub async fn update_member(
    State(state): State<AppState>,
    bearer: Bearer,
    Path((tenant_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = state.memberships.find(tenant_id, user_id).await?;
    let touches_owner =
        req.role == TenantRole::Owner || target.map(|m| m.role) == Some(TenantRole::Owner);
    let minimum = if touches_owner {
        TenantRole::Owner
    } else {
        TenantRole::Admin
    };
    require_member_role(&state, &bearer.0, tenant_id, minimum).await?;

    state
        .tenants
        .update_member_role(tenant_id, user_id, req.role)
        .await?;
    state.authz.invalidate_role(tenant_id, user_id).await;

    Ok(Json(MessageResponse {
        message: "Role updated".to_string(),
    }))
}

/// DELETE /api/tenants/{tenant_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    bearer: Bearer,
    Path((tenant_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = state.memberships.find(tenant_id, user_id).await?;
    let minimum = if target.map(|m| m.role) == Some(TenantRole::Owner) {
        TenantRole::Owner
    } else {
        TenantRole::Admin
    };
    require_member_role(&state, &bearer.0, tenant_id, minimum).await?;

    state.tenants.remove_member(tenant_id, user_id).await?;
    state.authz.invalidate_role(tenant_id, user_id).await;

    Ok(Json(MessageResponse {
        message: "Member removed".to_string(),
    }))
}
