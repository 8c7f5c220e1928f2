//! The authorize endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::Validate;

use tollgate_core::error::AppError;
use tollgate_service::authorize::AuthzRequest;

use crate::dto::request::AuthorizeRequest;
use crate::dto::response::AuthorizeResponse;
use crate::error::ApiError;
use crate::extractors::Bearer;
use crate::handlers::identity::{self, Identity};
use crate::state::AppState;

/// POST /api/authorize
///
/// Returns 200 with the decision when allowed, 403 with the decision
/// when denied, 401 for an invalid or missing credential, and 400 for a
/// malformed body.
pub async fn authorize(
    State(state): State<AppState>,
    bearer: Bearer,
    Json(req): Json<AuthorizeRequest>,
) -> Result<Response, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let ctx = &req.context;
    let resolved = identity::resolve(&state, &bearer.0, &ctx.service).await?;

    // The verified identity is authoritative; the context may narrow it
    // but never widen it.
    let (user_id, session_id, api_key_id) = match resolved {
        Identity::Session {
            user_id,
            tenant_id,
            session_id,
        } => {
            if let Some(token_tenant) = tenant_id {
                if token_tenant != ctx.tenant_id {
                    return Err(ApiError(AppError::authentication(
                        "Token is not valid for this tenant",
                    )));
                }
            }
            (Some(user_id), Some(session_id), None)
        }
        Identity::ApiKey {
            tenant_id,
            api_key_id,
        } => {
            if tenant_id != ctx.tenant_id {
                return Err(ApiError(AppError::authentication(
                    "Token is not valid for this tenant",
                )));
            }
            (None, None, Some(api_key_id))
        }
    };

    let decision = state
        .authz
        .authorize(&AuthzRequest {
            user_id,
            tenant_id: ctx.tenant_id,
            session_id,
            api_key_id,
            service: ctx.service.clone(),
            action: req.action.clone(),
            resource: req.resource.clone(),
            required_feature: ctx.required_feature.clone(),
            required_role: ctx.required_role,
            quantity: ctx.quantity,
        })
        .await?;

    let status = if decision.allowed {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };

    Ok((status, Json(AuthorizeResponse::from(decision))).into_response())
}
