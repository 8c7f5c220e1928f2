//! Auth handlers: login, refresh, logout.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use tollgate_core::error::AppError;

use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest};
use crate::dto::response::{LoginResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::Bearer;
use crate::handlers::identity::{self, Identity};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let result = state
        .sessions
        .login(&req.email, &req.password, req.tenant_id, &req.service)
        .await?;

    Ok(Json(LoginResponse {
        access_token: result.access.token,
        access_expires_at: result.access.expires_at,
        refresh_token: result.refresh_token,
        session_id: result.session.id,
    }))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let result = state.sessions.refresh(&req.refresh_token, &req.service).await?;

    Ok(Json(LoginResponse {
        access_token: result.access.token,
        access_expires_at: result.access.expires_at,
        refresh_token: result.refresh_token,
        session_id: result.session.id,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    bearer: Bearer,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let identity = identity::resolve(&state, &bearer.0, &req.service).await?;

    let Identity::Session { session_id, .. } = identity else {
        return Err(ApiError(AppError::validation(
            "Only session tokens can be logged out",
        )));
    };

    state.sessions.logout(session_id).await?;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
