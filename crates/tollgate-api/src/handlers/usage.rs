//! Internal usage-recording endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::Validate;

use tollgate_core::error::AppError;
use tollgate_entity::usage::RecordUsage;

use crate::dto::request::RecordUsageRequest;
use crate::dto::response::{UsageDeniedResponse, UsageRecordedResponse};
use crate::error::ApiError;
use crate::extractors::InternalAuth;
use crate::state::AppState;

/// POST /internal/usage
///
/// Shared-secret authenticated. Composes check-then-record: a denial
/// writes nothing and answers 429 with the failing quota numbers; an
/// allowed call answers 200 with the post-recording remaining.
pub async fn record(
    State(state): State<AppState>,
    _auth: InternalAuth,
    Json(req): Json<RecordUsageRequest>,
) -> Result<Response, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let boost = state.overrides.parsed(req.tenant_id).await?.quota_boost;

    let data = RecordUsage {
        tenant_id: req.tenant_id,
        api_key_id: req.api_key_id,
        user_id: req.user_id,
        service: req.service,
        action: req.action,
        quantity: req.quantity,
        idempotency_key: req.idempotency_key,
    };

    let (check, event) = state.quota.check_and_record(&data, boost).await?;

    match event {
        Some(event) => Ok((
            StatusCode::OK,
            Json(UsageRecordedResponse {
                event_id: event.id,
                remaining: check.remaining,
                period_bucket: event.period_bucket,
            }),
        )
            .into_response()),
        None => Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(UsageDeniedResponse {
                error: "QUOTA_EXCEEDED".to_string(),
                message: "Recording denied by quota".to_string(),
                quota: check,
            }),
        )
            .into_response()),
    }
}
