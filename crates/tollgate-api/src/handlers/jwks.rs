//! JWKS publication endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use tollgate_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Cache policy for the published key set. Verifiers may keep serving a
/// stale copy for a day while revalidating.
const CACHE_CONTROL: &str = "max-age=3600, stale-while-revalidate=86400";

/// GET /.well-known/jwks.json
///
/// Returns the RSA verification keys, or 503 when the deployment is
/// symmetric-only and has nothing to publish.
pub async fn jwks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(doc) = &state.jwks else {
        return Err(ApiError(AppError::service_unavailable(
            "No asymmetric signing key is configured",
        )));
    };

    Ok((
        StatusCode::OK,
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(doc.as_ref().clone()),
    )
        .into_response())
}
