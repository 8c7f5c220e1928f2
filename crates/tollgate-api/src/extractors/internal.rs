//! Shared-secret authentication for internal-only endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

use tollgate_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the internal shared secret.
const INTERNAL_SECRET_HEADER: &str = "x-internal-secret";

/// Marker extractor proving the caller presented the internal secret.
///
/// The comparison is constant-time; a wrong secret and a missing one
/// yield the same error.
#[derive(Debug, Clone, Copy)]
pub struct InternalAuth;

impl FromRequestParts<AppState> for InternalAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(INTERNAL_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let expected = state.config.auth.internal_api_secret.as_bytes();
        let matches: bool = presented.as_bytes().ct_eq(expected).into();

        if !matches {
            return Err(ApiError(AppError::authentication(
                "Invalid internal credentials",
            )));
        }

        Ok(InternalAuth)
    }
}
