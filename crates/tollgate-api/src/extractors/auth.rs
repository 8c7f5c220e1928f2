//! Bearer credential extraction.
//!
//! Verification happens in the handlers, not here: the expected token
//! audience comes from the request body, which an extractor cannot see.
//! This extractor only pulls the raw credential off the header and
//! rejects requests that carry none.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tollgate_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The raw bearer credential from the `Authorization` header.
///
/// Either a compact JWT or a plaintext `tg_`-prefixed API key; the
/// handler decides which by shape.
#[derive(Debug, Clone)]
pub struct Bearer(pub String);

impl FromRequestParts<AppState> for Bearer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError(AppError::authentication("Missing Authorization header")))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError(AppError::authentication(
                "Invalid Authorization header format",
            ))
        })?;

        if token.is_empty() {
            return Err(ApiError(AppError::authentication("Empty bearer token")));
        }

        Ok(Bearer(token.to_string()))
    }
}
