//! # tollgate-api
//!
//! Axum HTTP surface for Tollgate: the JWKS endpoint, the authorize
//! endpoint, API key management, internal usage recording, and the
//! session (login/refresh/logout) routes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
