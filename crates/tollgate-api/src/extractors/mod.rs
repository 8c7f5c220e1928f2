//! Request extractors.

pub mod auth;
pub mod internal;

pub use auth::Bearer;
pub use internal::InternalAuth;
