//! Concrete sqlx repository implementations of the store traits.

pub mod api_key;
pub mod feature_flag;
pub mod membership;
pub mod overrides;
pub mod session;
pub mod tenant;
pub mod usage;
pub mod user;

pub use api_key::ApiKeyRepository;
pub use feature_flag::FeatureFlagRepository;
pub use membership::MembershipRepository;
pub use overrides::OverrideRepository;
pub use session::SessionRepository;
pub use tenant::TenantRepository;
pub use usage::UsageRepository;
pub use user::UserRepository;

/// Check whether a sqlx error is a PostgreSQL unique violation (23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
