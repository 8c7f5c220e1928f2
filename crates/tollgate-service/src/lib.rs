//! # tollgate-service
//!
//! Decision-engine service layer for Tollgate. Each service orchestrates
//! the store-seam traits to implement one concern: usage quotas,
//! administrative overrides, feature gating, tenant membership, and the
//! central `authorize` decision.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod authorize;
pub mod features;
pub mod overrides;
pub mod quota;
pub mod tenant;

pub use authorize::{AuthorizationService, AuthzRequest, Decision, DecisionLevel};
pub use features::FeatureGate;
pub use overrides::{OverrideService, ParsedOverrides};
pub use quota::{QuotaCheck, QuotaLevel, QuotaService};
pub use tenant::TenantService;
