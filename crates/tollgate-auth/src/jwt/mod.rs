//! JWT/JWKS token subsystem.
//!
//! Two token flavors exist, session and API-key, distinguished
//! structurally on the wire and as an explicit enum in code. Signing is
//! RS256 when an RSA key pair is configured (public key published via
//! JWKS) and HS256 otherwise; the verification path is pinned to exactly
//! one algorithm and never falls back.

pub mod claims;
pub mod jwks;
pub mod signer;
pub mod verifier;

pub use claims::{ApiKeyClaims, SessionClaims, TokenClaims, TokenKind};
pub use jwks::{Jwk, JwksDocument};
pub use signer::{IssuedToken, TokenSigner};
pub use verifier::TokenVerifier;
