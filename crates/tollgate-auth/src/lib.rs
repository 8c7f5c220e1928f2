//! # tollgate-auth
//!
//! Authentication building blocks for Tollgate: credential primitives
//! (PBKDF2 password hashing, key generation, digests), the JWT/JWKS
//! token subsystem, the API key service, and the session service.

pub mod apikey;
pub mod credentials;
pub mod jwt;
pub mod session;

pub use apikey::ApiKeyService;
pub use credentials::PasswordHasher;
pub use jwt::{TokenClaims, TokenKind, TokenSigner, TokenVerifier};
pub use session::SessionService;
