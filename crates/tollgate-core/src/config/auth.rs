//! Authentication and credential configuration.

use serde::{Deserialize, Serialize};

/// Authentication, token, and lockout configuration.
///
/// When `rsa_private_key_pem` and `rsa_public_key_pem` are both set, tokens
/// are signed with RS256 and the public key is published via JWKS. Otherwise
/// the shared `jwt_secret` is used with HS256. The two modes are exclusive on
/// the verification path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HS256 signing (ignored when RSA keys are set).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// PEM-encoded RSA private key for RS256 signing.
    #[serde(default)]
    pub rsa_private_key_pem: Option<String>,
    /// PEM-encoded RSA public key matching the private key.
    #[serde(default)]
    pub rsa_public_key_pem: Option<String>,
    /// Key id published in JWKS and stamped into RS256 token headers.
    #[serde(default = "default_kid")]
    pub jwt_kid: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Session (and refresh token) TTL in hours.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    /// API-key token TTL in minutes (for minted API-key JWTs).
    #[serde(default = "default_api_key_token_ttl")]
    pub api_key_token_ttl_minutes: u64,
    /// PBKDF2 iteration count for newly hashed passwords.
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,
    /// Maximum failed login attempts before lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Account lockout duration in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: u64,
    /// Shared secret for the internal usage-recording endpoint.
    #[serde(default = "default_internal_secret")]
    pub internal_api_secret: String,
}

impl AuthConfig {
    /// Whether an asymmetric key pair is configured.
    pub fn has_rsa_keys(&self) -> bool {
        self.rsa_private_key_pem.is_some() && self.rsa_public_key_pem.is_some()
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_kid() -> String {
    "tollgate-1".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_session_ttl() -> u64 {
    24
}

fn default_api_key_token_ttl() -> u64 {
    60
}

fn default_pbkdf2_iterations() -> u32 {
    100_000
}

fn default_max_failed() -> i32 {
    5
}

fn default_lockout() -> u64 {
    30
}

fn default_internal_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}
