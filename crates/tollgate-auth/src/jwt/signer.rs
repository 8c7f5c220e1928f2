//! JWT creation with configurable signing algorithm and TTLs.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use tollgate_core::config::auth::AuthConfig;
use tollgate_core::error::AppError;

use super::claims::{ApiKeyClaims, SessionClaims, TokenClaims};

/// A freshly signed token with its expiry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// The signed compact JWT.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Creates signed JWTs for sessions and API keys.
///
/// RS256 when an RSA key pair is configured, HS256 with the shared secret
/// otherwise. The choice is fixed at construction; there is no per-call
/// algorithm selection.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    /// Key id stamped into RS256 headers and published via JWKS.
    kid: Option<String>,
    access_ttl_minutes: i64,
    api_key_ttl_minutes: i64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &self.algorithm)
            .field("kid", &self.kid)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        let (encoding_key, algorithm, kid) = match &config.rsa_private_key_pem {
            Some(pem) if config.has_rsa_keys() => {
                let key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    AppError::configuration(format!("Invalid RSA private key: {e}"))
                })?;
                (key, Algorithm::RS256, Some(config.jwt_kid.clone()))
            }
            _ => (
                EncodingKey::from_secret(config.jwt_secret.as_bytes()),
                Algorithm::HS256,
                None,
            ),
        };

        Ok(Self {
            encoding_key,
            algorithm,
            kid,
            access_ttl_minutes: config.jwt_access_ttl_minutes as i64,
            api_key_ttl_minutes: config.api_key_token_ttl_minutes as i64,
        })
    }

    /// The algorithm this signer (and its verifier) is pinned to.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign a session token bound to the given service audience.
    pub fn issue_session_token(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        session_id: Uuid,
        service: &str,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let claims = TokenClaims::Session(SessionClaims {
            sub: user_id,
            tenant_id,
            session_id,
            aud: service.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        });

        self.sign(&claims, expires_at)
    }

    /// Sign an API-key token bound to the given service audience.
    pub fn issue_api_key_token(
        &self,
        tenant_id: Uuid,
        api_key_id: Uuid,
        scope: Vec<String>,
        service: &str,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.api_key_ttl_minutes);

        let claims = TokenClaims::ApiKey(ApiKeyClaims {
            sub: tenant_id,
            api_key_id,
            scope,
            aud: service.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        });

        self.sign(&claims, expires_at)
    }

    fn sign(
        &self,
        claims: &TokenClaims,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let mut header = Header::new(self.algorithm);
        header.kid = self.kid.clone();

        let token = encode(&header, claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}
