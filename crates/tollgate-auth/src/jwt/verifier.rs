//! JWT validation pinned to a single algorithm.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use tollgate_core::config::auth::AuthConfig;
use tollgate_core::error::AppError;

use super::claims::TokenClaims;

/// Validates JWTs against exactly one algorithm and audience.
///
/// Once RS256 is configured, HS256 verification is never attempted;
/// mixing algorithms on one verification path is a downgrade vector, so
/// a token signed under the wrong algorithm fails closed.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl TokenVerifier {
    /// Create a verifier from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        let (decoding_key, algorithm) = match &config.rsa_public_key_pem {
            Some(pem) if config.has_rsa_keys() => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AppError::configuration(format!("Invalid RSA public key: {e}")))?;
                (key, Algorithm::RS256)
            }
            _ => (
                DecodingKey::from_secret(config.jwt_secret.as_bytes()),
                Algorithm::HS256,
            ),
        };

        Ok(Self {
            decoding_key,
            algorithm,
        })
    }

    /// Decode and validate a token for the expected service audience.
    ///
    /// Checks, in order: signature under the pinned algorithm, audience,
    /// library expiry, then an explicit expiry re-check. All failures
    /// resolve to an authentication error; nothing panics past this
    /// boundary.
    pub fn verify(&self, token: &str, expected_aud: &str) -> Result<TokenClaims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[expected_aud]);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds, for clock skew

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    AppError::authentication("Token algorithm mismatch")
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AppError::authentication("Token audience mismatch")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            }
        })?;

        let claims = data.claims;

        // The library already enforced exp; re-check explicitly so the
        // guarantee does not depend on validation flags alone.
        if claims.exp() <= Utc::now().timestamp() - 5 {
            return Err(AppError::authentication("Token has expired"));
        }

        Ok(claims)
    }
}
