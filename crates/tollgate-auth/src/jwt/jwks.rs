//! JWKS document construction for RS256 verification keys.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};

use tollgate_core::error::AppError;

/// A single RSA verification key in JWK form.
///
/// Only public components are ever serialized here; private key material
/// never reaches this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `RSA`.
    pub kty: String,
    /// Modulus, base64url without padding.
    pub n: String,
    /// Public exponent, base64url without padding.
    pub e: String,
    /// Key id matching the `kid` stamped into token headers.
    pub kid: String,
    /// Signing algorithm, always `RS256`.
    pub alg: String,
    /// Key use, always `sig`.
    #[serde(rename = "use")]
    pub use_field: String,
}

/// The JWKS payload served at the well-known endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksDocument {
    /// Published verification keys, current first.
    pub keys: Vec<Jwk>,
}

impl JwksDocument {
    /// Build a single-key document from a PEM-encoded RSA public key.
    ///
    /// Accepts SPKI ("PUBLIC KEY") and PKCS#1 ("RSA PUBLIC KEY") PEM.
    pub fn from_rsa_pem(pem: &str, kid: &str) -> Result<Self, AppError> {
        let public_key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| AppError::configuration(format!("Invalid RSA public key PEM: {e}")))?;

        Ok(Self {
            keys: vec![Jwk {
                kty: "RSA".to_string(),
                n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
                kid: kid.to_string(),
                alg: "RS256".to_string(),
                use_field: "sig".to_string(),
            }],
        })
    }

    /// Append a previously published key, keeping it verifiable through a
    /// rotation window.
    pub fn with_previous(mut self, previous: Jwk) -> Self {
        self.keys.push(previous);
        self
    }
}
