//! PBKDF2-HMAC-SHA256 password hashing and verification.
//!
//! Persisted format: `pbkdf2:<iterations>:<base64 salt>:<base64 hash>`.
//! The iteration count round-trips through the format, so hashes created
//! under an older default keep verifying after the default changes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use tollgate_core::error::AppError;

/// Salt length in bytes for newly hashed passwords.
const SALT_LEN: usize = 16;

/// Derived key length in bytes.
const HASH_LEN: usize = 32;

/// Handles password hashing and verification using PBKDF2-HMAC-SHA256.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Iteration count for newly created hashes.
    iterations: u32,
    /// Hash of a fixed throwaway password, compared against when the
    /// account does not exist so the timing profile matches a real check.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Create a new password hasher with the given iteration count.
    pub fn new(iterations: u32) -> Self {
        let mut hasher = Self {
            iterations,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher
            .hash_password("tollgate-dummy-credential")
            .unwrap_or_default();
        hasher
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);

        let mut derived = [0u8; HASH_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, self.iterations, &mut derived);

        Ok(format!(
            "pbkdf2:{}:{}:{}",
            self.iterations,
            BASE64.encode(salt),
            BASE64.encode(derived)
        ))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    /// The comparison is constant-time.
    pub fn verify_password(&self, password: &str, stored: &str) -> Result<bool, AppError> {
        let (iterations, salt, expected) = parse_hash(stored)?;

        let mut derived = vec![0u8; expected.len()];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut derived);

        Ok(derived.ct_eq(&expected).into())
    }

    /// Burn the same work as a real verification against a dummy hash.
    ///
    /// Called when the account does not exist (or has no password) so the
    /// response time does not confirm account existence.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify_password(password, &self.dummy_hash);
    }
}

/// Parse the `pbkdf2:<iterations>:<salt>:<hash>` format.
fn parse_hash(stored: &str) -> Result<(u32, Vec<u8>, Vec<u8>), AppError> {
    let mut parts = stored.split(':');

    let scheme = parts.next().unwrap_or_default();
    if scheme != "pbkdf2" {
        return Err(AppError::internal("Unsupported password hash scheme"));
    }

    let iterations: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::internal("Invalid iteration count in password hash"))?;

    let salt = parts
        .next()
        .and_then(|s| BASE64.decode(s).ok())
        .ok_or_else(|| AppError::internal("Invalid salt in password hash"))?;

    let hash = parts
        .next()
        .and_then(|s| BASE64.decode(s).ok())
        .ok_or_else(|| AppError::internal("Invalid digest in password hash"))?;

    if parts.next().is_some() {
        return Err(AppError::internal("Malformed password hash"));
    }

    Ok((iterations, salt, hash))
}
