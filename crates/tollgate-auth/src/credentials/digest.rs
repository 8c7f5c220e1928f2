//! SHA-256 digest helper.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of the input.
///
/// Used wherever a secret (API key, refresh token) is persisted: only the
/// digest is stored, never the plaintext.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
