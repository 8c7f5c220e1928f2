//! Random token and key material generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Base62 alphabet used for API key suffixes.
const BASE62: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix in an API key.
pub const KEY_SUFFIX_LEN: usize = 52;

/// Generate the 52-character base62 suffix of a new API key.
///
/// One cryptographically random byte is drawn per output character and
/// mapped byte-mod-62 into the base62 alphabet.
pub fn generate_key_suffix() -> String {
    let mut bytes = [0u8; KEY_SUFFIX_LEN];
    rand::rng().fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| BASE62[(*b % 62) as usize] as char)
        .collect()
}

/// Generate an opaque refresh token: 32 random bytes, base64url no-pad.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_shape() {
        let suffix = generate_key_suffix();
        assert_eq!(suffix.len(), KEY_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE62.contains(&b)));
    }

    #[test]
    fn test_suffixes_are_distinct() {
        assert_ne!(generate_key_suffix(), generate_key_suffix());
    }

    #[test]
    fn test_refresh_token_shape() {
        let token = generate_refresh_token();
        // 32 bytes → 43 base64url chars without padding.
        assert_eq!(token.len(), 43);
        assert_ne!(token, generate_refresh_token());
    }
}
