//! Credential primitives shared by all higher auth components.

pub mod digest;
pub mod password;
pub mod random;

pub use digest::sha256_hex;
pub use password::PasswordHasher;
pub use random::{generate_key_suffix, generate_refresh_token};
