//! API key lifecycle service.

pub mod service;

pub use service::{ApiKeyService, CreatedKey, KEY_PREFIX};
