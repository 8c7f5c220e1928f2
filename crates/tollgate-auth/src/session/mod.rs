//! Session lifecycle service.

pub mod service;

pub use service::{LoginResult, SessionService};
