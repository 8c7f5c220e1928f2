//! # tollgate-entity
//!
//! Domain entity models for Tollgate. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod api_key;
pub mod feature_flag;
pub mod membership;
pub mod overrides;
pub mod session;
pub mod tenant;
pub mod usage;
pub mod user;
