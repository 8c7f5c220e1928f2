//! # tollgate-database
//!
//! PostgreSQL connection management, the consistent store accessor, the
//! store-seam traits consumed by the service layer, and concrete
//! repository implementations for all Tollgate entities.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;
pub mod stores;

pub use connection::DatabasePool;
pub use store::Store;
