//! Consistent store accessor.
//!
//! Every auth-path read and write goes through [`Store`], which pins all
//! statements to the primary pool so a read immediately following a write
//! on the same logical flow observes that write. Stale reads on revoked
//! tokens or keys are a security defect, so no replica routing happens
//! here.

use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};

use tollgate_core::error::{AppError, ErrorKind};

/// Primary-pinned access to the relational store.
///
/// Cloning is cheap; the underlying pool is reference-counted.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Wrap an existing primary pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The primary pool. All repository statements execute against this.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a multi-statement atomic batch.
    ///
    /// Used for compound writes that must not be observed partially, such
    /// as tenant + owner-membership creation. Single-statement writes rely
    /// on row-level atomicity and do not need this.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }
}
