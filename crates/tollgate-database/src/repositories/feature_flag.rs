//! Feature flag read repository.
//!
//! Flags are written by an external system; Tollgate only reads them.

use async_trait::async_trait;

use tollgate_core::error::{AppError, ErrorKind};
use tollgate_core::result::AppResult;
use tollgate_entity::feature_flag::FeatureFlag;

use crate::store::Store;
use crate::stores::FeatureFlagStore;

/// Read-only repository for feature flag rows.
#[derive(Debug, Clone)]
pub struct FeatureFlagRepository {
    store: Store,
}

impl FeatureFlagRepository {
    /// Create a new feature flag repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FeatureFlagStore for FeatureFlagRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<FeatureFlag>> {
        sqlx::query_as::<_, FeatureFlag>("SELECT * FROM feature_flags WHERE name = $1")
            .bind(name)
            .fetch_optional(self.store.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find feature flag", e)
            })
    }
}
