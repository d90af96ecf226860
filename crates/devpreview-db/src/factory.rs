//! Composition utilities for building repositories with `SQLite` backends.
//!
//! Construction only; no domain logic.

use sqlx::SqlitePool;
use std::sync::Arc;

use devpreview_core::Repos;

use crate::repositories::{
    SqliteScratchRepository, SqliteSettingsRepository, SqliteUiPreferencesRepository,
};

pub struct CoreFactory;

impl CoreFactory {
    /// Build all `SQLite` repositories from a pool.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteScratchRepository::new(pool.clone())),
            Arc::new(SqliteSettingsRepository::new(pool.clone())),
            Arc::new(SqliteUiPreferencesRepository::new(pool)),
        )
    }

    pub fn scratch_repository(pool: SqlitePool) -> Arc<SqliteScratchRepository> {
        Arc::new(SqliteScratchRepository::new(pool))
    }

    pub fn settings_repository(pool: SqlitePool) -> Arc<SqliteSettingsRepository> {
        Arc::new(SqliteSettingsRepository::new(pool))
    }

    pub fn ui_preferences_repository(pool: SqlitePool) -> Arc<SqliteUiPreferencesRepository> {
        Arc::new(SqliteUiPreferencesRepository::new(pool))
    }
}

/// In-memory database with the production schema, for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    pub async fn new() -> anyhow::Result<Self> {
        Ok(Self {
            pool: crate::setup::setup_test_database().await?,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone())
    }
}
