//! `SQLite` implementation of the `UiPreferencesRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use devpreview_core::{RepositoryError, UiPreferences, UiPreferencesRepository};

use super::settings_kv::{load_json, save_json};

const PREFERENCES_KEY: &str = "ui_preferences";

pub struct SqliteUiPreferencesRepository {
    pool: SqlitePool,
}

impl SqliteUiPreferencesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UiPreferencesRepository for SqliteUiPreferencesRepository {
    async fn load(&self) -> Result<UiPreferences, RepositoryError> {
        Ok(load_json(&self.pool, PREFERENCES_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, preferences: &UiPreferences) -> Result<(), RepositoryError> {
        save_json(&self.pool, PREFERENCES_KEY, preferences).await
    }
}
