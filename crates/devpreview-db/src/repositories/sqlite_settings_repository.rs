//! `SQLite` implementation of the `SettingsRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use devpreview_core::{PreviewSettings, RepositoryError, SettingsRepository};

use super::settings_kv::{load_json, save_json};

const SETTINGS_KEY: &str = "preview_settings";

/// Stores [`PreviewSettings`] as a JSON blob in `settings_kv`.
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn load(&self) -> Result<PreviewSettings, RepositoryError> {
        Ok(load_json(&self.pool, SETTINGS_KEY)
            .await?
            .unwrap_or_else(PreviewSettings::with_defaults))
    }

    async fn save(&self, settings: &PreviewSettings) -> Result<(), RepositoryError> {
        save_json(&self.pool, SETTINGS_KEY, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    #[tokio::test]
    async fn test_load_returns_defaults_when_empty() {
        let repo = SqliteSettingsRepository::new(setup_test_database().await.unwrap());
        assert_eq!(repo.load().await.unwrap(), PreviewSettings::with_defaults());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = SqliteSettingsRepository::new(setup_test_database().await.unwrap());

        let settings = PreviewSettings {
            slow_start_secs: Some(15),
            url_patterns: Some(vec![r"ready (?P<url>\S+)".to_string()]),
            ..PreviewSettings::with_defaults()
        };
        repo.save(&settings).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.slow_start_secs, Some(15));
        assert_eq!(loaded.url_patterns, settings.url_patterns);
    }

    #[tokio::test]
    async fn test_corrupt_row_is_serialization_error() {
        let pool = setup_test_database().await.unwrap();
        sqlx::query("INSERT INTO settings_kv (key, value, updated_at) VALUES (?, 'nope', '')")
            .bind(SETTINGS_KEY)
            .execute(&pool)
            .await
            .unwrap();

        let repo = SqliteSettingsRepository::new(pool);
        assert!(matches!(
            repo.load().await,
            Err(RepositoryError::Serialization(_))
        ));
    }
}
