//! Preview settings service.

use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{PreviewSettings, PreviewSettingsUpdate, validate_settings};
use std::sync::Arc;

/// Validating front for the settings repository.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Current settings, defaults when nothing is stored.
    pub async fn get(&self) -> Result<PreviewSettings, CoreError> {
        self.repo.load().await.map_err(CoreError::from)
    }

    /// Apply a partial update. Nothing is saved if the result is invalid.
    pub async fn update(&self, update: PreviewSettingsUpdate) -> Result<PreviewSettings, CoreError> {
        let mut current = self.repo.load().await?;
        current.merge(&update);
        validate_settings(&current)?;
        self.repo.save(&current).await?;
        Ok(current)
    }

    pub async fn save(&self, settings: &PreviewSettings) -> Result<(), CoreError> {
        validate_settings(settings)?;
        self.repo.save(settings).await.map_err(CoreError::from)
    }
}
