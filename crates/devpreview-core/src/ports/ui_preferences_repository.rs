//! UI preferences repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::UiPreferences;

/// Repository for persisted UI preferences.
#[async_trait]
pub trait UiPreferencesRepository: Send + Sync {
    /// Load preferences, defaults if none are stored.
    async fn load(&self) -> Result<UiPreferences, RepositoryError>;

    /// Save preferences.
    async fn save(&self, preferences: &UiPreferences) -> Result<(), RepositoryError>;
}
