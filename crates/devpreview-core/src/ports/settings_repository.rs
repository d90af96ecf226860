//! Settings repository trait definition.
//!
//! This port defines the interface for preview settings persistence.

use async_trait::async_trait;

use super::RepositoryError;
use crate::settings::PreviewSettings;

/// Repository for preview settings persistence.
///
/// Implementation handles serialization internally.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings.
    ///
    /// Returns default settings if none are stored.
    async fn load(&self) -> Result<PreviewSettings, RepositoryError>;

    /// Save settings.
    async fn save(&self, settings: &PreviewSettings) -> Result<(), RepositoryError>;
}
