//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process spawning details
//! - Traits are minimal and CRUD-focused for repositories
//! - Intent-based methods for process control (start/stop, not spawn/kill)

pub mod clipboard;
pub mod log_sink;
pub mod log_stream;
pub mod process_control;
pub mod scratch_repository;
pub mod settings_repository;
pub mod ui_preferences_repository;

use std::sync::Arc;
use thiserror::Error;

pub use clipboard::{Clipboard, ClipboardError, NoopClipboard};
pub use log_sink::{DevServerLogSink, NoopLogSink};
pub use log_stream::{LogLineStream, LogStreamReader};
pub use process_control::DevServerControl;
pub use scratch_repository::ScratchRepository;
pub use settings_repository::SettingsRepository;
pub use ui_preferences_repository::UiPreferencesRepository;

/// Container for all repository trait objects.
///
/// This struct provides a consistent way to wire repositories across adapters
/// without coupling them to concrete implementations.
#[derive(Clone)]
pub struct Repos {
    /// Scratch repository for preview URL overrides.
    pub scratch: Arc<dyn ScratchRepository>,
    /// Settings repository for preview settings.
    pub settings: Arc<dyn SettingsRepository>,
    /// UI preference repository.
    pub ui_preferences: Arc<dyn UiPreferencesRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        scratch: Arc<dyn ScratchRepository>,
        settings: Arc<dyn SettingsRepository>,
        ui_preferences: Arc<dyn UiPreferencesRepository>,
    ) -> Self {
        Self {
            scratch,
            settings,
            ui_preferences,
        }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Domain-specific errors for dev-server process control.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Failed to start the process.
    #[error("Failed to start: {0}")]
    StartFailed(String),

    /// Failed to stop the process.
    #[error("Failed to stop: {0}")]
    StopFailed(String),

    /// The workspace has no registered dev server.
    #[error("Unknown workspace: {0}")]
    UnknownWorkspace(String),

    /// Configuration error (e.g. blank dev script).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal process error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core error type for semantic domain errors.
///
/// This is the canonical error type used across the core domain.
/// Adapters should map this to their own error types (CLI exit codes, etc.).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Process operation failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// URL pattern compilation error.
    #[error(transparent)]
    Pattern(#[from] crate::services::UrlPatternError),

    /// Validation error (invalid input or missing required context).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}
