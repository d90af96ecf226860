//! Core domain types, ports and services for devpreview.
//!
//! This crate owns the preview URL resolution flow:
//!
//! - [`services::url_extractor`] scans dev-server logs for a listening URL
//! - [`services::override_store`] persists per-workspace manual URL overrides
//! - [`services::preview_resolver`] combines both with process state
//! - [`services::preview_session`] owns timers and subscriptions for one workspace
//!
//! Infrastructure (SQLite, process spawning, clipboard) lives behind the
//! traits in [`ports`] and is implemented by adapter crates.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    ContextBarPosition, DetectedUrlInfo, DevServerProcess, LogLine, LogStream, OverrideRecord,
    PaneSize, PreviewMode, PreviewSnapshot, PreviewUrlOverrideData, ProcessStatus, RepoAction,
    Scratch, ScratchPayload, ScratchType, UiPreferences, WorkspaceRepo, has_dev_script,
};
pub use ports::{
    Clipboard, ClipboardError, CoreError, DevServerControl, DevServerLogSink, LogLineStream,
    LogStreamReader, NoopClipboard, NoopLogSink, ProcessError, Repos, RepositoryError,
    ScratchRepository, SettingsRepository, UiPreferencesRepository,
};
pub use services::{
    LogSearch, PreviewDeps, PreviewResolver, PreviewSession, PreviewUrlOverrideStore,
    SettingsService, TrailingDebouncer, UiPreferencesService, UrlExtractor, UrlPatternError,
    UrlPatternSet,
};
pub use settings::{
    DEFAULT_LOG_BUFFER_LINES, DEFAULT_OVERRIDE_DEBOUNCE_MS, DEFAULT_SLOW_START_SECS,
    PreviewSettings, PreviewSettingsUpdate, SettingsError, default_url_patterns,
    validate_settings,
};

// Re-export path utilities
pub use paths::{DATA_DIR_ENV, PathError, data_root, database_path};

// Silence unused dev-dependency warnings for crates only used by some test targets
#[cfg(test)]
use async_stream as _;
#[cfg(test)]
use tempfile as _;
