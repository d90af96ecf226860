//! Settings domain types and validation.
//!
//! This module contains the preview configuration used across the workspace.
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::UrlPatternSet;

/// Default debounce window for override persistence.
pub const DEFAULT_OVERRIDE_DEBOUNCE_MS: u64 = 300;

/// Default delay before the slow-start advisory fires.
pub const DEFAULT_SLOW_START_SECS: u64 = 5;

/// Default number of log lines kept per process.
pub const DEFAULT_LOG_BUFFER_LINES: usize = 5000;

/// Built-in "server is listening" patterns.
///
/// Each pattern captures the URL in a group named `url`.
pub fn default_url_patterns() -> Vec<String> {
    [
        // Vite, Next.js, Astro, SvelteKit: "➜  Local:   http://localhost:5173/"
        r"(?i)\blocal:\s+(?P<url>https?://\S+)",
        // webpack-dev-server: "Project is running at: http://localhost:8080/"
        r"(?i)\bproject is running at:?\s+(?P<url>https?://\S+)",
        // Express, Rails, Django, generic banners
        r"(?i)\b(?:listening|running|ready|started|serving|available|live)\b.*?\b(?:on|at)\b:?\s+(?P<url>https?://\S+)",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Preview settings.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewSettings {
    /// Debounce window for override persistence, in milliseconds.
    pub override_debounce_ms: Option<u64>,

    /// Seconds after a start before the slow-start advisory fires.
    pub slow_start_secs: Option<u64>,

    /// Log lines kept per dev-server process.
    pub log_buffer_lines: Option<usize>,

    /// URL recognition patterns. Each must contain a `url` capture group.
    pub url_patterns: Option<Vec<String>>,
}

impl PreviewSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            override_debounce_ms: Some(DEFAULT_OVERRIDE_DEBOUNCE_MS),
            slow_start_secs: Some(DEFAULT_SLOW_START_SECS),
            log_buffer_lines: Some(DEFAULT_LOG_BUFFER_LINES),
            url_patterns: Some(default_url_patterns()),
        }
    }

    /// Effective override debounce window.
    #[must_use]
    pub fn override_debounce(&self) -> Duration {
        Duration::from_millis(
            self.override_debounce_ms
                .unwrap_or(DEFAULT_OVERRIDE_DEBOUNCE_MS),
        )
    }

    /// Effective slow-start delay.
    #[must_use]
    pub fn slow_start(&self) -> Duration {
        Duration::from_secs(self.slow_start_secs.unwrap_or(DEFAULT_SLOW_START_SECS))
    }

    /// Effective log buffer size.
    #[must_use]
    pub fn effective_log_buffer_lines(&self) -> usize {
        self.log_buffer_lines.unwrap_or(DEFAULT_LOG_BUFFER_LINES)
    }

    /// Effective URL patterns (defaults when unset).
    #[must_use]
    pub fn effective_url_patterns(&self) -> Vec<String> {
        self.url_patterns
            .clone()
            .unwrap_or_else(default_url_patterns)
    }

    /// Merge an update into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &PreviewSettingsUpdate) {
        if let Some(ref ms) = other.override_debounce_ms {
            self.override_debounce_ms = *ms;
        }
        if let Some(ref secs) = other.slow_start_secs {
            self.slow_start_secs = *secs;
        }
        if let Some(ref lines) = other.log_buffer_lines {
            self.log_buffer_lines = *lines;
        }
        if let Some(ref patterns) = other.url_patterns {
            self.url_patterns.clone_from(patterns);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewSettingsUpdate {
    pub override_debounce_ms: Option<Option<u64>>,
    pub slow_start_secs: Option<Option<u64>>,
    pub log_buffer_lines: Option<Option<usize>>,
    pub url_patterns: Option<Option<Vec<String>>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Override debounce must be at most 10000 ms, got {0}")]
    InvalidDebounce(u64),

    #[error("Slow-start delay must be between 1 and 600 seconds, got {0}")]
    InvalidSlowStart(u64),

    #[error("Log buffer must hold between 100 and 100,000 lines, got {0}")]
    InvalidLogBuffer(usize),

    #[error("At least one URL pattern is required")]
    NoUrlPatterns,

    #[error("Invalid URL pattern: {0}")]
    InvalidUrlPattern(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &PreviewSettings) -> Result<(), SettingsError> {
    if let Some(ms) = settings.override_debounce_ms {
        if ms > 10_000 {
            return Err(SettingsError::InvalidDebounce(ms));
        }
    }

    if let Some(secs) = settings.slow_start_secs {
        if !(1..=600).contains(&secs) {
            return Err(SettingsError::InvalidSlowStart(secs));
        }
    }

    if let Some(lines) = settings.log_buffer_lines {
        if !(100..=100_000).contains(&lines) {
            return Err(SettingsError::InvalidLogBuffer(lines));
        }
    }

    if let Some(patterns) = &settings.url_patterns {
        if patterns.is_empty() {
            return Err(SettingsError::NoUrlPatterns);
        }
        UrlPatternSet::compile(patterns)
            .map_err(|e| SettingsError::InvalidUrlPattern(e.to_string()))?;
    }

    Ok(())
}
