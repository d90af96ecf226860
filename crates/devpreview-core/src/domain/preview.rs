//! Preview state published to the presentation layer.

use serde::{Deserialize, Serialize};

use super::{DevServerProcess, DetectedUrlInfo};

/// What the preview surface should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreviewMode {
    /// An effective URL is available and has not failed to load
    Ready,
    /// The embedding surface reported a load failure
    Error,
    /// A dev server is live but no URL is known yet
    Searching,
    /// No dev server is live
    #[default]
    NoServer,
}

impl PreviewMode {
    /// Convert mode to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Searching => "searching",
            Self::NoServer => "noServer",
        }
    }
}

/// Everything the presentation layer needs to render a preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSnapshot {
    pub workspace_id: String,
    pub mode: PreviewMode,
    /// Override if set, else the detected URL
    pub effective_url: Option<String>,
    /// Effective URL with the cache-busting refresh parameter
    pub frame_url: Option<String>,
    pub detected: Option<DetectedUrlInfo>,
    pub override_url: Option<String>,
    /// Incremented by every refresh
    pub refresh_key: u64,
    pub show_help: bool,
    pub show_logs: bool,
    pub is_starting: bool,
    pub is_stopping: bool,
    pub processes: Vec<DevServerProcess>,
    /// Id of the process whose logs feed URL detection
    pub primary_process_id: Option<String>,
}

impl PreviewSnapshot {
    /// Whether any process is starting or running.
    #[must_use]
    pub fn has_live_process(&self) -> bool {
        self.processes.iter().any(DevServerProcess::is_live)
    }
}
