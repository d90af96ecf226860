//! Shared types for process management.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How to run a workspace's dev server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerSpec {
    pub workspace_id: String,
    /// Directory the script runs in, the current directory when `None`
    pub working_dir: Option<PathBuf>,
    /// Shell script, e.g. `npm run dev`
    pub script: String,
    /// Extra environment variables
    #[serde(default)]
    pub env: Vec<(String, String)>,
}

impl DevServerSpec {
    pub fn new(workspace_id: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            working_dir: None,
            script: script.into(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Whether the script has anything to run.
    pub fn has_script(&self) -> bool {
        !self.script.trim().is_empty()
    }
}
