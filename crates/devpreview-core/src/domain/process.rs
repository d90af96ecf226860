//! Dev-server process types.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a dev-server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// Spawn requested, process not yet confirmed
    Starting,
    /// Process is alive
    Running,
    /// Process exited unsuccessfully
    Failed,
    /// Process exited cleanly or was stopped on request
    Stopped,
}

impl ProcessStatus {
    /// Whether the process is starting or running.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }

    /// Convert status to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

/// A dev-server process owned by the process runtime.
///
/// The preview flow only reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerProcess {
    pub id: String,
    pub workspace_id: String,
    pub status: ProcessStatus,
    /// Identifier of the run that spawned this process
    pub session_id: String,
    /// Unix timestamp in milliseconds
    pub started_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl DevServerProcess {
    /// Whether the process is starting or running.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.status.is_live()
    }
}

/// A repository attached to a workspace, as far as the preview cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRepo {
    pub id: String,
    pub display_name: String,
    pub dev_server_script: Option<String>,
}

impl WorkspaceRepo {
    /// Whether this repo has a non-blank dev server script.
    #[must_use]
    pub fn has_dev_script(&self) -> bool {
        self.dev_server_script
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// Whether any repo in the workspace can start a dev server.
pub fn has_dev_script(repos: &[WorkspaceRepo]) -> bool {
    repos.iter().any(WorkspaceRepo::has_dev_script)
}
