//! Dev-server lifecycle events.

use devpreview_core::domain::now_ms;
use devpreview_core::{DevServerProcess, ProcessStatus};
use serde::{Deserialize, Serialize};

/// State of one dev-server process at the time of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerStateInfo {
    pub workspace_id: String,
    pub process_id: String,
    pub status: ProcessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Unix timestamp in milliseconds when this state was recorded
    pub updated_at: u64,
}

impl From<&DevServerProcess> for DevServerStateInfo {
    fn from(process: &DevServerProcess) -> Self {
        Self {
            workspace_id: process.workspace_id.clone(),
            process_id: process.id.clone(),
            status: process.status,
            exit_code: process.exit_code,
            updated_at: now_ms(),
        }
    }
}

/// Lifecycle event, one variant per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DevServerEvent {
    Starting(DevServerStateInfo),
    Running(DevServerStateInfo),
    Stopped(DevServerStateInfo),
    Failed(DevServerStateInfo),
}

impl DevServerEvent {
    /// Event describing the process's current status.
    pub fn for_process(process: &DevServerProcess) -> Self {
        let info = DevServerStateInfo::from(process);
        match process.status {
            ProcessStatus::Starting => Self::Starting(info),
            ProcessStatus::Running => Self::Running(info),
            ProcessStatus::Stopped => Self::Stopped(info),
            ProcessStatus::Failed => Self::Failed(info),
        }
    }

    pub const fn info(&self) -> &DevServerStateInfo {
        match self {
            Self::Starting(info) | Self::Running(info) | Self::Stopped(info) | Self::Failed(info) => {
                info
            }
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.info().workspace_id
    }

    /// Whether the process is gone after this event.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_) | Self::Failed(_))
    }
}
