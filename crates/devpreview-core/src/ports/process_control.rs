//! Dev-server process control port.
//!
//! This port defines the interface for starting and stopping a workspace's
//! dev server. Implementations handle all process lifecycle details internally.

use async_trait::async_trait;

use super::ProcessError;
use crate::domain::DevServerProcess;

/// Port for controlling the dev server of a workspace.
///
/// # Design Rules
///
/// - Intent-based: callers say "start the dev server", not how to spawn it
/// - `start` on a workspace with a live process returns the live process
/// - `stop` on a workspace with nothing running succeeds
#[async_trait]
pub trait DevServerControl: Send + Sync {
    /// Start the workspace's dev server.
    async fn start(&self, workspace_id: &str) -> Result<DevServerProcess, ProcessError>;

    /// Stop every live dev-server process of the workspace.
    async fn stop(&self, workspace_id: &str) -> Result<(), ProcessError>;

    /// All known dev-server processes of the workspace, oldest first.
    async fn processes(&self, workspace_id: &str) -> Vec<DevServerProcess>;
}
