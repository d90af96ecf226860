//! Dev-server orchestration.
//!
//! One live dev server per workspace. Each spawned child is owned by a
//! waiter task that either sees the process exit on its own or, when its
//! stop token is cancelled, shuts it down gracefully. Status changes are
//! recorded in the process table and broadcast as [`DevServerEvent`]s.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use devpreview_core::domain::now_ms;
use devpreview_core::{
    DevServerControl, DevServerLogSink, DevServerProcess, LogStream, ProcessError, ProcessStatus,
};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::broadcaster::DevServerEventBroadcaster;
use super::events::DevServerEvent;
use super::logs::ServerLogManager;
use super::shutdown::{DEFAULT_GRACE_PERIOD, shutdown_child};
use super::spawn_stream_reader;
use super::types::DevServerSpec;
use crate::command::build_command;

/// How long to wait for output readers after the process exits.
const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

struct ProcessEntry {
    info: DevServerProcess,
    stop: CancellationToken,
    waiter: Option<JoinHandle<()>>,
}

type Entries = HashMap<String, Vec<ProcessEntry>>;
type ProcessTable = Arc<Mutex<Entries>>;

fn lock(table: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawns and supervises dev servers.
pub struct DevServerManager {
    specs: RwLock<HashMap<String, DevServerSpec>>,
    processes: ProcessTable,
    logs: Arc<ServerLogManager>,
    events: Arc<DevServerEventBroadcaster>,
    grace: Duration,
    next_id: AtomicU64,
}

impl DevServerManager {
    pub fn new(logs: Arc<ServerLogManager>, events: Arc<DevServerEventBroadcaster>) -> Self {
        Self {
            specs: RwLock::new(HashMap::new()),
            processes: Arc::new(Mutex::new(HashMap::new())),
            logs,
            events,
            grace: DEFAULT_GRACE_PERIOD,
            next_id: AtomicU64::new(1),
        }
    }

    /// Override the SIGTERM grace period.
    #[must_use]
    pub const fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Register (or replace) how a workspace's dev server is run.
    pub fn register(&self, spec: DevServerSpec) {
        debug!(workspace_id = %spec.workspace_id, script = %spec.script, "Registered dev server");
        self.specs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(spec.workspace_id.clone(), spec);
    }

    pub fn spec(&self, workspace_id: &str) -> Option<DevServerSpec> {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(workspace_id)
            .cloned()
    }

    pub fn logs(&self) -> &Arc<ServerLogManager> {
        &self.logs
    }

    pub fn events(&self) -> &Arc<DevServerEventBroadcaster> {
        &self.events
    }

    /// Stop every live dev server.
    pub async fn stop_all(&self) {
        let workspaces: Vec<String> = lock(&self.processes).keys().cloned().collect();
        for workspace_id in workspaces {
            if let Err(e) = self.stop(&workspace_id).await {
                warn!(workspace_id = %workspace_id, error = %e, "Failed to stop dev server");
            }
        }
    }

    fn allocate_ids(&self) -> (String, String) {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        (format!("devserver-{n}"), format!("run-{}-{n}", now_ms()))
    }

    fn spawn_child(
        &self,
        spec: &DevServerSpec,
        process_id: &str,
    ) -> Result<(Child, Vec<JoinHandle<()>>), ProcessError> {
        let mut child = build_command(spec)
            .spawn()
            .map_err(|e| ProcessError::StartFailed(format!("{}: {e}", spec.script)))?;

        let sink: Arc<dyn DevServerLogSink> = self.logs.clone();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_stream_reader(
                stdout,
                process_id.to_string(),
                LogStream::Stdout,
                Arc::clone(&sink),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_stream_reader(
                stderr,
                process_id.to_string(),
                LogStream::Stderr,
                sink,
            ));
        }
        Ok((child, readers))
    }
}

/// Record a status change and broadcast it.
fn transition(
    table: &ProcessTable,
    events: &DevServerEventBroadcaster,
    process_id: &str,
    status: ProcessStatus,
    exit_code: Option<i32>,
) {
    let updated = {
        let mut table = lock(table);
        table
            .values_mut()
            .flat_map(|entries| entries.iter_mut())
            .find(|entry| entry.info.id == process_id)
            .map(|entry| {
                entry.info.status = status;
                entry.info.exit_code = exit_code;
                entry.info.clone()
            })
    };
    if let Some(info) = updated {
        events.broadcast(DevServerEvent::for_process(&info));
    }
}

/// Own the child until it exits or a stop is requested.
async fn supervise(
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    process_id: String,
    stop: CancellationToken,
    grace: Duration,
    table: ProcessTable,
    events: Arc<DevServerEventBroadcaster>,
) {
    let (exit, requested) = tokio::select! {
        status = child.wait() => (status, false),
        () = stop.cancelled() => (shutdown_child(&mut child, grace).await, true),
    };

    let (status, exit_code) = match exit {
        Ok(exit) if requested || exit.success() => (ProcessStatus::Stopped, exit.code()),
        Ok(exit) => (ProcessStatus::Failed, exit.code()),
        Err(e) => {
            error!(process_id = %process_id, error = %e, "Failed to reap dev server");
            (
                if requested {
                    ProcessStatus::Stopped
                } else {
                    ProcessStatus::Failed
                },
                None,
            )
        }
    };

    // The tail of the output must land before the exit is reported
    let drain = futures_util::future::join_all(readers);
    if tokio::time::timeout(READER_DRAIN_TIMEOUT, drain).await.is_err() {
        debug!(process_id = %process_id, "Output readers still open after exit");
    }

    match status {
        ProcessStatus::Failed => warn!(process_id = %process_id, ?exit_code, "Dev server failed"),
        _ => info!(process_id = %process_id, ?exit_code, "Dev server stopped"),
    }
    transition(&table, &events, &process_id, status, exit_code);
}

#[async_trait]
impl DevServerControl for DevServerManager {
    async fn start(&self, workspace_id: &str) -> Result<DevServerProcess, ProcessError> {
        let spec = self
            .spec(workspace_id)
            .ok_or_else(|| ProcessError::UnknownWorkspace(workspace_id.to_string()))?;
        if !spec.has_script() {
            return Err(ProcessError::Configuration(format!(
                "workspace {workspace_id} has no dev server script"
            )));
        }

        let (process_id, session_id) = self.allocate_ids();
        let stop = CancellationToken::new();
        let (starting, finished) = {
            let mut table = lock(&self.processes);
            let entries = table.entry(workspace_id.to_string()).or_default();
            if let Some(live) = entries.iter().find(|e| e.info.is_live()) {
                debug!(workspace_id = %workspace_id, process_id = %live.info.id, "Dev server already running");
                return Ok(live.info.clone());
            }

            // Only the newest run is kept; earlier ones have already exited
            let finished: Vec<String> = entries.drain(..).map(|e| e.info.id).collect();

            let info = DevServerProcess {
                id: process_id.clone(),
                workspace_id: workspace_id.to_string(),
                status: ProcessStatus::Starting,
                session_id,
                started_at: now_ms(),
                exit_code: None,
            };
            entries.push(ProcessEntry {
                info: info.clone(),
                stop: stop.clone(),
                waiter: None,
            });
            (info, finished)
        };
        for old_id in &finished {
            self.logs.clear_logs(old_id);
        }
        if !finished.is_empty() {
            debug!(workspace_id = %workspace_id, pruned = finished.len(), "Pruned finished dev servers");
        }
        self.events.broadcast(DevServerEvent::for_process(&starting));
        self.logs.init_process(&process_id);

        let (child, readers) = match self.spawn_child(&spec, &process_id) {
            Ok(spawned) => spawned,
            Err(e) => {
                error!(workspace_id = %workspace_id, error = %e, "Failed to spawn dev server");
                transition(&self.processes, &self.events, &process_id, ProcessStatus::Failed, None);
                return Err(e);
            }
        };

        info!(
            workspace_id = %workspace_id,
            process_id = %process_id,
            pid = ?child.id(),
            "Dev server started"
        );
        transition(&self.processes, &self.events, &process_id, ProcessStatus::Running, None);

        let waiter = tokio::spawn(supervise(
            child,
            readers,
            process_id.clone(),
            stop,
            self.grace,
            Arc::clone(&self.processes),
            Arc::clone(&self.events),
        ));

        let mut table = lock(&self.processes);
        let entry = table
            .get_mut(workspace_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.info.id == process_id))
            .ok_or_else(|| ProcessError::Internal(format!("process {process_id} vanished")))?;
        entry.waiter = Some(waiter);
        Ok(entry.info.clone())
    }

    async fn stop(&self, workspace_id: &str) -> Result<(), ProcessError> {
        let waiters: Vec<(String, JoinHandle<()>)> = {
            let mut table = lock(&self.processes);
            table
                .get_mut(workspace_id)
                .map(|entries| {
                    entries
                        .iter_mut()
                        .filter(|e| e.info.is_live())
                        .filter_map(|e| {
                            e.stop.cancel();
                            e.waiter.take().map(|w| (e.info.id.clone(), w))
                        })
                        .collect()
                })
                .unwrap_or_default()
        };

        if waiters.is_empty() {
            debug!(workspace_id = %workspace_id, "No dev server to stop");
            return Ok(());
        }

        for (process_id, waiter) in waiters {
            info!(workspace_id = %workspace_id, process_id = %process_id, "Stopping dev server");
            waiter
                .await
                .map_err(|e| ProcessError::StopFailed(format!("{process_id}: {e}")))?;
        }
        Ok(())
    }

    async fn processes(&self, workspace_id: &str) -> Vec<DevServerProcess> {
        lock(&self.processes)
            .get(workspace_id)
            .map(|entries| entries.iter().map(|e| e.info.clone()).collect())
            .unwrap_or_default()
    }
}

impl Drop for DevServerManager {
    fn drop(&mut self) {
        // Children are spawned with kill_on_drop; cancel so waiters reap them
        for entry in lock(&self.processes).values().flatten() {
            entry.stop.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> DevServerManager {
        DevServerManager::new(
            Arc::new(ServerLogManager::new()),
            Arc::new(DevServerEventBroadcaster::new()),
        )
    }

    #[tokio::test]
    async fn test_unknown_workspace() {
        let manager = manager();
        assert!(matches!(
            manager.start("missing").await,
            Err(ProcessError::UnknownWorkspace(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_script_is_configuration_error() {
        let manager = manager();
        manager.register(DevServerSpec::new("ws", "   "));
        assert!(matches!(
            manager.start("ws").await,
            Err(ProcessError::Configuration(_))
        ));
        assert!(manager.processes("ws").await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_without_process_is_noop() {
        let manager = manager();
        assert!(manager.stop("ws").await.is_ok());
    }
}
