//! Long-lived preview of one workspace.
//!
//! A [`PreviewSession`] wires the resolver to its inputs: it follows the log
//! stream of the primary dev-server process, feeds the URL extractor, runs
//! the slow-start timer and forwards override edits to the debounced store.
//! Every state change is published as a [`PreviewSnapshot`] on a `watch`
//! channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::override_store::PreviewUrlOverrideStore;
use super::preview_resolver::{PreviewResolver, primary_process};
use super::url_extractor::{UrlExtractor, UrlPatternSet};
use crate::domain::{DevServerProcess, LogLine, PreviewSnapshot};
use crate::ports::{Clipboard, CoreError, DevServerControl, LogStreamReader};
use crate::settings::PreviewSettings;

/// Collaborators of a preview session.
#[derive(Clone)]
pub struct PreviewDeps {
    pub logs: Arc<dyn LogStreamReader>,
    pub overrides: Arc<PreviewUrlOverrideStore>,
    pub control: Arc<dyn DevServerControl>,
    pub clipboard: Arc<dyn Clipboard>,
}

impl PreviewDeps {
    pub fn new(
        logs: Arc<dyn LogStreamReader>,
        overrides: Arc<PreviewUrlOverrideStore>,
        control: Arc<dyn DevServerControl>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            logs,
            overrides,
            control,
            clipboard,
        }
    }
}

struct SessionState {
    resolver: PreviewResolver,
    extractor: UrlExtractor,
    followed: Option<String>,
    follow: Option<CancellationToken>,
    slow_start: Option<CancellationToken>,
    attempt: u64,
    wrote_override: bool,
}

impl SessionState {
    /// Cancel the slow-start timer once the preview is ready.
    fn settle(&mut self) {
        if self.resolver.is_ready() {
            self.cancel_slow_start();
        }
    }

    fn cancel_slow_start(&mut self) {
        if let Some(token) = self.slow_start.take() {
            token.cancel();
            debug!(workspace_id = %self.resolver.workspace_id(), "Slow-start timer cancelled");
        }
    }
}

struct Shared {
    state: Mutex<SessionState>,
    tx: watch::Sender<PreviewSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.tx.send_replace(state.resolver.snapshot());
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock();
        let out = f(&mut state);
        state.settle();
        self.publish(&state);
        out
    }

    fn ingest(&self, process_id: &str, line: &LogLine) {
        let mut state = self.lock();
        if state.followed.as_deref() != Some(process_id) {
            return;
        }
        if state.extractor.push(line).is_none() {
            return;
        }
        let detected = state.extractor.latest().cloned();
        debug!(
            workspace_id = %state.resolver.workspace_id(),
            process_id = %process_id,
            url = ?detected.as_ref().map(|d| d.url.as_str()),
            "Detected dev server URL"
        );
        state.resolver.set_detected(detected);
        state.settle();
        self.publish(&state);
    }

    fn slow_start_elapsed(&self, attempt: u64) {
        let mut state = self.lock();
        if state.attempt != attempt {
            return;
        }
        state.slow_start = None;
        if state.resolver.slow_start_elapsed() {
            info!(
                workspace_id = %state.resolver.workspace_id(),
                "Dev server slow to start, showing help"
            );
            self.publish(&state);
        }
    }
}

/// Preview of one workspace.
///
/// Dropping the session cancels its timers, its log subscription and any
/// override write it left pending.
pub struct PreviewSession {
    workspace_id: String,
    deps: PreviewDeps,
    slow_start: Duration,
    shared: Arc<Shared>,
    root: CancellationToken,
}

impl PreviewSession {
    /// Open the preview of `workspace_id`.
    ///
    /// Loads the persisted override, attaches to the primary process's log
    /// stream and arms the slow-start timer.
    pub async fn open(
        workspace_id: &str,
        deps: PreviewDeps,
        settings: &PreviewSettings,
    ) -> Result<Self, CoreError> {
        if workspace_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "workspace id is required".to_string(),
            ));
        }
        let patterns = UrlPatternSet::compile(&settings.effective_url_patterns())?;

        let override_url = match deps.overrides.get_override(workspace_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!(workspace_id = %workspace_id, error = %e, "Failed to load preview URL override");
                None
            }
        };

        let mut resolver = PreviewResolver::new(workspace_id);
        resolver.set_override(override_url.as_deref());
        let (tx, _rx) = watch::channel(resolver.snapshot());

        let session = Self {
            workspace_id: workspace_id.to_string(),
            deps,
            slow_start: settings.slow_start(),
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState {
                    resolver,
                    extractor: UrlExtractor::new(patterns),
                    followed: None,
                    follow: None,
                    slow_start: None,
                    attempt: 0,
                    wrote_override: false,
                }),
                tx,
            }),
            root: CancellationToken::new(),
        };

        session.arm_slow_start();
        session.sync_processes().await;
        info!(workspace_id = %workspace_id, "Preview session opened");
        Ok(session)
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> PreviewSnapshot {
        self.shared.tx.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<PreviewSnapshot> {
        self.shared.tx.subscribe()
    }

    /// Start the dev server.
    pub async fn start(&self) -> Result<DevServerProcess, CoreError> {
        self.shared.update(|state| state.resolver.begin_start());
        self.arm_slow_start();

        let result = self.deps.control.start(&self.workspace_id).await;
        self.shared.update(|state| state.resolver.finish_start());
        self.sync_processes().await;

        match result {
            Ok(process) => {
                info!(workspace_id = %self.workspace_id, process_id = %process.id, "Dev server started");
                Ok(process)
            }
            Err(e) => {
                error!(workspace_id = %self.workspace_id, error = %e, "Failed to start dev server");
                Err(e.into())
            }
        }
    }

    /// Stop the dev server.
    pub async fn stop(&self) -> Result<(), CoreError> {
        self.shared.update(|state| state.resolver.begin_stop());

        let result = self.deps.control.stop(&self.workspace_id).await;
        self.shared.update(|state| state.resolver.finish_stop(result.is_ok()));
        self.sync_processes().await;

        result.map_err(|e| {
            error!(workspace_id = %self.workspace_id, error = %e, "Failed to stop dev server");
            e.into()
        })
    }

    /// Stop the dev server so its script can be edited.
    pub async fn stop_and_edit(&self) -> Result<(), CoreError> {
        self.stop().await
    }

    /// Reload the preview, clearing any load error.
    pub fn refresh(&self) {
        self.shared.update(|state| state.resolver.refresh());
    }

    pub fn report_load_error(&self) {
        warn!(workspace_id = %self.workspace_id, "Preview failed to load");
        self.shared.update(|state| state.resolver.report_load_error());
    }

    pub fn report_preview_ready(&self) {
        self.shared.update(|state| {
            state.resolver.report_preview_ready();
            state.cancel_slow_start();
        });
    }

    /// Toggle the logs panel. Returns the new visibility.
    pub fn toggle_logs(&self) -> bool {
        self.shared.update(|state| state.resolver.toggle_logs())
    }

    pub fn dismiss_help(&self) {
        self.shared.update(|state| state.resolver.dismiss_help());
    }

    /// Use `url` instead of the detected URL.
    ///
    /// Takes effect immediately; persistence is debounced. A blank URL clears
    /// the override.
    pub async fn set_override_url(&self, url: &str) -> Result<(), CoreError> {
        if url.trim().is_empty() {
            return self.clear_override().await;
        }
        self.shared.update(|state| {
            state.resolver.set_override(Some(url));
            state.wrote_override = true;
        });
        self.deps
            .overrides
            .set_override_url(&self.workspace_id, url)
            .await
    }

    /// Revert to the detected URL and delete the persisted override.
    pub async fn clear_override(&self) -> Result<(), CoreError> {
        self.shared.update(|state| {
            state.resolver.set_override(None);
            state.wrote_override = false;
        });
        self.deps.overrides.clear_override(&self.workspace_id).await
    }

    /// Copy the effective URL to the clipboard.
    ///
    /// Returns whether anything was copied. Clipboard failures are logged.
    pub fn copy_url(&self) -> bool {
        let Some(url) = self.snapshot().effective_url else {
            return false;
        };
        match self.deps.clipboard.write_text(&url) {
            Ok(()) => {
                debug!(workspace_id = %self.workspace_id, url = %url, "Copied preview URL");
                true
            }
            Err(e) => {
                warn!(workspace_id = %self.workspace_id, error = %e, "Failed to copy preview URL");
                false
            }
        }
    }

    /// Re-read the process list and follow the primary process.
    pub async fn sync_processes(&self) {
        let processes = self.deps.control.processes(&self.workspace_id).await;
        self.apply_processes(processes);
    }

    fn apply_processes(&self, processes: Vec<DevServerProcess>) {
        let primary = primary_process(&processes).map(|p| p.id.clone());
        let mut state = self.shared.lock();

        if state.followed != primary {
            if let Some(token) = state.follow.take() {
                token.cancel();
            }
            state.extractor.reset();
            state.resolver.set_detected(None);
            state.followed.clone_from(&primary);
            if let Some(process_id) = primary {
                debug!(workspace_id = %self.workspace_id, process_id = %process_id, "Following dev server logs");
                state.follow = Some(self.spawn_follow(process_id));
            }
        }

        state.resolver.set_processes(processes);
        state.settle();
        self.shared.publish(&state);
    }

    fn spawn_follow(&self, process_id: String) -> CancellationToken {
        let token = self.root.child_token();
        let cancel = token.clone();
        let mut lines = self.deps.logs.subscribe(&process_id);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    next = lines.next() => match next {
                        Some(line) => shared.ingest(&process_id, &line),
                        None => break,
                    },
                }
            }
            debug!(process_id = %process_id, "Stopped following dev server logs");
        });
        token
    }

    fn arm_slow_start(&self) {
        let token = self.root.child_token();
        let attempt = {
            let mut state = self.shared.lock();
            state.cancel_slow_start();
            state.attempt += 1;
            state.slow_start = Some(token.clone());
            state.attempt
        };

        let deadline = tokio::time::Instant::now() + self.slow_start;
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => shared.slow_start_elapsed(attempt),
            }
        });
    }

    /// Close the session.
    ///
    /// Saves a pending override write immediately, then cancels the
    /// slow-start timer and the log subscription.
    pub async fn close(&self) {
        self.root.cancel();
        let wrote = std::mem::take(&mut self.shared.lock().wrote_override);
        if wrote {
            self.deps.overrides.flush(&self.workspace_id).await;
        }
        info!(workspace_id = %self.workspace_id, "Preview session closed");
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        self.root.cancel();
        if self.shared.lock().wrote_override {
            self.deps.overrides.cancel_pending(&self.workspace_id);
        }
    }
}
