//! Preview URL and mode resolution.
//!
//! [`PreviewResolver`] is the synchronous state machine behind a preview. It
//! holds the latest detection, the override, the process list and the
//! advisory flags, and derives a [`PreviewSnapshot`] from them. It owns no
//! timers or tasks; [`super::PreviewSession`] drives it.

use crate::domain::{DetectedUrlInfo, DevServerProcess, PreviewMode, PreviewSnapshot, ProcessStatus};

/// Query parameter used to force the preview frame to reload.
pub const REFRESH_PARAM: &str = "_refresh";

/// The URL the preview should load: a non-blank override, else the detection.
pub fn effective_url<'a>(
    override_url: Option<&'a str>,
    detected: Option<&'a DetectedUrlInfo>,
) -> Option<&'a str> {
    override_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| detected.map(|d| d.url.as_str()))
}

/// Preview mode for the given inputs.
pub const fn resolve_mode(has_effective_url: bool, has_live_process: bool, load_error: bool) -> PreviewMode {
    if load_error {
        PreviewMode::Error
    } else if has_effective_url && has_live_process {
        PreviewMode::Ready
    } else if has_live_process {
        PreviewMode::Searching
    } else {
        PreviewMode::NoServer
    }
}

/// Append the cache-busting refresh parameter to `url`.
///
/// The parameter goes before any `#fragment`.
pub fn frame_url(url: &str, refresh_key: u64) -> String {
    let (base, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{REFRESH_PARAM}={refresh_key}{fragment}")
}

/// Pick the process whose logs feed URL detection.
///
/// The first running process wins, falling back to the first starting one.
pub fn primary_process(processes: &[DevServerProcess]) -> Option<&DevServerProcess> {
    processes
        .iter()
        .find(|p| p.status == ProcessStatus::Running)
        .or_else(|| processes.iter().find(|p| p.status == ProcessStatus::Starting))
}

/// Mutable preview state for one workspace.
#[derive(Debug, Clone, Default)]
pub struct PreviewResolver {
    workspace_id: String,
    detected: Option<DetectedUrlInfo>,
    override_url: Option<String>,
    processes: Vec<DevServerProcess>,
    load_error: bool,
    preview_ready: bool,
    refresh_key: u64,
    show_help: bool,
    show_logs: bool,
    is_starting: bool,
    is_stopping: bool,
}

impl PreviewResolver {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            ..Self::default()
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Current effective URL.
    pub fn effective_url(&self) -> Option<&str> {
        effective_url(self.override_url.as_deref(), self.detected.as_ref())
    }

    /// Whether any process is starting or running.
    pub fn has_live_process(&self) -> bool {
        self.processes.iter().any(DevServerProcess::is_live)
    }

    /// Current mode.
    pub fn mode(&self) -> PreviewMode {
        resolve_mode(
            self.effective_url().is_some(),
            self.has_live_process(),
            self.load_error,
        )
    }

    pub fn is_ready(&self) -> bool {
        self.mode() == PreviewMode::Ready
    }

    pub const fn refresh_key(&self) -> u64 {
        self.refresh_key
    }

    pub const fn show_help(&self) -> bool {
        self.show_help
    }

    pub const fn preview_ready(&self) -> bool {
        self.preview_ready
    }

    pub fn primary_process_id(&self) -> Option<&str> {
        primary_process(&self.processes).map(|p| p.id.as_str())
    }

    /// Record a new detection from the primary process's logs.
    pub fn set_detected(&mut self, detected: Option<DetectedUrlInfo>) {
        self.detected = detected;
        self.reconcile();
    }

    /// Set or clear the manual override. Blank values clear it.
    pub fn set_override(&mut self, url: Option<&str>) {
        self.override_url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        self.reconcile();
    }

    /// Replace the process list.
    pub fn set_processes(&mut self, processes: Vec<DevServerProcess>) {
        self.processes = processes;
        self.reconcile();
    }

    /// An explicit start was requested.
    pub fn begin_start(&mut self) {
        self.is_starting = true;
        self.show_help = false;
        self.preview_ready = false;
    }

    pub fn finish_start(&mut self) {
        self.is_starting = false;
    }

    pub fn begin_stop(&mut self) {
        self.is_stopping = true;
    }

    /// A stop finished. A successful stop clears the error and the advisory.
    pub fn finish_stop(&mut self, succeeded: bool) {
        self.is_stopping = false;
        if succeeded {
            self.load_error = false;
            self.show_help = false;
        }
    }

    /// The embedding surface failed to load the preview.
    pub fn report_load_error(&mut self) {
        self.load_error = true;
    }

    /// The embedding surface loaded the preview. Closes the advisory and
    /// the log panel it opened.
    pub fn report_preview_ready(&mut self) {
        self.preview_ready = true;
        self.show_help = false;
        self.show_logs = false;
    }

    /// Clear any load error and bump the cache-busting key.
    pub fn refresh(&mut self) {
        self.load_error = false;
        self.refresh_key += 1;
        self.reconcile();
    }

    pub fn toggle_logs(&mut self) -> bool {
        self.show_logs = !self.show_logs;
        self.show_logs
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    /// The slow-start timer fired.
    ///
    /// Shows the advisory and opens the logs if the preview is still not
    /// ready while a process is live. Returns whether the advisory was shown.
    pub fn slow_start_elapsed(&mut self) -> bool {
        if self.is_ready() || self.preview_ready || !self.has_live_process() {
            return false;
        }
        self.show_help = true;
        self.show_logs = true;
        true
    }

    /// Hide the advisory once the preview is ready.
    fn reconcile(&mut self) {
        if self.is_ready() {
            self.show_help = false;
        }
    }

    /// Snapshot for the presentation layer.
    pub fn snapshot(&self) -> PreviewSnapshot {
        let effective = self.effective_url().map(str::to_string);
        PreviewSnapshot {
            workspace_id: self.workspace_id.clone(),
            mode: self.mode(),
            frame_url: effective.as_deref().map(|url| frame_url(url, self.refresh_key)),
            effective_url: effective,
            detected: self.detected.clone(),
            override_url: self.override_url.clone(),
            refresh_key: self.refresh_key,
            show_help: self.show_help,
            show_logs: self.show_logs,
            is_starting: self.is_starting,
            is_stopping: self.is_stopping,
            processes: self.processes.clone(),
            primary_process_id: self.primary_process_id().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(id: &str, status: ProcessStatus) -> DevServerProcess {
        DevServerProcess {
            id: id.to_string(),
            workspace_id: "ws".to_string(),
            status,
            session_id: "s1".to_string(),
            started_at: 0,
            exit_code: None,
        }
    }

    fn detected(url: &str) -> DetectedUrlInfo {
        DetectedUrlInfo {
            url: url.to_string(),
            matched_at: 1,
        }
    }

    #[test]
    fn test_effective_url_prefers_non_blank_override() {
        let d = detected("http://localhost:4000");
        assert_eq!(
            effective_url(Some("http://example.com"), Some(&d)),
            Some("http://example.com")
        );
        assert_eq!(effective_url(Some("  "), Some(&d)), Some("http://localhost:4000"));
        assert_eq!(effective_url(None, None), None);
    }

    #[test]
    fn test_mode_table() {
        assert_eq!(resolve_mode(true, true, false), PreviewMode::Ready);
        assert_eq!(resolve_mode(false, true, false), PreviewMode::Searching);
        assert_eq!(resolve_mode(true, false, false), PreviewMode::NoServer);
        assert_eq!(resolve_mode(false, false, false), PreviewMode::NoServer);
        assert_eq!(resolve_mode(true, true, true), PreviewMode::Error);
    }

    #[test]
    fn test_frame_url() {
        assert_eq!(frame_url("http://localhost:3000", 2), "http://localhost:3000?_refresh=2");
        assert_eq!(
            frame_url("http://localhost:3000/?a=1", 0),
            "http://localhost:3000/?a=1&_refresh=0"
        );
        assert_eq!(
            frame_url("http://localhost:3000/app#top", 1),
            "http://localhost:3000/app?_refresh=1#top"
        );
    }

    #[test]
    fn test_primary_process_prefers_running() {
        let processes = vec![
            process("p1", ProcessStatus::Stopped),
            process("p2", ProcessStatus::Starting),
            process("p3", ProcessStatus::Running),
        ];
        assert_eq!(primary_process(&processes).unwrap().id, "p3");
        assert_eq!(primary_process(&processes[..2]).unwrap().id, "p2");
        assert!(primary_process(&processes[..1]).is_none());
    }

    #[test]
    fn test_initial_state_is_no_server() {
        let resolver = PreviewResolver::new("ws");
        assert_eq!(resolver.mode(), PreviewMode::NoServer);
        assert_eq!(resolver.snapshot().refresh_key, 0);
    }

    #[test]
    fn test_start_detect_ready() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        assert_eq!(resolver.mode(), PreviewMode::Searching);

        resolver.set_detected(Some(detected("http://localhost:4000")));
        assert_eq!(resolver.mode(), PreviewMode::Ready);
        assert_eq!(resolver.effective_url(), Some("http://localhost:4000"));
    }

    #[test]
    fn test_refresh_in_ready_keeps_url() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        resolver.set_detected(Some(detected("http://localhost:4000")));

        let before = resolver.snapshot();
        resolver.refresh();
        let after = resolver.snapshot();

        assert_eq!(after.mode, PreviewMode::Ready);
        assert_eq!(after.effective_url, before.effective_url);
        assert_eq!(after.refresh_key, before.refresh_key + 1);
        assert_ne!(after.frame_url, before.frame_url);
    }

    #[test]
    fn test_load_error_then_refresh() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        resolver.set_detected(Some(detected("http://localhost:4000")));
        resolver.report_load_error();
        assert_eq!(resolver.mode(), PreviewMode::Error);

        resolver.refresh();
        assert_eq!(resolver.mode(), PreviewMode::Ready);
        assert_eq!(resolver.refresh_key(), 1);
    }

    #[test]
    fn test_stop_clears_error_and_help() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        assert!(resolver.slow_start_elapsed());
        resolver.report_load_error();

        resolver.begin_stop();
        resolver.finish_stop(true);
        resolver.set_processes(vec![process("p1", ProcessStatus::Stopped)]);

        assert_eq!(resolver.mode(), PreviewMode::NoServer);
        assert!(!resolver.show_help());
    }

    #[test]
    fn test_slow_start_requires_live_unready_process() {
        let mut resolver = PreviewResolver::new("ws");
        assert!(!resolver.slow_start_elapsed());

        resolver.set_processes(vec![process("p1", ProcessStatus::Starting)]);
        resolver.report_preview_ready();
        assert!(!resolver.slow_start_elapsed());

        resolver.begin_start();
        assert!(resolver.slow_start_elapsed());
        assert!(resolver.snapshot().show_logs);
    }

    #[test]
    fn test_preview_ready_closes_logs_opened_by_advisory() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        resolver.begin_start();
        assert!(resolver.slow_start_elapsed());
        assert!(resolver.snapshot().show_logs);

        resolver.report_preview_ready();
        let snap = resolver.snapshot();
        assert!(!snap.show_logs);
        assert!(!snap.show_help);
    }

    #[test]
    fn test_ready_hides_shown_help() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        assert!(resolver.slow_start_elapsed());
        assert!(resolver.show_help());

        resolver.set_detected(Some(detected("http://localhost:4000")));
        assert!(!resolver.show_help());
    }

    #[test]
    fn test_override_with_detection() {
        let mut resolver = PreviewResolver::new("ws");
        resolver.set_processes(vec![process("p1", ProcessStatus::Running)]);
        resolver.set_detected(Some(detected("http://localhost:4000")));
        resolver.set_override(Some("http://example.com"));
        assert_eq!(resolver.effective_url(), Some("http://example.com"));

        resolver.set_override(None);
        assert_eq!(resolver.effective_url(), Some("http://localhost:4000"));
    }
}
