//! Rendering of preview snapshots as terminal lines.

use devpreview_core::{LogLine, LogStream, PreviewMode, PreviewSnapshot};

/// Printed when the dev server is live but silent past the slow-start window.
pub const SLOW_START_ADVISORY: &str = "\
Still waiting for a URL. The dev server output is shown below.
If the server is listening, set the URL manually:
    devpreview override set <workspace> http://localhost:<port>";

/// Keys understood by `watch` on stdin.
pub const COMMAND_HINT: &str = "keys: [r]efresh [c]opy [s]tart s[t]op [l]ogs [h]ide help [e]rror [q]uit, \
     /text to search logs then [n]ext [p]rev, then Enter";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Shown {
    status: String,
    refresh_key: u64,
    show_help: bool,
}

impl Shown {
    fn of(snapshot: &PreviewSnapshot, has_dev_script: bool) -> Self {
        Self {
            status: status_line(snapshot, has_dev_script),
            refresh_key: snapshot.refresh_key,
            show_help: snapshot.show_help,
        }
    }
}

/// Turns a stream of snapshots into the lines worth printing.
///
/// Only visible changes produce output: mode, effective URL, reloads and the
/// slow-start advisory.
#[derive(Debug)]
pub struct SnapshotPresenter {
    last: Option<Shown>,
    has_dev_script: bool,
}

impl Default for SnapshotPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPresenter {
    pub fn new() -> Self {
        Self {
            last: None,
            has_dev_script: true,
        }
    }

    /// Render the stopped state as "no dev script" instead of "not running".
    #[must_use]
    pub fn without_dev_script(mut self) -> Self {
        self.has_dev_script = false;
        self
    }

    /// Lines to print for `snapshot`; empty when nothing visible changed.
    pub fn render(&mut self, snapshot: &PreviewSnapshot) -> Vec<String> {
        let shown = Shown::of(snapshot, self.has_dev_script);
        let mut lines = Vec::new();

        let status_changed = self
            .last
            .as_ref()
            .is_none_or(|last| last.status != shown.status);
        if status_changed {
            lines.push(shown.status.clone());
        } else if self
            .last
            .as_ref()
            .is_some_and(|last| last.refresh_key != shown.refresh_key)
        {
            if let Some(frame) = &snapshot.frame_url {
                lines.push(format!("reloaded   {frame}"));
            }
        }

        let help_appeared =
            shown.show_help && !self.last.as_ref().is_some_and(|last| last.show_help);
        if help_appeared {
            lines.extend(SLOW_START_ADVISORY.lines().map(str::to_string));
        }

        self.last = Some(shown);
        lines
    }
}

/// One-line description of the preview state.
pub fn status_line(snapshot: &PreviewSnapshot, has_dev_script: bool) -> String {
    match (snapshot.mode, snapshot.effective_url.as_deref()) {
        (PreviewMode::Ready, Some(url)) if snapshot.override_url.is_some() => {
            format!("ready      {url} (override)")
        }
        (PreviewMode::Ready, Some(url)) => format!("ready      {url}"),
        (PreviewMode::Error, _) => "error      preview failed to load; refresh to retry".to_string(),
        (_, _) if snapshot.is_stopping => "stopping   ...".to_string(),
        (_, _) if snapshot.is_starting => "starting   ...".to_string(),
        (PreviewMode::Searching, _) | (PreviewMode::Ready, None) => {
            "searching  waiting for the dev server to print its URL".to_string()
        }
        (PreviewMode::NoServer, _) if has_dev_script => {
            "no server  dev server is not running".to_string()
        }
        (PreviewMode::NoServer, _) => {
            "no server  no dev script configured; pass --script or set a URL override".to_string()
        }
    }
}

/// Format a dev-server output line for echoing.
pub fn format_log_line(line: &LogLine) -> String {
    match line.stream {
        LogStream::Stdout => format!("  | {}", line.text),
        LogStream::Stderr => format!("  ! {}", line.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mode: PreviewMode, url: Option<&str>) -> PreviewSnapshot {
        PreviewSnapshot {
            workspace_id: "ws".to_string(),
            mode,
            effective_url: url.map(str::to_string),
            frame_url: url.map(|u| format!("{u}?_refresh=0")),
            ..PreviewSnapshot::default()
        }
    }

    #[test]
    fn test_first_render_prints_status() {
        let mut presenter = SnapshotPresenter::new();
        let lines = presenter.render(&snapshot(PreviewMode::NoServer, None));
        assert_eq!(lines, vec!["no server  dev server is not running".to_string()]);
    }

    #[test]
    fn test_no_dev_script_line() {
        let mut presenter = SnapshotPresenter::new().without_dev_script();
        let lines = presenter.render(&snapshot(PreviewMode::NoServer, None));
        assert_eq!(
            lines,
            vec!["no server  no dev script configured; pass --script or set a URL override"]
        );

        // An override still previews without a script
        let mut overridden = snapshot(PreviewMode::Ready, Some("http://example.com"));
        overridden.override_url = Some("http://example.com".to_string());
        assert_eq!(
            presenter.render(&overridden),
            vec!["ready      http://example.com (override)"]
        );
    }

    #[test]
    fn test_unchanged_snapshot_prints_nothing() {
        let mut presenter = SnapshotPresenter::new();
        let snap = snapshot(PreviewMode::Searching, None);
        presenter.render(&snap);
        assert!(presenter.render(&snap).is_empty());
    }

    #[test]
    fn test_ready_shows_url_and_override_marker() {
        let mut presenter = SnapshotPresenter::new();
        presenter.render(&snapshot(PreviewMode::Searching, None));

        let ready = snapshot(PreviewMode::Ready, Some("http://localhost:5173/"));
        assert_eq!(presenter.render(&ready), vec!["ready      http://localhost:5173/"]);

        let mut overridden = snapshot(PreviewMode::Ready, Some("http://example.com"));
        overridden.override_url = Some("http://example.com".to_string());
        assert_eq!(
            presenter.render(&overridden),
            vec!["ready      http://example.com (override)"]
        );
    }

    #[test]
    fn test_advisory_printed_once() {
        let mut presenter = SnapshotPresenter::new();
        let mut snap = snapshot(PreviewMode::Searching, None);
        presenter.render(&snap);

        snap.show_help = true;
        let lines = presenter.render(&snap);
        assert_eq!(lines.len(), SLOW_START_ADVISORY.lines().count());
        assert!(presenter.render(&snap).is_empty());
    }

    #[test]
    fn test_refresh_prints_frame_url() {
        let mut presenter = SnapshotPresenter::new();
        let mut snap = snapshot(PreviewMode::Ready, Some("http://localhost:3000"));
        presenter.render(&snap);

        snap.refresh_key = 1;
        snap.frame_url = Some("http://localhost:3000?_refresh=1".to_string());
        assert_eq!(
            presenter.render(&snap),
            vec!["reloaded   http://localhost:3000?_refresh=1"]
        );
    }

    #[test]
    fn test_log_line_marks_stderr() {
        assert_eq!(format_log_line(&LogLine::stdout("ok")), "  | ok");
        assert_eq!(format_log_line(&LogLine::stderr("bad")), "  ! bad");
    }
}
