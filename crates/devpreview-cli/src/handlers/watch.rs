//! `watch` command handler.
//!
//! Runs one workspace's dev server under a preview session and renders the
//! session's snapshots until Ctrl-C or `q`. Single-letter commands on stdin
//! drive the session the way preview buttons would; `/text` searches the
//! primary process's log.

use anyhow::Result;
use devpreview_core::{LogLine, LogSearch, PreviewSession, WorkspaceRepo, has_dev_script};
use devpreview_runtime::{DevServerEvent, DevServerSpec, ServerLogManager};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::bootstrap::CliContext;
use crate::commands::WatchArgs;
use crate::error::CliError;
use crate::presentation::{COMMAND_HINT, SnapshotPresenter, format_log_line};

/// Build the dev-server spec for `args`.
pub fn spec_from_args(args: &WatchArgs) -> DevServerSpec {
    let mut spec = DevServerSpec::new(&args.workspace, &args.script);
    if let Some(cwd) = &args.cwd {
        spec = spec.with_working_dir(cwd);
    }
    for (key, value) in &args.env {
        spec = spec.with_env(key, value);
    }
    spec
}

/// The workspace as seen by the preview: one repo running `--script`.
pub fn repo_from_args(args: &WatchArgs) -> WorkspaceRepo {
    WorkspaceRepo {
        id: args.workspace.clone(),
        display_name: args.workspace.clone(),
        dev_server_script: Some(args.script.clone()),
    }
}

pub async fn execute(ctx: &CliContext, args: WatchArgs) -> Result<()> {
    let can_start = has_dev_script(std::slice::from_ref(&repo_from_args(&args)));
    if !can_start && args.url.is_none() {
        return Err(CliError::Arguments(
            "nothing to preview: pass --script or --url".to_string(),
        )
        .into());
    }
    if can_start {
        ctx.dev_servers.register(spec_from_args(&args));
    }

    let session = PreviewSession::open(&args.workspace, ctx.preview_deps(), &ctx.preview_settings)
        .await
        .map_err(CliError::from)?;
    if let Some(url) = &args.url {
        session
            .set_override_url(url)
            .await
            .map_err(CliError::from)?;
    }
    if args.logs {
        session.toggle_logs();
    }

    let mut presenter = SnapshotPresenter::new();
    if !can_start {
        presenter = presenter.without_dev_script();
    }
    let mut controls = Controls {
        session: &session,
        logs: ctx.dev_servers.logs(),
        search: LogSearch::new(),
        can_start,
    };
    let mut updates = session.subscribe();
    let mut events = ctx.dev_servers.events().subscribe();
    let mut output = ctx.dev_servers.logs().subscribe_all();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    eprintln!("{COMMAND_HINT}");
    print_lines(presenter.render(&session.snapshot()));

    if can_start && let Err(e) = session.start().await {
        session.close().await;
        return Err(CliError::from(e).into());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_lines(presenter.render(&snapshot));
            }
            event = events.recv() => match event {
                Ok(event) if event.workspace_id() == args.workspace => {
                    if let DevServerEvent::Failed(info) = &event {
                        eprintln!("dev server failed (exit code {:?})", info.exit_code);
                    }
                    session.sync_processes().await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Lifecycle events lagged; resyncing");
                    session.sync_processes().await;
                }
                Err(RecvError::Closed) => break,
            },
            entry = output.recv() => match entry {
                Ok(entry) => {
                    if session.snapshot().show_logs {
                        println!("{}", format_log_line(&entry.line));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Dev server output lagged; lines dropped from echo");
                }
                Err(RecvError::Closed) => break,
            },
            line = input.next_line(), if input_open => match line {
                Ok(Some(command)) => {
                    if controls.handle(command.trim()).await == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    debug!(error = %e, "Stopped reading commands from stdin");
                    input_open = false;
                }
            },
        }
    }

    if let Err(e) = session.stop().await {
        warn!(error = %e, "Failed to stop dev server");
    }
    session.close().await;
    ctx.dev_servers.stop_all().await;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// What stdin commands act on.
struct Controls<'a> {
    session: &'a PreviewSession,
    logs: &'a ServerLogManager,
    search: LogSearch,
    can_start: bool,
}

impl Controls<'_> {
    async fn handle(&mut self, command: &str) -> Flow {
        if let Some(query) = command.strip_prefix('/') {
            let lines = self.primary_logs();
            print_lines(search_logs(&mut self.search, query.trim(), &lines));
            return Flow::Continue;
        }

        let session = self.session;
        match command {
            "q" => return Flow::Quit,
            "r" => session.refresh(),
            "c" => {
                if session.copy_url() {
                    println!("✓ URL copied");
                } else {
                    println!("nothing copied");
                }
            }
            "s" if !self.can_start => println!("no dev script configured"),
            "s" => {
                if let Err(e) = session.start().await {
                    eprintln!("start failed: {e}");
                }
            }
            "t" => {
                if let Err(e) = session.stop_and_edit().await {
                    eprintln!("stop failed: {e}");
                }
            }
            "l" => {
                let shown = session.toggle_logs();
                println!("logs {}", if shown { "on" } else { "off" });
            }
            "n" | "p" => {
                let lines = self.primary_logs();
                println!("{}", step_search(&mut self.search, &lines, command == "n"));
            }
            "h" => session.dismiss_help(),
            "e" => session.report_load_error(),
            "" => {}
            _ => eprintln!("{COMMAND_HINT}"),
        }
        Flow::Continue
    }

    fn primary_logs(&self) -> Vec<LogLine> {
        self.session
            .snapshot()
            .primary_process_id
            .map(|id| self.logs.get_logs(&id))
            .unwrap_or_default()
    }
}

/// Run `query` over `lines` and list every match with its line number.
/// An empty query clears the search.
fn search_logs(search: &mut LogSearch, query: &str, lines: &[LogLine]) -> Vec<String> {
    if query.is_empty() {
        search.clear();
        return vec!["search cleared".to_string()];
    }
    search.set_query(query, lines);
    if search.match_count() == 0 {
        return vec![format!("no matches for \"{query}\"")];
    }

    let mut out = vec![format!("{} matches for \"{query}\"", search.match_count())];
    out.extend(search.matches().iter().filter_map(|&idx| {
        lines
            .get(idx)
            .map(|line| format!("{:>5}{}", idx + 1, format_log_line(line)))
    }));
    out
}

/// Move the search cursor and describe the match under it.
fn step_search(search: &mut LogSearch, lines: &[LogLine], forward: bool) -> String {
    if search.query().is_empty() {
        return "no search; type /text first".to_string();
    }
    search.rescan(lines);
    let idx = if forward { search.next() } else { search.prev() };
    match (idx.and_then(|i| lines.get(i).map(|l| (i, l))), search.current_position()) {
        (Some((idx, line)), Some(pos)) => format!(
            "[{}/{}] {:>5}{}",
            pos + 1,
            search.match_count(),
            idx + 1,
            format_log_line(line)
        ),
        _ => format!("no matches for \"{}\"", search.query()),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_spec_from_args() {
        let args = WatchArgs {
            workspace: "ws-1".to_string(),
            script: "npm run dev".to_string(),
            cwd: Some(PathBuf::from("/srv/app")),
            env: vec![("PORT".to_string(), "4000".to_string())],
            url: None,
            logs: false,
        };
        let spec = spec_from_args(&args);
        assert_eq!(spec.workspace_id, "ws-1");
        assert_eq!(spec.script, "npm run dev");
        assert_eq!(spec.working_dir, Some(PathBuf::from("/srv/app")));
        assert_eq!(spec.env, vec![("PORT".to_string(), "4000".to_string())]);
        assert!(spec.has_script());
        assert!(has_dev_script(&[repo_from_args(&args)]));
    }

    #[test]
    fn test_blank_script_has_no_dev_script() {
        let args = WatchArgs {
            workspace: "ws-1".to_string(),
            script: "   ".to_string(),
            cwd: None,
            env: Vec::new(),
            url: Some("http://example.com".to_string()),
            logs: false,
        };
        assert!(!has_dev_script(&[repo_from_args(&args)]));
    }

    fn log() -> Vec<LogLine> {
        vec![
            LogLine::stdout("compiling"),
            LogLine::stderr("Error: port 3000 in use"),
            LogLine::stdout("retrying on 3001"),
            LogLine::stderr("error: again"),
        ]
    }

    #[test]
    fn test_search_lists_matches_with_line_numbers() {
        let mut search = LogSearch::new();
        let out = search_logs(&mut search, "error", &log());
        assert_eq!(
            out,
            vec![
                "2 matches for \"error\"",
                "    2  ! Error: port 3000 in use",
                "    4  ! error: again",
            ]
        );
        assert_eq!(
            search_logs(&mut search, "missing", &log()),
            vec!["no matches for \"missing\""]
        );
    }

    #[test]
    fn test_step_search_wraps_both_ways() {
        let lines = log();
        let mut search = LogSearch::new();
        assert_eq!(step_search(&mut search, &lines, true), "no search; type /text first");

        search_logs(&mut search, "error", &lines);
        assert_eq!(
            step_search(&mut search, &lines, true),
            "[2/2]     4  ! error: again"
        );
        assert_eq!(
            step_search(&mut search, &lines, true),
            "[1/2]     2  ! Error: port 3000 in use"
        );
        assert_eq!(
            step_search(&mut search, &lines, false),
            "[2/2]     4  ! error: again"
        );

        assert_eq!(search_logs(&mut search, "", &lines), vec!["search cleared"]);
        assert_eq!(step_search(&mut search, &lines, true), "no search; type /text first");
    }
}
