//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for previewing workspace dev servers.
#[derive(Parser)]
#[command(name = "devpreview")]
#[command(about = "Run a workspace dev server and follow its preview URL")]
#[command(version)]
pub struct Cli {
    /// Override the data directory for this invocation
    #[arg(long = "data-dir", global = true, env = "DEVPREVIEW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ConfigCommand, OverrideCommand, PrefsCommand};
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["devpreview", "--verbose", "--data-dir", "/tmp/dp", "config", "show"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/dp")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommand::Show
            })
        ));
    }

    #[test]
    fn test_watch_args() {
        let cli = Cli::parse_from([
            "devpreview",
            "watch",
            "ws-1",
            "--script",
            "npm run dev",
            "--cwd",
            "/srv/app",
            "--env",
            "PORT=4000",
            "--logs",
        ]);
        let Some(Commands::Watch(args)) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.workspace, "ws-1");
        assert_eq!(args.script, "npm run dev");
        assert_eq!(args.cwd, Some(PathBuf::from("/srv/app")));
        assert_eq!(args.env, vec![("PORT".to_string(), "4000".to_string())]);
        assert!(args.logs);
        assert!(args.url.is_none());
    }

    #[test]
    fn test_watch_url_without_script() {
        let cli = Cli::parse_from(["devpreview", "watch", "ws-1", "--url", "http://example.com"]);
        let Some(Commands::Watch(args)) = cli.command else {
            panic!("expected watch");
        };
        assert!(args.script.is_empty());
        assert_eq!(args.url.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn test_watch_rejects_malformed_env() {
        let result = Cli::try_parse_from([
            "devpreview", "watch", "ws-1", "--script", "x", "--env", "NOEQUALS",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_override_set() {
        let cli = Cli::parse_from(["devpreview", "override", "set", "ws-1", "http://example.com"]);
        let Some(Commands::Override {
            command: OverrideCommand::Set { workspace, url },
        }) = cli.command
        else {
            panic!("expected override set");
        };
        assert_eq!(workspace, "ws-1");
        assert_eq!(url, "http://example.com");
    }

    #[test]
    fn test_prefs_toggle_default() {
        let cli = Cli::parse_from(["devpreview", "prefs", "toggle", "changes-section"]);
        let Some(Commands::Prefs {
            command: PrefsCommand::Toggle { key, default },
        }) = cli.command
        else {
            panic!("expected prefs toggle");
        };
        assert_eq!(key, "changes-section");
        assert!(default);
    }

    #[test]
    fn test_detect_patterns() {
        let cli = Cli::parse_from([
            "devpreview",
            "detect",
            "server.log",
            "--pattern",
            r"ready at (?P<url>\S+)",
            "--all",
        ]);
        let Some(Commands::Detect(args)) = cli.command else {
            panic!("expected detect");
        };
        assert_eq!(args.file, Some(PathBuf::from("server.log")));
        assert_eq!(args.patterns.len(), 1);
        assert!(args.all);
    }
}
