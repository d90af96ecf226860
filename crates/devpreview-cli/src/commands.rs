//! Commands enum and subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start a workspace dev server and follow its preview URL until Ctrl-C
    Watch(WatchArgs),

    /// Print the latest dev-server URL found in a log file (or stdin)
    Detect(DetectArgs),

    /// Manage manual preview URL overrides
    Override {
        #[command(subcommand)]
        command: OverrideCommand,
    },

    /// View or change preview settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// View or change UI preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Workspace identifier
    pub workspace: String,

    /// Dev-server command line, run through the shell. Without one only
    /// `--url` can be previewed
    #[arg(short, long, default_value = "")]
    pub script: String,

    /// Working directory for the dev server
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variables (KEY=VALUE, repeatable)
    #[arg(short, long, value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Set a preview URL override before starting
    #[arg(long)]
    pub url: Option<String>,

    /// Echo dev-server output
    #[arg(long)]
    pub logs: bool,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Log file to scan (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Additional URL pattern; must contain a `url` named group (repeatable)
    #[arg(short, long = "pattern")]
    pub patterns: Vec<String>,

    /// Print every detection in order instead of only the latest
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum OverrideCommand {
    /// Set the preview URL override for a workspace
    Set { workspace: String, url: String },
    /// Remove the preview URL override for a workspace
    Clear { workspace: String },
    /// Show the preview URL override for a workspace
    Show { workspace: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show effective preview settings
    Show,
    /// Update preview settings
    Set {
        /// Override persistence debounce in milliseconds (0-10000)
        #[arg(long)]
        override_debounce_ms: Option<u64>,
        /// Seconds before the slow-start advisory is shown (1-600)
        #[arg(long)]
        slow_start_secs: Option<u64>,
        /// Log lines buffered per dev server (100-100000)
        #[arg(long)]
        log_buffer_lines: Option<usize>,
        /// Replace the URL pattern set (repeatable)
        #[arg(long = "pattern", conflicts_with = "reset_patterns")]
        patterns: Vec<String>,
        /// Restore the built-in URL patterns
        #[arg(long)]
        reset_patterns: bool,
    },
    /// Reset all settings to defaults
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum PrefsCommand {
    /// Show all UI preferences
    Show,
    /// Flip a collapsible section's expanded state
    Toggle {
        key: String,
        /// Value assumed when the key has never been set
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        default: bool,
    },
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
