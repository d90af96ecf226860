//! `devpreview` command-line adapter.
//!
//! Parses arguments, composes infrastructure in [`bootstrap`] and dispatches
//! to [`handlers`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for crates only used by some test targets
#[cfg(test)]
use tempfile as _;

// Used by the binary target only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod clipboard;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap, bootstrap_with};
pub use clipboard::SystemClipboard;
pub use commands::{Commands, ConfigCommand, DetectArgs, OverrideCommand, PrefsCommand, WatchArgs};
pub use error::CliError;
pub use parser::Cli;
