//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that parse CLI input, call core services and format
//!   output for the terminal
//!
//! Handlers do not access repositories directly or hold business logic.

pub mod config;
pub mod detect;
pub mod overrides;
pub mod prefs;
pub mod watch;
