//! `prefs` command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::commands::PrefsCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: PrefsCommand) -> Result<()> {
    match command {
        PrefsCommand::Show => {
            let prefs = ctx.prefs.current();
            let json = serde_json::to_string_pretty(&prefs)
                .map_err(|e| CliError::Core(format!("Failed to render preferences: {e}")))?;
            println!("{json}");
        }
        PrefsCommand::Toggle { key, default } => {
            if key.trim().is_empty() {
                return Err(CliError::Arguments("preference key is required".to_string()).into());
            }
            let expanded = ctx.prefs.toggle_expanded(&key, default).await;
            let state = if expanded { "expanded" } else { "collapsed" };
            println!("✓ {key} is now {state}");
        }
    }
    Ok(())
}
