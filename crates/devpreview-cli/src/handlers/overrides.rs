//! `override` command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::commands::OverrideCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: OverrideCommand) -> Result<()> {
    match command {
        OverrideCommand::Set { workspace, url } => {
            ctx.overrides
                .set_override_url(&workspace, &url)
                .await
                .map_err(CliError::from)?;
            // The process exits right away; write now rather than after the debounce
            ctx.overrides.flush(&workspace).await;
            match ctx.overrides.get_override(&workspace).await.map_err(CliError::from)? {
                Some(url) => println!("✓ Preview URL for {workspace} set to {url}"),
                None => println!("✓ Preview URL override for {workspace} cleared"),
            }
        }
        OverrideCommand::Clear { workspace } => {
            ctx.overrides
                .clear_override(&workspace)
                .await
                .map_err(CliError::from)?;
            println!("✓ Preview URL override for {workspace} cleared");
        }
        OverrideCommand::Show { workspace } => {
            match ctx.overrides.get_override(&workspace).await.map_err(CliError::from)? {
                Some(url) => println!("{url}"),
                None => println!("No preview URL override for {workspace}"),
            }
        }
    }
    Ok(())
}
