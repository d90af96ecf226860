//! `config` command handler.

use anyhow::Result;
use devpreview_core::{PreviewSettings, PreviewSettingsUpdate};

use crate::bootstrap::CliContext;
use crate::commands::ConfigCommand;
use crate::error::CliError;
use crate::presentation::{print_field, print_separator};

pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let settings = ctx.settings.get().await.map_err(CliError::from)?;
            show(&settings);
        }
        ConfigCommand::Set {
            override_debounce_ms,
            slow_start_secs,
            log_buffer_lines,
            patterns,
            reset_patterns,
        } => {
            let update = build_update(
                override_debounce_ms,
                slow_start_secs,
                log_buffer_lines,
                patterns,
                reset_patterns,
            );
            if is_empty(&update) {
                return Err(CliError::Arguments("no settings given".to_string()).into());
            }
            let settings = ctx.settings.update(update).await.map_err(CliError::from)?;
            println!("✓ Settings updated");
            show(&settings);
        }
        ConfigCommand::Reset => {
            ctx.settings
                .save(&PreviewSettings::default())
                .await
                .map_err(CliError::from)?;
            println!("✓ Settings reset to defaults");
        }
    }
    Ok(())
}

fn build_update(
    override_debounce_ms: Option<u64>,
    slow_start_secs: Option<u64>,
    log_buffer_lines: Option<usize>,
    patterns: Vec<String>,
    reset_patterns: bool,
) -> PreviewSettingsUpdate {
    let url_patterns = if reset_patterns {
        Some(None)
    } else if patterns.is_empty() {
        None
    } else {
        Some(Some(patterns))
    };
    PreviewSettingsUpdate {
        override_debounce_ms: override_debounce_ms.map(Some),
        slow_start_secs: slow_start_secs.map(Some),
        log_buffer_lines: log_buffer_lines.map(Some),
        url_patterns,
    }
}

const fn is_empty(update: &PreviewSettingsUpdate) -> bool {
    update.override_debounce_ms.is_none()
        && update.slow_start_secs.is_none()
        && update.log_buffer_lines.is_none()
        && update.url_patterns.is_none()
}

fn show(settings: &PreviewSettings) {
    print_field("override debounce", format!("{} ms", settings.override_debounce().as_millis()));
    print_field("slow start", format!("{} s", settings.slow_start().as_secs()));
    print_field("log buffer", format!("{} lines", settings.effective_log_buffer_lines()));
    let custom = if settings.url_patterns.is_some() { "custom" } else { "built-in" };
    print_field("url patterns", custom);
    print_separator(60);
    for pattern in settings.effective_url_patterns() {
        println!("  {pattern}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_only_touches_given_fields() {
        let update = build_update(Some(500), None, None, Vec::new(), false);
        assert_eq!(update.override_debounce_ms, Some(Some(500)));
        assert!(update.slow_start_secs.is_none());
        assert!(update.url_patterns.is_none());
        assert!(!is_empty(&update));
    }

    #[test]
    fn test_reset_patterns_clears_custom_set() {
        let update = build_update(None, None, None, Vec::new(), true);
        assert_eq!(update.url_patterns, Some(None));
    }

    #[test]
    fn test_no_flags_is_empty() {
        assert!(is_empty(&build_update(None, None, None, Vec::new(), false)));
    }
}
