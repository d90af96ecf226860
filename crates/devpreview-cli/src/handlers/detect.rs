//! `detect` command handler.
//!
//! Runs the URL extractor over a finished log instead of a live stream.

use anyhow::Result;
use devpreview_core::{LogLine, UrlExtractor, UrlPatternSet};
use tokio::io::AsyncReadExt;

use crate::bootstrap::CliContext;
use crate::commands::DetectArgs;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, args: DetectArgs) -> Result<()> {
    let mut patterns = ctx.preview_settings.effective_url_patterns();
    patterns.extend(args.patterns);
    let patterns = UrlPatternSet::compile(&patterns).map_err(|e| CliError::Config(e.to_string()))?;

    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(CliError::from)?;
            buf
        }
    };

    let detections = scan(patterns, &text);
    let Some(latest) = detections.last() else {
        return Err(CliError::NotFound("No dev server URL found".to_string()).into());
    };

    if args.all {
        for (line_no, url) in &detections {
            println!("{line_no:>6}  {url}");
        }
    } else {
        println!("{}", latest.1);
    }
    Ok(())
}

/// Every detection as `(1-based line number, url)`, in log order.
fn scan(patterns: UrlPatternSet, text: &str) -> Vec<(usize, String)> {
    let mut extractor = UrlExtractor::new(patterns);
    text.lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            extractor
                .push(&LogLine::stdout(raw))
                .map(|info| (index + 1, info.url.clone()))
        })
        .collect()
}
