//! Dev-server URL detection from log output.
//!
//! Dev servers announce where they listen with a banner line such as
//! `Local: http://localhost:5173/`. Which banners are recognised is
//! configuration: a [`UrlPatternSet`] compiled from regular expressions that
//! each capture the URL in a group named `url`.
//!
//! [`UrlExtractor`] tracks the most recent match incrementally. Log input is
//! append-only, so feeding each new line once keeps detection O(1) per line.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::domain::{DetectedUrlInfo, LogLine};

/// Name of the capture group every pattern must define.
pub const URL_GROUP: &str = "url";

/// Characters trimmed from the end of a captured URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', ')', ']', '\'', '"'];

/// CSI and OSC escape sequences emitted by colourised dev-server output.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
        .unwrap_or_else(|e| unreachable!("static ANSI regex is valid: {e}"))
});

/// Failure to compile a URL pattern set.
#[derive(Debug, Clone, Error)]
pub enum UrlPatternError {
    #[error("pattern {index} is not a valid regex: {reason}")]
    InvalidRegex { index: usize, reason: String },

    #[error("pattern {index} has no `url` capture group")]
    MissingUrlGroup { index: usize },
}

/// Compiled set of "server is listening" patterns.
#[derive(Debug, Clone)]
pub struct UrlPatternSet {
    patterns: Vec<Regex>,
}

impl UrlPatternSet {
    /// Compile a pattern set.
    ///
    /// Every pattern must be a valid regex with a `url` named group.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, UrlPatternError> {
        let patterns = patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                let regex =
                    Regex::new(pattern.as_ref()).map_err(|e| UrlPatternError::InvalidRegex {
                        index,
                        reason: e.to_string(),
                    })?;
                if !regex.capture_names().any(|name| name == Some(URL_GROUP)) {
                    return Err(UrlPatternError::MissingUrlGroup { index });
                }
                Ok(regex)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// The built-in pattern set.
    pub fn builtin() -> Self {
        Self::compile(&crate::settings::default_url_patterns())
            .unwrap_or_else(|e| unreachable!("built-in URL patterns are valid: {e}"))
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Find a listening URL in a single line of text.
    ///
    /// When several patterns match, the one whose URL appears last in the
    /// line wins.
    pub fn find_url(&self, text: &str) -> Option<String> {
        let clean = strip_ansi(text);

        self.patterns
            .iter()
            .filter_map(|regex| {
                regex
                    .captures_iter(&clean)
                    .filter_map(|caps| caps.name(URL_GROUP))
                    .filter_map(|m| normalize_candidate(m.as_str()).map(|url| (m.start(), url)))
                    .last()
            })
            .max_by_key(|(start, _)| *start)
            .map(|(_, url)| url)
    }
}

impl Default for UrlPatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Incremental tracker of the most recently announced URL.
///
/// Once a URL is detected it never reverts to `None`; it only changes when a
/// later line matches.
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    patterns: UrlPatternSet,
    latest: Option<DetectedUrlInfo>,
    lines_seen: usize,
}

impl UrlExtractor {
    /// Create an extractor with no lines seen.
    pub const fn new(patterns: UrlPatternSet) -> Self {
        Self {
            patterns,
            latest: None,
            lines_seen: 0,
        }
    }

    /// Feed one line. Returns the new detection if this line matched.
    pub fn push(&mut self, line: &LogLine) -> Option<&DetectedUrlInfo> {
        self.lines_seen += 1;
        let url = self.patterns.find_url(&line.text)?;
        self.latest = Some(DetectedUrlInfo {
            url,
            matched_at: line.timestamp,
        });
        self.latest.as_ref()
    }

    /// Feed a batch of lines in arrival order.
    ///
    /// Returns `true` if any line in the batch matched.
    pub fn extend<'a, I>(&mut self, lines: I) -> bool
    where
        I: IntoIterator<Item = &'a LogLine>,
    {
        let mut matched = false;
        for line in lines {
            matched |= self.push(line).is_some();
        }
        matched
    }

    /// The most recent detection.
    pub const fn latest(&self) -> Option<&DetectedUrlInfo> {
        self.latest.as_ref()
    }

    /// Number of lines fed so far.
    pub const fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Forget all lines, e.g. when following a different process.
    pub fn reset(&mut self) {
        self.latest = None;
        self.lines_seen = 0;
    }
}

impl Default for UrlExtractor {
    fn default() -> Self {
        Self::new(UrlPatternSet::builtin())
    }
}

/// Scan a complete log and return the latest detected URL.
///
/// Scans newest to oldest and stops at the first match.
pub fn extract_latest_url(patterns: &UrlPatternSet, lines: &[LogLine]) -> Option<DetectedUrlInfo> {
    lines.iter().rev().find_map(|line| {
        patterns.find_url(&line.text).map(|url| DetectedUrlInfo {
            url,
            matched_at: line.timestamp,
        })
    })
}

/// Remove ANSI escape sequences from a line.
pub fn strip_ansi(text: &str) -> std::borrow::Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Trim punctuation, validate as an absolute http(s) URL and rewrite
/// wildcard bind addresses to `localhost`.
fn normalize_candidate(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches(TRAILING_PUNCTUATION);
    let parsed = Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }

    let rewritten = trimmed
        .replacen("://0.0.0.0", "://localhost", 1)
        .replacen("://[::]", "://localhost", 1);
    Some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ts: u64, text: &str) -> LogLine {
        LogLine::at(ts, crate::domain::LogStream::Stdout, text)
    }

    #[test]
    fn test_builtin_patterns_recognise_common_banners() {
        let patterns = UrlPatternSet::builtin();
        let cases = [
            ("  ➜  Local:   http://localhost:5173/", "http://localhost:5173/"),
            ("   - Local:        http://localhost:3000", "http://localhost:3000"),
            (
                "<i> [webpack-dev-server] Project is running at: http://localhost:8080/",
                "http://localhost:8080/",
            ),
            ("Server listening on http://127.0.0.1:4000.", "http://127.0.0.1:4000"),
            ("Rails app ready at https://app.test:3443/dashboard", "https://app.test:3443/dashboard"),
        ];

        for (text, expected) in cases {
            assert_eq!(patterns.find_url(text).as_deref(), Some(expected), "{text}");
        }
    }

    #[test]
    fn test_plain_urls_without_marker_do_not_match() {
        let patterns = UrlPatternSet::builtin();
        assert_eq!(patterns.find_url("fetching http://registry.npmjs.org/vite"), None);
        assert_eq!(patterns.find_url("compiled successfully"), None);
    }

    #[test]
    fn test_ansi_sequences_are_stripped() {
        let patterns = UrlPatternSet::builtin();
        let text = "\x1b[32m➜\x1b[39m  \x1b[1mLocal\x1b[22m:   \x1b[36mhttp://localhost:\x1b[1m5173\x1b[22m/\x1b[39m";
        assert_eq!(
            patterns.find_url(text).as_deref(),
            Some("http://localhost:5173/")
        );
    }

    #[test]
    fn test_wildcard_hosts_rewritten_to_localhost() {
        let patterns = UrlPatternSet::builtin();
        assert_eq!(
            patterns.find_url("Listening on http://0.0.0.0:8000").as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(
            patterns.find_url("Listening on http://[::]:8000/").as_deref(),
            Some("http://localhost:8000/")
        );
    }

    #[test]
    fn test_custom_patterns() {
        let patterns = UrlPatternSet::compile(&[r"PREVIEW=(?P<url>https?://\S+)"]).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(
            patterns.find_url("PREVIEW=http://localhost:9999").as_deref(),
            Some("http://localhost:9999")
        );
        assert_eq!(patterns.find_url("Local: http://localhost:5173"), None);
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            UrlPatternSet::compile(&["(unclosed"]),
            Err(UrlPatternError::InvalidRegex { index: 0, .. })
        ));
        assert!(matches!(
            UrlPatternSet::compile(&[r"(?P<url>x)", r"listening (\S+)"]),
            Err(UrlPatternError::MissingUrlGroup { index: 1 })
        ));
    }

    #[test]
    fn test_extractor_keeps_latest_match() {
        let mut extractor = UrlExtractor::default();
        assert!(extractor.push(&line(1, "starting...")).is_none());
        assert!(extractor.latest().is_none());

        extractor.push(&line(2, "Local: http://localhost:3000"));
        extractor.push(&line(3, "compiled in 120ms"));
        assert_eq!(extractor.latest().unwrap().url, "http://localhost:3000");

        extractor.push(&line(4, "Local: http://localhost:3001"));
        let latest = extractor.latest().unwrap();
        assert_eq!(latest.url, "http://localhost:3001");
        assert_eq!(latest.matched_at, 4);
        assert_eq!(extractor.lines_seen(), 4);
    }

    #[test]
    fn test_detection_never_reverts() {
        let mut extractor = UrlExtractor::default();
        let lines = [
            line(1, "Local: http://localhost:3000"),
            line(2, "error: something broke"),
            line(3, "Listening on nothing-useful"),
        ];
        let mut previous: Option<DetectedUrlInfo> = None;
        for l in &lines {
            extractor.push(l);
            let current = extractor.latest().cloned();
            if let Some(prev) = &previous {
                let cur = current.as_ref().unwrap();
                assert!(cur.matched_at >= prev.matched_at);
            }
            previous = current;
        }
        assert_eq!(previous.unwrap().url, "http://localhost:3000");
    }

    #[test]
    fn test_batch_ties_resolve_to_last_line() {
        let mut extractor = UrlExtractor::default();
        let batch = vec![
            line(5, "Local: http://localhost:5173/"),
            line(5, "Local: http://localhost:5174/"),
        ];
        assert!(extractor.extend(&batch));
        assert_eq!(extractor.latest().unwrap().url, "http://localhost:5174/");
    }

    #[test]
    fn test_extract_latest_scans_backwards() {
        let patterns = UrlPatternSet::builtin();
        let lines = vec![
            line(1, "Local: http://localhost:3000"),
            line(2, "restarting"),
            line(3, "Local: http://localhost:3002"),
            line(4, "ready"),
        ];
        let found = extract_latest_url(&patterns, &lines).unwrap();
        assert_eq!(found.url, "http://localhost:3002");
        assert_eq!(found.matched_at, 3);
        assert!(extract_latest_url(&patterns, &[]).is_none());
    }

    #[test]
    fn test_reset_forgets_detection() {
        let mut extractor = UrlExtractor::default();
        extractor.push(&line(1, "Local: http://localhost:3000"));
        extractor.reset();
        assert!(extractor.latest().is_none());
        assert_eq!(extractor.lines_seen(), 0);
    }
}
