//! Log line types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output stream a log line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line emitted by a dev-server process.
///
/// Immutable once emitted. Lines for one process arrive in non-decreasing
/// timestamp order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Unix timestamp in milliseconds
    pub timestamp: u64,
    /// Stream the line was read from
    pub stream: LogStream,
    /// Line content without the trailing newline
    pub text: String,
}

impl LogLine {
    /// Create a log line stamped with the current time.
    pub fn new(stream: LogStream, text: impl Into<String>) -> Self {
        Self::at(now_ms(), stream, text)
    }

    /// Create a log line with an explicit timestamp.
    pub fn at(timestamp: u64, stream: LogStream, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            stream,
            text: text.into(),
        }
    }

    /// Shorthand for a stdout line.
    pub fn stdout(text: impl Into<String>) -> Self {
        Self::new(LogStream::Stdout, text)
    }

    /// Shorthand for a stderr line.
    pub fn stderr(text: impl Into<String>) -> Self {
        Self::new(LogStream::Stderr, text)
    }
}

/// A URL recognised in a dev server's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedUrlInfo {
    pub url: String,
    /// Timestamp of the log line the URL was found in
    pub matched_at: u64,
}

/// Current time as Unix milliseconds.
pub fn now_ms() -> u64 {
    let millis = chrono::Utc::now().timestamp_millis();
    u64::try_from(millis).unwrap_or_default()
}
