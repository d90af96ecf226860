//! Dev-server log sink port.
//!
//! This port abstracts the destination for dev-server output (stdout/stderr),
//! allowing the runtime's stream readers to feed a ring buffer, a file, or
//! nothing at all.

use crate::domain::LogStream;

/// Port for appending dev-server log lines to a sink.
///
/// Implementations should be thread-safe and non-blocking where possible.
pub trait DevServerLogSink: Send + Sync {
    /// Append a log line from a dev-server process.
    ///
    /// # Arguments
    ///
    /// * `process_id` - Process the line belongs to
    /// * `stream` - Stream the line was read from
    /// * `line` - The log line content (without trailing newline)
    fn append(&self, process_id: &str, stream: LogStream, line: String);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl DevServerLogSink for NoopLogSink {
    fn append(&self, _process_id: &str, _stream: LogStream, _line: String) {}
}
