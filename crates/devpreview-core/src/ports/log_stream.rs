//! Log stream reader port.
//!
//! Supplies the ordered, append-only log of a dev-server process.

use std::pin::Pin;

use futures_core::Stream;

use crate::domain::LogLine;

/// Boxed stream of log lines.
pub type LogLineStream = Pin<Box<dyn Stream<Item = LogLine> + Send + 'static>>;

/// Port for subscribing to a process's log lines.
///
/// A subscription yields everything already emitted by the process and then
/// follows new output. Dropping the stream unsubscribes.
pub trait LogStreamReader: Send + Sync {
    /// Subscribe to the log of `process_id`.
    ///
    /// An empty `process_id` yields an empty stream, not an error.
    fn subscribe(&self, process_id: &str) -> LogLineStream;
}
