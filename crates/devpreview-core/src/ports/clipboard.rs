//! Clipboard port.

use thiserror::Error;

/// Clipboard failure.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No clipboard is available in this environment.
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    /// The write was rejected.
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Port for writing text to the system clipboard.
///
/// Callers treat this as best-effort.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard that accepts and discards every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClipboard;

impl Clipboard for NoopClipboard {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}
