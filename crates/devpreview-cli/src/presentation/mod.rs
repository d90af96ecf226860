//! Terminal presentation utilities.
//!
//! Format-only: no domain transforms. Preview state comes in as a
//! `PreviewSnapshot` and goes out as lines of text.

pub mod snapshot;
pub mod tables;

pub use snapshot::{COMMAND_HINT, SLOW_START_ADVISORY, SnapshotPresenter, format_log_line};
pub use tables::{format_optional, print_field, print_separator, truncate_string};
