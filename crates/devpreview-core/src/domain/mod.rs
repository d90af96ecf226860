//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, process spawning, clipboard, etc.).
//!
//! # Structure
//!
//! - `log` - Log lines streamed from dev-server processes and detected URLs
//! - `process` - Dev-server process state and workspace repositories
//! - `scratch` - Generic persisted blobs (preview URL overrides)
//! - `preview` - Preview modes and the published snapshot
//! - `ui_preferences` - Persisted UI preference state

mod log;
mod preview;
mod process;
mod scratch;
pub mod ui_preferences;

pub use log::{DetectedUrlInfo, LogLine, LogStream, now_ms};
pub use preview::{PreviewMode, PreviewSnapshot};
pub use process::{DevServerProcess, ProcessStatus, WorkspaceRepo, has_dev_script};
pub use scratch::{OverrideRecord, PreviewUrlOverrideData, Scratch, ScratchPayload, ScratchType};
pub use ui_preferences::{ContextBarPosition, PaneSize, RepoAction, UiPreferences};
