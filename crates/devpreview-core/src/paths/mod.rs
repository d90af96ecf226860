//! Path utilities for devpreview data directories.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific logic is kept private in `platform`

mod database;
mod error;
mod platform;

pub use database::{database_path, database_path_in};
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, normalize_user_path};
