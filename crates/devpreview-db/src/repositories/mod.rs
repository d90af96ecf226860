//! Repository implementations using `SQLite`.
//!
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod settings_kv;
mod sqlite_scratch_repository;
mod sqlite_settings_repository;
mod sqlite_ui_preferences_repository;

pub use sqlite_scratch_repository::SqliteScratchRepository;
pub use sqlite_settings_repository::SqliteSettingsRepository;
pub use sqlite_ui_preferences_repository::SqliteUiPreferencesRepository;
