//! Core services.
//!
//! Services hold the preview flow's logic and depend only on the traits in
//! [`crate::ports`].

pub mod debounce;
pub mod log_search;
pub mod override_store;
pub mod preview_resolver;
pub mod preview_session;
pub mod settings_service;
pub mod ui_preferences;
pub mod url_extractor;

pub use debounce::TrailingDebouncer;
pub use log_search::LogSearch;
pub use override_store::PreviewUrlOverrideStore;
pub use preview_resolver::{PreviewResolver, effective_url, frame_url, primary_process, resolve_mode};
pub use preview_session::{PreviewDeps, PreviewSession};
pub use settings_service::SettingsService;
pub use ui_preferences::UiPreferencesService;
pub use url_extractor::{UrlExtractor, UrlPatternError, UrlPatternSet, extract_latest_url, strip_ansi};
