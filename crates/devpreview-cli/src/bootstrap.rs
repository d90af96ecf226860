//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Database pool and repositories (via devpreview-db)
//! - Dev-server manager and log buffers (via devpreview-runtime)
//! - Core services (via devpreview-core)
//! - System clipboard (via arboard)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use devpreview_core::paths::{data_root, database_path_in};
use devpreview_core::{
    Clipboard, DevServerControl, LogStreamReader, PreviewDeps, PreviewSettings,
    PreviewUrlOverrideStore, Repos, SettingsService, UiPreferencesService,
};
use devpreview_db::{CoreFactory, setup_database};
use devpreview_runtime::{DevServerEventBroadcaster, DevServerManager, ServerLogManager};
use tracing::debug;

use crate::clipboard::SystemClipboard;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Root directory holding `data/devpreview.db`.
    pub data_dir: PathBuf,
}

impl CliConfig {
    /// Use `data_dir` when given, else the platform data root.
    pub fn with_defaults(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => data_root()?,
        };
        Ok(Self { data_dir })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub repos: Repos,
    pub settings: SettingsService,
    pub prefs: UiPreferencesService,
    /// Settings as loaded at startup; sizes the runtime and debounce.
    pub preview_settings: PreviewSettings,
    pub overrides: Arc<PreviewUrlOverrideStore>,
    pub dev_servers: Arc<DevServerManager>,
    pub clipboard: Arc<dyn Clipboard>,
}

impl CliContext {
    /// Dependencies for a preview session over this context's adapters.
    pub fn preview_deps(&self) -> PreviewDeps {
        PreviewDeps::new(
            Arc::clone(self.dev_servers.logs()) as Arc<dyn LogStreamReader>,
            Arc::clone(&self.overrides),
            Arc::clone(&self.dev_servers) as Arc<dyn DevServerControl>,
            Arc::clone(&self.clipboard),
        )
    }
}

/// Bootstrap the CLI application.
///
/// Opens the database, loads settings and preferences, then builds the
/// override store and the dev-server runtime sized by those settings.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let db_path = database_path_in(&config.data_dir)?;
    debug!(path = %db_path.display(), "Opening database");
    let pool = setup_database(&db_path).await?;
    let repos = CoreFactory::build_repos(pool);

    bootstrap_with(repos, Arc::new(SystemClipboard::new())).await
}

/// Bootstrap over existing repositories (for testing).
pub async fn bootstrap_with(repos: Repos, clipboard: Arc<dyn Clipboard>) -> Result<CliContext> {
    let settings = SettingsService::new(Arc::clone(&repos.settings));
    let preview_settings = settings.get().await?;

    let prefs = UiPreferencesService::new(Arc::clone(&repos.ui_preferences));
    prefs.load().await?;

    let overrides = Arc::new(PreviewUrlOverrideStore::with_debounce(
        Arc::clone(&repos.scratch),
        preview_settings.override_debounce(),
    ));

    let logs = Arc::new(ServerLogManager::with_capacity(
        preview_settings.effective_log_buffer_lines(),
    ));
    let dev_servers = Arc::new(DevServerManager::new(
        logs,
        Arc::new(DevServerEventBroadcaster::new()),
    ));

    Ok(CliContext {
        repos,
        settings,
        prefs,
        preview_settings,
        overrides,
        dev_servers,
        clipboard,
    })
}
