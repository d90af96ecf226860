//! UI preference store.
//!
//! Holds the current [`UiPreferences`] in memory and writes every change
//! through to the repository. A failed save is logged and the in-memory value
//! is kept, so the UI behaves as if the save succeeded.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error};

use crate::domain::{ContextBarPosition, PaneSize, RepoAction, UiPreferences};
use crate::ports::{CoreError, UiPreferencesRepository};

pub struct UiPreferencesService {
    repo: Arc<dyn UiPreferencesRepository>,
    state: RwLock<UiPreferences>,
}

impl UiPreferencesService {
    /// Create a service with default preferences. Call [`load`](Self::load)
    /// to read the persisted ones.
    pub fn new(repo: Arc<dyn UiPreferencesRepository>) -> Self {
        Self {
            repo,
            state: RwLock::new(UiPreferences::default()),
        }
    }

    /// Replace the in-memory state with the persisted preferences.
    pub async fn load(&self) -> Result<UiPreferences, CoreError> {
        let loaded = self.repo.load().await?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = loaded.clone();
        Ok(loaded)
    }

    /// Copy of the current preferences.
    pub fn current(&self) -> UiPreferences {
        self.read(UiPreferences::clone)
    }

    pub fn is_expanded(&self, key: &str, default: bool) -> bool {
        self.read(|p| p.expanded.get(key).copied().unwrap_or(default))
    }

    pub async fn set_expanded(&self, key: &str, value: bool) {
        self.mutate(|p| {
            p.expanded.insert(key.to_string(), value);
        })
        .await;
    }

    /// Flip a section. Returns the new value.
    pub async fn toggle_expanded(&self, key: &str, default: bool) -> bool {
        self.mutate(|p| {
            let value = !p.expanded.get(key).copied().unwrap_or(default);
            p.expanded.insert(key.to_string(), value);
            value
        })
        .await
    }

    /// Set several sections at once with a single save.
    pub async fn set_expanded_all<S: AsRef<str>>(&self, keys: &[S], value: bool) {
        self.mutate(|p| {
            for key in keys {
                p.expanded.insert(key.as_ref().to_string(), value);
            }
        })
        .await;
    }

    pub fn pane_size(&self, key: &str, default: PaneSize) -> PaneSize {
        self.read(|p| p.pane_sizes.get(key).cloned().unwrap_or(default))
    }

    pub async fn set_pane_size(&self, key: &str, size: PaneSize) {
        self.mutate(|p| {
            p.pane_sizes.insert(key.to_string(), size);
        })
        .await;
    }

    /// Collapsed file tree paths of a workspace.
    pub fn collapsed_paths(&self, workspace_id: &str) -> Vec<String> {
        self.read(|p| p.collapsed_paths.get(workspace_id).cloned().unwrap_or_default())
    }

    /// Does nothing for an empty workspace id.
    pub async fn set_collapsed_paths(&self, workspace_id: &str, paths: Vec<String>) {
        if workspace_id.is_empty() {
            debug!("Ignoring collapsed paths without a workspace");
            return;
        }
        self.mutate(|p| {
            p.collapsed_paths.insert(workspace_id.to_string(), paths);
        })
        .await;
    }

    pub fn repo_action(&self, repo_id: &str, default: RepoAction) -> RepoAction {
        self.read(|p| p.repo_actions.get(repo_id).copied().unwrap_or(default))
    }

    pub async fn set_repo_action(&self, repo_id: &str, action: RepoAction) {
        self.mutate(|p| {
            p.repo_actions.insert(repo_id.to_string(), action);
        })
        .await;
    }

    pub fn context_bar_position(&self) -> ContextBarPosition {
        self.read(|p| p.context_bar_position)
    }

    pub async fn set_context_bar_position(&self, position: ContextBarPosition) {
        self.mutate(|p| p.context_bar_position = position).await;
    }

    fn read<R>(&self, f: impl FnOnce(&UiPreferences) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    async fn mutate<R>(&self, f: impl FnOnce(&mut UiPreferences) -> R) -> R {
        let (out, snapshot) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let out = f(&mut state);
            (out, state.clone())
        };
        if let Err(e) = self.repo.save(&snapshot).await {
            error!(error = %e, "Failed to save UI preferences");
        }
        out
    }
}
