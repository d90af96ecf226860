//! Persisted UI preference state.
//!
//! Collapsible section state, pane sizes and per-workspace file tree state.
//! The state is a plain value; `UiPreferencesService` owns mutation and
//! persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known preference keys.
pub mod persist_keys {
    pub const WORKSPACES_SIDEBAR_ACTIVE: &str = "workspaces-sidebar-active";
    pub const WORKSPACES_SIDEBAR_ARCHIVED: &str = "workspaces-sidebar-archived";
    pub const GIT_ADVANCED_SETTINGS: &str = "git-advanced-settings";
    pub const GIT_PANEL_REPOSITORIES: &str = "git-panel-repositories";
    pub const PROCESSES_SECTION: &str = "processes-section";
    pub const CHANGES_SECTION: &str = "changes-section";
    pub const DEV_SERVER_SECTION: &str = "dev-server-section";
    pub const SHOW_GITHUB_COMMENTS: &str = "show-github-comments";
    pub const SIDEBAR_WIDTH: &str = "workspaces-sidebar-width";
    pub const GIT_PANEL_WIDTH: &str = "workspaces-git-panel-width";
    pub const CHANGES_PANEL_WIDTH: &str = "workspaces-changes-panel-width";
    pub const FILE_TREE_HEIGHT: &str = "workspaces-file-tree-height";

    /// Key for a repo card's collapsed state.
    pub fn repo_card(repo_id: &str) -> String {
        format!("repo-card-{repo_id}")
    }

    /// Key for a workspace's collapsed file tree paths.
    pub fn file_tree(workspace_id: &str) -> String {
        format!("file-tree:{workspace_id}")
    }
}

/// Where the floating context bar is docked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextBarPosition {
    TopLeft,
    TopRight,
    MiddleLeft,
    #[default]
    MiddleRight,
    BottomLeft,
    BottomRight,
}

/// Default action offered on a repo card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoAction {
    #[default]
    PullRequest,
    Merge,
}

/// A pane size: pixels or a CSS-style string such as `"30%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaneSize {
    Pixels(f64),
    Css(String),
}

impl From<f64> for PaneSize {
    fn from(value: f64) -> Self {
        Self::Pixels(value)
    }
}

impl From<&str> for PaneSize {
    fn from(value: &str) -> Self {
        Self::Css(value.to_string())
    }
}

/// All persisted UI preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiPreferences {
    pub repo_actions: BTreeMap<String, RepoAction>,
    pub expanded: BTreeMap<String, bool>,
    pub context_bar_position: ContextBarPosition,
    pub pane_sizes: BTreeMap<String, PaneSize>,
    pub collapsed_paths: BTreeMap<String, Vec<String>>,
}
