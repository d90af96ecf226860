//! SQLite adapters for the devpreview repository ports.
//!
//! ```rust,no_run
//! use devpreview_db::{CoreFactory, setup_database};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = setup_database(Path::new("/tmp/devpreview.db")).await?;
//! let repos = CoreFactory::build_repos(pool);
//! # let _ = repos;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// libsqlite3-sys is only here to pin the bundled SQLite build
use libsqlite3_sys as _;

pub use factory::CoreFactory;

#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

pub use repositories::{
    SqliteScratchRepository, SqliteSettingsRepository, SqliteUiPreferencesRepository,
};

pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
