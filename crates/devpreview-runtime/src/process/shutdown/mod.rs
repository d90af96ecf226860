//! Graceful dev-server shutdown.

mod child;

pub use child::{DEFAULT_GRACE_PERIOD, shutdown_child};
