//! Dev-server process runtime.
//!
//! [`DevServerManager`] spawns each workspace's dev-server script, pipes its
//! output into a [`ServerLogManager`] and reports lifecycle changes through a
//! [`DevServerEventBroadcaster`]. It implements the core
//! [`DevServerControl`](devpreview_core::DevServerControl) port, and the log
//! manager implements [`LogStreamReader`](devpreview_core::LogStreamReader).

#![deny(unsafe_code)]

mod command;
pub mod process;

pub use command::build_command;
pub use process::{
    DEFAULT_GRACE_PERIOD, DevServerEvent, DevServerEventBroadcaster, DevServerManager,
    DevServerSpec, DevServerStateInfo, LogEntry, ServerLogManager, shutdown_child,
};
