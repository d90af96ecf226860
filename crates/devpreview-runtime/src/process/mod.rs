//! Dev-server process management.
//!
//! - `DevServerManager` - spawns, tracks and stops dev servers per workspace
//! - `ServerLogManager` - per-process ring buffers with live subscriptions
//! - `DevServerEvent` / `DevServerEventBroadcaster` - lifecycle broadcasting
//! - `shutdown` - graceful child termination

mod broadcaster;
mod events;
mod logs;
mod manager;
pub mod shutdown;
mod stream;
mod types;

pub use broadcaster::DevServerEventBroadcaster;
pub use events::{DevServerEvent, DevServerStateInfo};
pub use logs::{LogEntry, ServerLogManager};
pub use manager::DevServerManager;
pub use shutdown::{DEFAULT_GRACE_PERIOD, shutdown_child};
pub(crate) use stream::spawn_stream_reader;
pub use types::DevServerSpec;
