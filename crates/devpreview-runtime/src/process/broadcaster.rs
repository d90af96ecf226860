//! Dev-server lifecycle event broadcasting.

use super::events::DevServerEvent;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

pub struct DevServerEventBroadcaster {
    sender: broadcast::Sender<DevServerEvent>,
}

impl DevServerEventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Send to all current subscribers.
    pub fn broadcast(&self, event: DevServerEvent) {
        if self.sender.receiver_count() > 0 {
            debug!(?event, "Broadcasting dev server event");
            let _ = self.sender.send(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DevServerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for DevServerEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
