use std::sync::Arc;

use tokio::sync::broadcast;

use agora_types::events::PushEvent;

/// Process-wide push-channel relay. Every connected client receives every
/// broadcast event; there is no per-user targeting or room segmentation.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    broadcast_tx: broadcast::Sender<PushEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner { broadcast_tx }),
        }
    }

    /// Subscribe to push events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients. Fire-and-forget: zero
    /// receivers is not an error.
    pub fn broadcast(&self, event: PushEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
