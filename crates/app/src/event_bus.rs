//! In-process event bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use casabus_domain::event::HomeEvent;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HomeEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HomeEvent> {
        self.sender.subscribe()
    }

    /// Subscribe as a stream, for `while let Some(..)`-style observers.
    #[must_use]
    pub fn subscribe_stream(&self) -> BroadcastStream<HomeEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: HomeEvent) {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(event);
    }
}
