//! Broadcast event bus for distributing `RoomEvent` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`, the bus supports multiple concurrent
//! subscribers. Publishing with no active subscribers is a no-op.

use medbridge_types::event::RoomEvent;
use tokio::sync::broadcast;

/// Multi-consumer bus for room events.
///
/// Cloning the bus clones the sender, allowing multiple producers and consumers.
#[derive(Clone)]
pub struct RoomEventBus {
    sender: broadcast::Sender<RoomEvent>,
}

impl RoomEventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: RoomEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for RoomEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for RoomEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomEventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbridge_types::message::RoomId;

    fn sample_event(message_id: i64) -> RoomEvent {
        RoomEvent::MessageAppended {
            room_id: RoomId::from("Room-1"),
            message_id,
        }
    }

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = RoomEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(sample_event(1));

        let received = rx.recv().await.unwrap();
        assert_eq!(received, sample_event(1));
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = RoomEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();

        bus.publish(sample_event(2));

        assert_eq!(rx1.recv().await.unwrap(), sample_event(2));
        assert_eq!(rx2.recv().await.unwrap(), sample_event(2));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = RoomEventBus::new(16);
        bus.publish(sample_event(1));
        bus.publish(sample_event(2));
    }

    #[tokio::test]
    async fn lagged_receiver_handles_gracefully() {
        let bus = RoomEventBus::new(4);
        let mut rx = bus.subscribe();

        for i in 0..10 {
            bus.publish(sample_event(i));
        }

        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => assert!(n > 0),
            other => panic!("expected Lagged, got {other:?}"),
        }
        assert!(rx.recv().await.is_ok());
    }
}
