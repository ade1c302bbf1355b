//! Change notifications for the UI collaborator

use tokio::sync::broadcast;

use super::types::RecordId;

/// Capacity of the event channel; slow subscribers see `Lagged`
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Emitted after every state-mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A record's displayed fields changed
    RecordChanged(RecordId),
    /// The record list was replaced
    RecordsReplaced,
    /// Hidden mode was switched on or off
    HiddenModeChanged(bool),
    /// A document decoded with the lossy UTF-8 fallback was loaded
    DecodeDegraded { path: String },
}

/// Sending half of the event channel
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ReaderEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReaderEvent> {
        self.sender.subscribe()
    }

    /// Emit an event; having no subscribers is not an error
    pub fn emit(&self, event: ReaderEvent) {
        tracing::trace!(?event, "Emitting reader event");
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        bus.emit(ReaderEvent::RecordsReplaced);

        let mut rx = bus.subscribe();
        bus.emit(ReaderEvent::HiddenModeChanged(true));

        assert_eq!(rx.recv().await.unwrap(), ReaderEvent::HiddenModeChanged(true));
        assert!(rx.try_recv().is_err());
    }
}
