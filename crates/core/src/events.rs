//! Configuration change bus
//!
//! An explicit event-bus object passed by reference into the credential
//! store and each subscriber, so lifetime and testability are explicit.
//! The store emits only after persistence has fully completed; subscribers
//! therefore never observe the configuration in an intermediate state.

use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 16;

/// What changed in the persisted configuration.
///
/// Events are intentionally thin: subscribers reload the configuration from
/// the store rather than trusting a payload that may already be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEvent {
    ConnectionAdded,
    ConnectionUpdated,
    ConnectionRemoved,
    ActiveConnectionChanged,
    Cleared,
}

/// Cloneable handle to the configuration change channel.
#[derive(Debug, Clone)]
pub struct ConfigEvents {
    sender: broadcast::Sender<ConfigEvent>,
}

impl ConfigEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future configuration changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.sender.subscribe()
    }

    /// Announce a change. Emitting with no subscribers is not an error.
    pub fn emit(&self, event: ConfigEvent) {
        debug!(?event, "configuration changed");
        let _ = self.sender.send(event);
    }
}

impl Default for ConfigEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let events = ConfigEvents::new();
        let mut rx = events.subscribe();

        events.emit(ConfigEvent::ConnectionAdded);

        assert_eq!(rx.recv().await.unwrap(), ConfigEvent::ConnectionAdded);
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let events = ConfigEvents::new();
        let mut first = events.subscribe();
        let mut second = events.subscribe();

        events.emit(ConfigEvent::Cleared);

        assert_eq!(first.recv().await.unwrap(), ConfigEvent::Cleared);
        assert_eq!(second.recv().await.unwrap(), ConfigEvent::Cleared);
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        let events = ConfigEvents::new();
        events.emit(ConfigEvent::ConnectionRemoved);
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let events = ConfigEvents::new();
        let cloned = events.clone();
        let mut rx = events.subscribe();

        cloned.emit(ConfigEvent::ActiveConnectionChanged);

        assert_eq!(rx.recv().await.unwrap(), ConfigEvent::ActiveConnectionChanged);
    }
}
