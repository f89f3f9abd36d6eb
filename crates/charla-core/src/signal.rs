//! Broadcast bus for signals the presentation layer should react to.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active subscribers
//! is a no-op; the orchestrator never blocks on the UI.

use tokio::sync::broadcast;

/// Out-of-band notifications for the orchestrator's caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    /// The session expired mid-conversation; navigate to the login surface.
    /// Emitted after a fixed delay so the user can read the expiry notice.
    RedirectToLogin,
}

/// Multi-consumer signal bus.
///
/// Cloning the bus clones the sender, allowing multiple producers and
/// consumers.
#[derive(Clone)]
pub struct SignalBus {
    sender: broadcast::Sender<UiSignal>,
}

impl SignalBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future signals.
    pub fn subscribe(&self) -> broadcast::Receiver<UiSignal> {
        self.sender.subscribe()
    }

    /// Publish a signal to all current subscribers.
    pub fn publish(&self, signal: UiSignal) {
        let _ = self.sender.send(signal);
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = SignalBus::default();
        let mut rx = bus.subscribe();
        bus.publish(UiSignal::RedirectToLogin);
        assert_eq!(rx.recv().await.unwrap(), UiSignal::RedirectToLogin);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = SignalBus::default();
        bus.publish(UiSignal::RedirectToLogin);
    }
}
