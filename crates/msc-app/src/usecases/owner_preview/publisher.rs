use msc_core::PublishedState;
use tokio::sync::mpsc;

/// Fan-out of [`PublishedState`] snapshots to every subscriber.
///
/// Each subscriber has its own unbounded queue, so no publication is coalesced
/// away and all subscribers observe the same order.
pub(super) struct Publisher {
    current: PublishedState,
    subscribers: Vec<mpsc::UnboundedSender<PublishedState>>,
    closed: bool,
}

impl Publisher {
    pub(super) fn new() -> Self {
        Self {
            current: PublishedState::cleared(),
            subscribers: Vec::new(),
            closed: false,
        }
    }

    pub(super) fn current(&self) -> &PublishedState {
        &self.current
    }

    pub(super) fn publish(&mut self, state: PublishedState) {
        if self.closed {
            return;
        }
        self.current = state;
        let current = &self.current;
        self.subscribers
            .retain(|subscriber| subscriber.send(current.clone()).is_ok());
    }

    pub(super) fn subscribe(&mut self) -> PreviewSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // Fresh receiver, cannot fail.
        let _ = tx.send(self.current.clone());
        if !self.closed {
            self.subscribers.push(tx);
        }
        PreviewSubscription { rx }
    }

    /// Ends every subscription once its queued snapshots are drained.
    pub(super) fn close(&mut self) {
        self.closed = true;
        self.subscribers.clear();
    }
}

/// Stream of preview snapshots. The first item is the state current at
/// subscription time.
#[derive(Debug)]
pub struct PreviewSubscription {
    rx: mpsc::UnboundedReceiver<PublishedState>,
}

impl PreviewSubscription {
    /// Next snapshot, or `None` after the session was torn down and every
    /// queued snapshot has been delivered.
    pub async fn next(&mut self) -> Option<PublishedState> {
        self.rx.recv().await
    }

    /// Next already-queued snapshot without waiting.
    pub fn try_next(&mut self) -> Option<PublishedState> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next snapshot that has nothing left in flight.
    pub async fn next_settled(&mut self) -> Option<PublishedState> {
        while let Some(state) = self.next().await {
            if !state.loading {
                return Some(state);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msc_core::{OwnerId, PreviewEntry};

    fn loading_state(id: &str) -> PublishedState {
        PublishedState {
            entries: vec![PreviewEntry::loading(OwnerId::from(id))],
            loading: true,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_current_then_every_publication() {
        let mut publisher = Publisher::new();
        let mut sub = publisher.subscribe();

        publisher.publish(loading_state("1"));
        publisher.publish(PublishedState::cleared());

        assert_eq!(sub.try_next(), Some(PublishedState::cleared()));
        assert_eq!(sub.try_next(), Some(loading_state("1")));
        assert_eq!(sub.try_next(), Some(PublishedState::cleared()));
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test]
    async fn test_close_ends_subscriptions_after_drain() {
        let mut publisher = Publisher::new();
        let mut sub = publisher.subscribe();
        publisher.publish(loading_state("1"));
        publisher.close();
        publisher.publish(loading_state("2"));

        assert_eq!(sub.next().await, Some(PublishedState::cleared()));
        assert_eq!(sub.next().await, Some(loading_state("1")));
        assert_eq!(sub.next().await, None);
        assert_eq!(publisher.current(), &loading_state("1"));
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let mut publisher = Publisher::new();
        let sub = publisher.subscribe();
        drop(sub);
        publisher.publish(loading_state("1"));
        assert!(publisher.subscribers.is_empty());
    }
}
