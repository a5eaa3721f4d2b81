// Page-wide event bus
//
// Typed publish/subscribe over a tokio broadcast channel. Every subscriber
// sees every event published after it subscribed, in publish order.
//
// StopFileWatch is also latched on a separate watch channel, so a flood of
// file events can lag a broadcast subscriber without losing the stop.

use crate::models::AppEvent;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Upper bound for the per-subscriber event buffer
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 16;

/// Cloneable handle to the application event bus
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
    /// Generation counter bumped on every StopFileWatch
    stop_tx: Arc<watch::Sender<u64>>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per lagging subscriber.
    ///
    /// `capacity` is clamped to `1..=MAX_CHANNEL_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let clamped = capacity.clamp(1, MAX_CHANNEL_CAPACITY);
        if clamped != capacity {
            tracing::warn!(
                "Event channel capacity {} out of range, using {}",
                capacity,
                clamped
            );
        }

        let (tx, _) = broadcast::channel(clamped);
        let (stop_tx, _) = watch::channel(0);
        Self {
            tx,
            stop_tx: Arc::new(stop_tx),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// # Returns
    /// The number of subscribers that will see the event
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::trace!("Publishing {}", event.name());
        if event == AppEvent::StopFileWatch {
            self.stop_tx
                .send_modify(|generation| *generation = generation.wrapping_add(1));
        }
        // No subscribers is not an error
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Receiver that changes once per StopFileWatch published after this call.
    ///
    /// Unlike [`subscribe`](Self::subscribe) it cannot lag: pending stops
    /// collapse into one change.
    pub fn stop_signals(&self) -> watch::Receiver<u64> {
        self.stop_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(AppEvent::LibrariesReady), 0);
    }

    #[test]
    fn test_multiple_subscribers_receive_in_order() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(AppEvent::LibrariesReady), 2);
        bus.publish(AppEvent::TemplateFileChanged {
            path: PathBuf::from("/chart/Chart.yaml"),
        });

        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(rx.try_recv().unwrap(), AppEvent::LibrariesReady);
            assert!(matches!(
                rx.try_recv().unwrap(),
                AppEvent::TemplateFileChanged { .. }
            ));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_oversized_capacity_is_clamped() {
        let bus = EventBus::new(usize::MAX);
        let mut rx = bus.subscribe();
        bus.publish(AppEvent::LibrariesReady);
        assert_eq!(rx.try_recv().unwrap(), AppEvent::LibrariesReady);
    }

    #[test]
    fn test_stop_signal_survives_lagging_subscriber() {
        let bus = EventBus::new(2);
        let mut events = bus.subscribe();
        let stops = bus.stop_signals();
        assert!(!stops.has_changed().unwrap());

        bus.publish(AppEvent::StopFileWatch);
        for n in 0..8 {
            bus.publish(AppEvent::TemplateFileChanged {
                path: PathBuf::from(format!("/chart/templates/{n}.yaml")),
            });
        }

        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(_))
        ));
        assert!(stops.has_changed().unwrap());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = EventBus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(AppEvent::StopFileWatch);
        assert_eq!(rx.try_recv().unwrap(), AppEvent::StopFileWatch);
    }
}
