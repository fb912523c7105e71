//! Kitchen notification bus.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           KdsBus                                        │
//! │                                                                         │
//! │  order handlers ──► publish(KdsEvent) ──► broadcast::Sender            │
//! │                                               │                         │
//! │                           ┌───────────────────┼───────────────────┐    │
//! │                           ▼                   ▼                   ▼    │
//! │                      SSE stream 1        SSE stream 2        SSE ...   │
//! │                      (filter: r1)        (filter: r1)        (r2)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One process-wide broadcast channel carries events for ALL tenants;
//! subscribers filter by restaurant id at delivery. Publishing is
//! fire-and-forget: a send with zero subscribers is normal (kitchen display
//! offline), and a slow subscriber that lags simply drops old events — the
//! display re-fetches state, because events carry ids, not data.
//!
//! The bus is constructed once at startup and handed to handlers through
//! application state, so tests can stand up their own instance and assert on
//! delivery.

use tokio::sync::broadcast;
use tracing::debug;

use tiffin_core::KdsEvent;

/// Broadcast bus for kitchen display events.
#[derive(Debug, Clone)]
pub struct KdsBus {
    tx: broadcast::Sender<KdsEvent>,
}

impl KdsBus {
    /// Creates a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        KdsBus { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Never fails: zero receivers is not an error.
    pub fn publish(&self, event: KdsEvent) {
        let receivers = self.tx.receiver_count();
        debug!(
            event = event.event_name(),
            restaurant_id = event.restaurant_id(),
            receivers,
            "Publishing kitchen event"
        );
        // Err means no subscribers; the event is simply dropped.
        let _ = self.tx.send(event);
    }

    /// Subscribes to the event firehose. The caller filters by tenant.
    pub fn subscribe(&self) -> broadcast::Receiver<KdsEvent> {
        self.tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tiffin_core::OrderStatus;

    fn created(restaurant_id: &str, order_id: &str) -> KdsEvent {
        KdsEvent::OrderCreated {
            restaurant_id: restaurant_id.into(),
            order_id: order_id.into(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = KdsBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(created("r1", "o1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, created("r1", "o1"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let bus = KdsBus::new(16);
        bus.publish(created("r1", "o1")); // must not panic or error
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_each_event() {
        let bus = KdsBus::new(16);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(KdsEvent::OrderUpdated {
            restaurant_id: "r1".into(),
            order_id: "o1".into(),
            status: OrderStatus::Ready,
        });

        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_tenant_filtering_is_subscriber_side() {
        let bus = KdsBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(created("r1", "o1"));
        bus.publish(created("r2", "o2"));
        bus.publish(created("r1", "o3"));

        // A subscriber for r1 sees r2's event on the channel and skips it.
        let mut seen = Vec::new();
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            if event.restaurant_id() == "r1" {
                seen.push(event);
            }
        }
        assert_eq!(seen, vec![created("r1", "o1"), created("r1", "o3")]);
    }
}
