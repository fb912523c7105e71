//! # Kitchen Events
//!
//! Event payloads published to kitchen display streams when orders are
//! created or change status.
//!
//! Events carry ids, never full order bodies. A display that cares fetches
//! the order afresh, so a stale or dropped event can at worst delay a
//! refresh, never show wrong data.

use serde::{Deserialize, Serialize};

use crate::types::OrderStatus;

/// A notification on the kitchen bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KdsEvent {
    /// A new order entered the pipeline.
    #[serde(rename_all = "camelCase")]
    OrderCreated {
        restaurant_id: String,
        order_id: String,
    },
    /// An existing order changed status.
    #[serde(rename_all = "camelCase")]
    OrderUpdated {
        restaurant_id: String,
        order_id: String,
        status: OrderStatus,
    },
}

impl KdsEvent {
    /// The tenant this event belongs to; streams filter on it at delivery.
    pub fn restaurant_id(&self) -> &str {
        match self {
            KdsEvent::OrderCreated { restaurant_id, .. }
            | KdsEvent::OrderUpdated { restaurant_id, .. } => restaurant_id,
        }
    }

    /// SSE event name (`event:` field).
    pub fn event_name(&self) -> &'static str {
        match self {
            KdsEvent::OrderCreated { .. } => "ORDER_CREATED",
            KdsEvent::OrderUpdated { .. } => "ORDER_UPDATED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_created_wire_format() {
        let ev = KdsEvent::OrderCreated {
            restaurant_id: "r1".into(),
            order_id: "o1".into(),
        };
        assert_eq!(
            serde_json::to_string(&ev).unwrap(),
            r#"{"type":"ORDER_CREATED","restaurantId":"r1","orderId":"o1"}"#
        );
        assert_eq!(ev.event_name(), "ORDER_CREATED");
        assert_eq!(ev.restaurant_id(), "r1");
    }

    #[test]
    fn test_order_updated_wire_format() {
        let ev = KdsEvent::OrderUpdated {
            restaurant_id: "r1".into(),
            order_id: "o1".into(),
            status: OrderStatus::Ready,
        };
        assert_eq!(
            serde_json::to_string(&ev).unwrap(),
            r#"{"type":"ORDER_UPDATED","restaurantId":"r1","orderId":"o1","status":"READY"}"#
        );
        assert_eq!(ev.event_name(), "ORDER_UPDATED");
    }
}
