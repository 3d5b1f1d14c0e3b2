//! Realtime channel event types.
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}` in both
//! directions. The portal emits `register_admin`, `confirm_order`, and
//! `mark_ready`; it listens for the four order-lifecycle events pushed by
//! the backend.

use serde::{Deserialize, Serialize};

use pappi_core::{OrderId, RestaurantId};

/// Outgoing events emitted by the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitEvent {
    /// Register this connection as the admin of a restaurant.
    RegisterAdmin { restaurant_id: RestaurantId },
    /// Notify downstream consumers (drivers) that an order was confirmed.
    ConfirmOrder {
        order_id: OrderId,
        estimated_time: u32,
    },
    /// Notify available drivers that an order is ready for pickup.
    MarkReady { order_id: OrderId },
}

impl EmitEvent {
    /// Serialize to the wire frame.
    #[must_use]
    pub fn to_frame(&self) -> String {
        let frame = match self {
            Self::RegisterAdmin { restaurant_id } => serde_json::json!({
                "event": "register_admin",
                "data": { "restaurantId": restaurant_id },
            }),
            Self::ConfirmOrder {
                order_id,
                estimated_time,
            } => serde_json::json!({
                "event": "confirm_order",
                "data": { "orderId": order_id, "estimatedTime": estimated_time },
            }),
            Self::MarkReady { order_id } => serde_json::json!({
                "event": "mark_ready",
                "data": { "orderId": order_id },
            }),
        };
        frame.to_string()
    }
}

/// Incoming order-lifecycle events pushed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminEvent {
    /// A customer placed a new order.
    NewOrder { total_price: Option<String> },
    /// A driver accepted the order.
    DriverAssigned {
        order_id: Option<OrderId>,
        driver_name: String,
    },
    /// The driver picked the order up.
    OrderPickedUp { order_id: Option<OrderId> },
    /// The order was delivered.
    OrderCompleted { order_id: Option<OrderId> },
}

/// Raw wire frame.
#[derive(Debug, Deserialize, Serialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl AdminEvent {
    /// Parse an incoming text frame.
    ///
    /// Returns `None` for unknown events or frames that do not parse; the
    /// reader ignores them rather than dropping the connection.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let frame: Frame = serde_json::from_str(text).ok()?;
        let data = &frame.data;

        match frame.event.as_str() {
            "new_order" => Some(Self::NewOrder {
                total_price: data
                    .get("totalPrice")
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    }),
            }),
            "driver_assigned_admin" => Some(Self::DriverAssigned {
                order_id: data
                    .get("orderId")
                    .and_then(serde_json::Value::as_i64)
                    .and_then(|id| i32::try_from(id).ok())
                    .map(OrderId::new),
                driver_name: data
                    .get("driverName")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("a driver")
                    .to_string(),
            }),
            "order_picked_up_admin" => Some(Self::OrderPickedUp {
                order_id: parse_order_id(data),
            }),
            "order_completed" => Some(Self::OrderCompleted {
                order_id: parse_order_id(data),
            }),
            _ => None,
        }
    }

    /// Human-readable notification line for the order board.
    #[must_use]
    pub fn notification_text(&self) -> String {
        match self {
            Self::NewOrder { total_price } => match total_price {
                Some(total) => format!("New order received (${total})"),
                None => "New order received".to_string(),
            },
            Self::DriverAssigned {
                order_id,
                driver_name,
            } => match order_id {
                Some(id) => format!("Driver {driver_name} assigned to order #{id}"),
                None => format!("Driver {driver_name} assigned"),
            },
            Self::OrderPickedUp { order_id } => match order_id {
                Some(id) => format!("Order #{id} picked up"),
                None => "Order picked up".to_string(),
            },
            Self::OrderCompleted { order_id } => match order_id {
                Some(id) => format!("Order #{id} delivered"),
                None => "Order delivered".to_string(),
            },
        }
    }
}

fn parse_order_id(data: &serde_json::Value) -> Option<OrderId> {
    data.get("orderId")
        .and_then(serde_json::Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .map(OrderId::new)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_register_admin_frame() {
        let frame = EmitEvent::RegisterAdmin {
            restaurant_id: RestaurantId::new(4),
        }
        .to_frame();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "register_admin");
        assert_eq!(value["data"]["restaurantId"], 4);
    }

    #[test]
    fn test_emit_confirm_order_frame() {
        let frame = EmitEvent::ConfirmOrder {
            order_id: OrderId::new(17),
            estimated_time: 30,
        }
        .to_frame();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["event"], "confirm_order");
        assert_eq!(value["data"]["orderId"], 17);
        assert_eq!(value["data"]["estimatedTime"], 30);
    }

    #[test]
    fn test_parse_new_order() {
        let event =
            AdminEvent::parse(r#"{"event":"new_order","data":{"totalPrice":"42.00"}}"#).unwrap();
        assert_eq!(
            event,
            AdminEvent::NewOrder {
                total_price: Some("42.00".to_string())
            }
        );
        assert_eq!(event.notification_text(), "New order received ($42.00)");
    }

    #[test]
    fn test_parse_driver_assigned() {
        let event = AdminEvent::parse(
            r#"{"event":"driver_assigned_admin","data":{"orderId":9,"driverName":"Marcos"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            AdminEvent::DriverAssigned {
                order_id: Some(OrderId::new(9)),
                driver_name: "Marcos".to_string(),
            }
        );
        assert_eq!(
            event.notification_text(),
            "Driver Marcos assigned to order #9"
        );
    }

    #[test]
    fn test_parse_lifecycle_events() {
        let picked =
            AdminEvent::parse(r#"{"event":"order_picked_up_admin","data":{"orderId":3}}"#).unwrap();
        assert_eq!(
            picked,
            AdminEvent::OrderPickedUp {
                order_id: Some(OrderId::new(3))
            }
        );

        let completed =
            AdminEvent::parse(r#"{"event":"order_completed","data":{"orderId":3}}"#).unwrap();
        assert_eq!(
            completed,
            AdminEvent::OrderCompleted {
                order_id: Some(OrderId::new(3))
            }
        );
    }

    #[test]
    fn test_parse_unknown_event_ignored() {
        assert!(AdminEvent::parse(r#"{"event":"driver_location","data":{}}"#).is_none());
        assert!(AdminEvent::parse("not json at all").is_none());
    }

    #[test]
    fn test_parse_missing_data_tolerated() {
        let event = AdminEvent::parse(r#"{"event":"new_order"}"#).unwrap();
        assert_eq!(event, AdminEvent::NewOrder { total_price: None });
    }
}
