//! Order item-list parsing.
//!
//! Orders carry their line items as a serialized JSON array of
//! `{quantity, name}` pairs in a single string field. The backend owns the
//! encoding; the portal only needs to read it for display.

use serde::{Deserialize, Serialize};

/// A single line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Number of units ordered.
    pub quantity: u32,
    /// Product name at the time of ordering.
    pub name: String,
}

/// Errors that can occur when parsing an order's item-list field.
#[derive(thiserror::Error, Debug)]
pub enum OrderItemsError {
    /// The field was not valid JSON for a list of items.
    #[error("invalid item list: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Parse the serialized item-list field of an order.
///
/// An empty or missing field is an empty item list, not an error; the
/// backend omits the field for legacy orders.
///
/// # Errors
///
/// Returns an error if the field is present but not a JSON array of
/// `{quantity, name}` pairs.
pub fn parse_order_items(raw: Option<&str>) -> Result<Vec<OrderItem>, OrderItemsError> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => Ok(serde_json::from_str(s)?),
    }
}
