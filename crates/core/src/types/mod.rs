//! Core types for the Pappi admin portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod items;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use items::{OrderItem, OrderItemsError, parse_order_items};
pub use status::*;
