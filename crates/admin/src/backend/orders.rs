//! Order endpoints: listing and status transitions.
//!
//! Transitions never patch local state; callers re-fetch the authoritative
//! order list after every mutation.

use pappi_core::{OrderId, OrderStatus, RestaurantId};

use super::types::Order;
use super::{BackendClient, BackendError};

impl BackendClient {
    /// Fetch all orders for a restaurant, terminal ones included.
    ///
    /// The board filters out DELIVERED and CANCELLED after the fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn orders(&self, restaurant_id: RestaurantId) -> Result<Vec<Order>, BackendError> {
        let response = self.get(&format!("/orders/{restaurant_id}")).send().await?;
        Self::decode(response).await
    }

    /// Update an order's status.
    ///
    /// `estimated_time` (minutes) accompanies the PENDING → CONFIRMED
    /// transition and is omitted otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        estimated_time: Option<u32>,
    ) -> Result<(), BackendError> {
        let body = match estimated_time {
            Some(minutes) => serde_json::json!({
                "status": status,
                "estimated_time": minutes,
            }),
            None => serde_json::json!({ "status": status }),
        };

        let response = self
            .put(&format!("/orders/{order_id}/status"))
            .json(&body)
            .send()
            .await?;

        Self::expect_success(response).await
    }

    /// Cancel an order via the dedicated cancel endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<(), BackendError> {
        let response = self
            .post(&format!("/orders/cancel/{order_id}"))
            .send()
            .await?;

        Self::expect_success(response).await
    }
}
