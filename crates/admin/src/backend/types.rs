//! Wire types for the Pappi backend API.
//!
//! All entities are server-owned; these are transient, non-authoritative
//! copies deserialized straight off the REST responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pappi_core::{CategoryId, OrderId, OrderStatus, ProductId, RestaurantId, UserId, UserRole};

/// A platform user as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Registration input for the v2 endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub phone: String,
    pub restaurant_name: String,
}

/// Registration response.
///
/// This deployment returns the one-time verification codes directly in the
/// body instead of dispatching them out of band; the portal surfaces them to
/// the operator before the verification step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub email_code: String,
    pub sms_code: String,
    pub message: Option<String>,
}

/// Verification response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub message: String,
}

/// A registration awaiting super-admin approval.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub restaurant_name: Option<String>,
}

/// A restaurant profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Logo reference; may be an absolute URL or a relative upload path.
    pub image_url: Option<String>,
}

/// A menu category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub image_path: Option<String>,
}

/// A product within a category.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub restaurant_id: RestaurantId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_path: Option<String>,
}

/// An order as returned by the orders endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub delivery_address: String,
    /// Estimated preparation time in minutes, set on confirmation.
    pub estimated_time: Option<u32>,
    /// Assigned driver display name, set once a driver takes the order.
    pub driver_name: Option<String>,
    /// Serialized `[{quantity, name}]` item list.
    pub items: Option<String>,
}

/// Aggregate sales totals for the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_sales: Decimal,
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub avg_ticket: Decimal,
    #[serde(default)]
    pub pending_orders: i64,
}

/// One point of the sales time series.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesPoint {
    pub date: String,
    pub sales: f64,
}

/// One slice of the order-status distribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSlice {
    pub name: String,
    pub value: i64,
    pub raw_status: Option<String>,
}

/// An image payload attached to a multipart write.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Fields for creating or updating a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub image: Option<ImagePayload>,
}

/// Fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub restaurant_id: RestaurantId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<ImagePayload>,
}

/// Fields for updating a restaurant profile.
#[derive(Debug, Clone)]
pub struct RestaurantUpdate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<ImagePayload>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserialize() {
        let json = r#"{
            "id": 5,
            "restaurant_id": 2,
            "status": "DRIVER_ASSIGNED",
            "total_price": "23.50",
            "delivery_address": "Calle Falsa 123",
            "estimated_time": 30,
            "driver_name": "Marcos",
            "items": "[{\"quantity\":1,\"name\":\"Pizza\"}]"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::new(5));
        assert_eq!(order.status, OrderStatus::DriverAssigned);
        assert_eq!(order.total_price, Decimal::new(2350, 2));
        assert_eq!(order.driver_name.as_deref(), Some("Marcos"));
    }

    #[test]
    fn test_order_optional_fields_absent() {
        let json = r#"{
            "id": 1,
            "restaurant_id": 2,
            "status": "PENDING",
            "total_price": "10.00",
            "delivery_address": "Av. Siempreviva 742",
            "estimated_time": null,
            "driver_name": null,
            "items": null
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert!(order.estimated_time.is_none());
        assert!(order.driver_name.is_none());
        assert!(order.items.is_none());
    }

    #[test]
    fn test_register_response_camel_case() {
        let json = r#"{"userId":9,"emailCode":"123456","smsCode":"654321","message":"ok"}"#;
        let resp: RegisterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.user_id, UserId::new(9));
        assert_eq!(resp.email_code, "123456");
        assert_eq!(resp.sms_code, "654321");
    }

    #[test]
    fn test_summary_defaults_missing_fields() {
        let summary: AnalyticsSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.total_sales, Decimal::ZERO);
    }
}
