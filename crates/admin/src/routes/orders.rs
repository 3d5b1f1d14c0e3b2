//! Order board handlers.
//!
//! The board always renders the authoritative snapshot: it re-fetches on
//! every page load (the page refreshes itself every 15 seconds) and after
//! every status transition. Realtime events queue notifications but never
//! patch order state locally.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use pappi_core::{OrderId, OrderStatus, parse_order_items};

use crate::backend::Order;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::realtime::EmitEvent;
use crate::state::AppState;

/// Seconds between automatic board refreshes.
pub const BOARD_REFRESH_SECONDS: u32 = 15;

// =============================================================================
// View Types
// =============================================================================

/// Shell header data shared by authenticated pages.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub restaurant_name: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            restaurant_name: admin.restaurant_name.clone(),
        }
    }
}

/// One line item for display.
#[derive(Debug, Clone)]
pub struct ItemView {
    pub quantity: u32,
    pub name: String,
}

/// One order card on the board.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub total: String,
    pub address: String,
    /// Estimated minutes as display text; empty when unset.
    pub estimated: String,
    /// Driver name; empty when unassigned.
    pub driver: String,
    pub items: Vec<ItemView>,
    pub can_confirm: bool,
    pub can_ready: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let items = parse_order_items(order.items.as_deref())
            .unwrap_or_else(|e| {
                tracing::warn!(order_id = %order.id, "unparseable item list: {e}");
                Vec::new()
            })
            .into_iter()
            .map(|item| ItemView {
                quantity: item.quantity,
                name: item.name,
            })
            .collect();

        Self {
            id: order.id.as_i32(),
            total: format!("${}", order.total_price),
            address: order.delivery_address.clone(),
            estimated: order
                .estimated_time
                .map(|minutes| format!("{minutes} min"))
                .unwrap_or_default(),
            driver: order.driver_name.clone().unwrap_or_default(),
            items,
            can_confirm: order.status == OrderStatus::Pending,
            can_ready: order.status == OrderStatus::Confirmed,
        }
    }
}

/// A status section of the board.
#[derive(Debug, Clone)]
pub struct StatusGroupView {
    pub label: String,
    pub css_class: String,
    pub count: usize,
    pub orders: Vec<OrderView>,
}

/// A realtime notification line.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub message: String,
    pub time: String,
}

// =============================================================================
// Grouping
// =============================================================================

/// Drop terminal orders and group the rest by status in lifecycle order.
///
/// Statuses with no orders produce no group.
#[must_use]
pub fn group_active_orders(orders: &[Order]) -> Vec<(OrderStatus, Vec<&Order>)> {
    OrderStatus::ALL
        .iter()
        .filter(|status| !status.is_terminal())
        .filter_map(|status| {
            let group: Vec<&Order> = orders.iter().filter(|o| o.status == *status).collect();
            if group.is_empty() {
                None
            } else {
                Some((*status, group))
            }
        })
        .collect()
}

/// CSS class for a status section header.
fn status_css_class(status: OrderStatus) -> String {
    format!("status-{}", status.as_str().to_lowercase().replace('_', "-"))
}

// =============================================================================
// Board Page
// =============================================================================

/// Order board template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub refresh_seconds: u32,
    pub groups: Vec<StatusGroupView>,
    pub notifications: Vec<NotificationView>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Query parameters for flash display.
#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Order board page handler.
#[instrument(skip(admin, state))]
pub async fn board(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Html<String> {
    let orders = match state.backend().orders(admin.restaurant_id).await {
        Ok(orders) => orders,
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            Vec::new()
        }
    };

    let groups: Vec<StatusGroupView> = group_active_orders(&orders)
        .into_iter()
        .map(|(status, group)| StatusGroupView {
            label: status.label().to_string(),
            css_class: status_css_class(status),
            count: group.len(),
            orders: group.into_iter().map(OrderView::from).collect(),
        })
        .collect();

    let notifications: Vec<NotificationView> = state
        .realtime()
        .drain_notifications(admin.restaurant_id)
        .into_iter()
        .map(|n| NotificationView {
            message: n.message,
            time: n.at.format("%H:%M:%S").to_string(),
        })
        .collect();

    let template = OrdersTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        refresh_seconds: BOARD_REFRESH_SECONDS,
        groups,
        notifications,
        error: query.error,
        notice: query.notice,
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

// =============================================================================
// Action Handlers
// =============================================================================

/// Input for confirming an order.
#[derive(Debug, Deserialize)]
pub struct ConfirmInput {
    /// Estimated preparation time in minutes.
    pub estimated_time: String,
}

/// Confirm a PENDING order with an estimated time.
///
/// Sends the status update, emits the realtime notification for downstream
/// consumers, and sends the operator back to a fresh board.
#[instrument(skip(admin, state))]
pub async fn confirm(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(input): Form<ConfirmInput>,
) -> Response {
    let order_id = OrderId::new(id);

    let Ok(minutes) = input.estimated_time.trim().parse::<u32>() else {
        return Redirect::to("/orders?error=estimated_time").into_response();
    };
    if minutes == 0 {
        return Redirect::to("/orders?error=estimated_time").into_response();
    }

    if let Err(e) = state
        .backend()
        .update_order_status(order_id, OrderStatus::Confirmed, Some(minutes))
        .await
    {
        tracing::error!(%order_id, "Failed to confirm order: {e}");
        return Redirect::to("/orders?error=confirm_failed").into_response();
    }

    // Notify downstream consumers (delivery side). Failure is non-fatal:
    // the status update already happened and the board re-fetches anyway.
    if let Err(e) = state.realtime().emit(
        admin.restaurant_id,
        &EmitEvent::ConfirmOrder {
            order_id,
            estimated_time: minutes,
        },
    ) {
        tracing::warn!(%order_id, "confirm_order emit failed: {e}");
    }

    tracing::info!(%order_id, minutes, "order confirmed");
    Redirect::to("/orders?notice=confirmed").into_response()
}

/// Mark a CONFIRMED order as READY for pickup.
#[instrument(skip(admin, state))]
pub async fn ready(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let order_id = OrderId::new(id);

    if let Err(e) = state
        .backend()
        .update_order_status(order_id, OrderStatus::Ready, None)
        .await
    {
        tracing::error!(%order_id, "Failed to mark order ready: {e}");
        return Redirect::to("/orders?error=ready_failed").into_response();
    }

    if let Err(e) = state
        .realtime()
        .emit(admin.restaurant_id, &EmitEvent::MarkReady { order_id })
    {
        tracing::warn!(%order_id, "mark_ready emit failed: {e}");
    }

    tracing::info!(%order_id, "order marked ready");
    Redirect::to("/orders?notice=ready").into_response()
}

/// Cancel an active order via the dedicated endpoint.
#[instrument(skip(_admin, state))]
pub async fn cancel(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let order_id = OrderId::new(id);

    if let Err(e) = state.backend().cancel_order(order_id).await {
        tracing::error!(%order_id, "Failed to cancel order: {e}");
        return Redirect::to("/orders?error=cancel_failed").into_response();
    }

    tracing::info!(%order_id, "order cancelled");
    Redirect::to("/orders?notice=cancelled").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pappi_core::RestaurantId;
    use rust_decimal::Decimal;

    fn order(id: i32, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            restaurant_id: RestaurantId::new(1),
            status,
            total_price: Decimal::new(1999, 2),
            delivery_address: "Calle Falsa 123".to_string(),
            estimated_time: None,
            driver_name: None,
            items: None,
        }
    }

    #[test]
    fn test_terminal_orders_excluded() {
        let orders = vec![
            order(1, OrderStatus::Pending),
            order(2, OrderStatus::Delivered),
            order(3, OrderStatus::Cancelled),
            order(4, OrderStatus::Ready),
        ];

        let groups = group_active_orders(&orders);
        let grouped_ids: Vec<i32> = groups
            .iter()
            .flat_map(|(_, orders)| orders.iter().map(|o| o.id.as_i32()))
            .collect();

        assert_eq!(grouped_ids, vec![1, 4]);
    }

    #[test]
    fn test_groups_follow_lifecycle_order() {
        let orders = vec![
            order(1, OrderStatus::PickedUp),
            order(2, OrderStatus::Pending),
            order(3, OrderStatus::Confirmed),
            order(4, OrderStatus::Pending),
        ];

        let groups = group_active_orders(&orders);
        let statuses: Vec<OrderStatus> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::PickedUp
            ]
        );

        // Both pending orders land in the first group
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_empty_statuses_produce_no_group() {
        let orders = vec![order(1, OrderStatus::Pending)];
        let groups = group_active_orders(&orders);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_all_terminal_is_empty_board() {
        let orders = vec![
            order(1, OrderStatus::Delivered),
            order(2, OrderStatus::Cancelled),
        ];
        assert!(group_active_orders(&orders).is_empty());
    }

    #[test]
    fn test_order_view_action_flags() {
        let pending = OrderView::from(&order(1, OrderStatus::Pending));
        assert!(pending.can_confirm);
        assert!(!pending.can_ready);

        let confirmed = OrderView::from(&order(2, OrderStatus::Confirmed));
        assert!(!confirmed.can_confirm);
        assert!(confirmed.can_ready);

        let assigned = OrderView::from(&order(3, OrderStatus::DriverAssigned));
        assert!(!assigned.can_confirm);
        assert!(!assigned.can_ready);
    }

    #[test]
    fn test_order_view_carries_estimate_and_items() {
        let mut o = order(1, OrderStatus::Confirmed);
        o.estimated_time = Some(30);
        o.driver_name = Some("Marcos".to_string());
        o.items = Some(r#"[{"quantity":2,"name":"Pizza"}]"#.to_string());

        let view = OrderView::from(&o);
        assert_eq!(view.estimated, "30 min");
        assert_eq!(view.driver, "Marcos");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.total, "$19.99");
    }

    #[test]
    fn test_status_css_class() {
        assert_eq!(
            status_css_class(OrderStatus::DriverAssigned),
            "status-driver-assigned"
        );
        assert_eq!(status_css_class(OrderStatus::Pending), "status-pending");
    }
}
