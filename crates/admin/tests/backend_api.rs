//! Backend client tests against a mocked Pappi API.
//!
//! These exercise the wire contracts: request shapes, the tunnel-bypass
//! headers, error-body decoding, and the board's terminal-status filtering
//! on real response payloads.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pappi_admin::backend::{BackendClient, BackendError, TimeRange};
use pappi_admin::config::BackendConfig;
use pappi_admin::routes::orders::group_active_orders;
use pappi_core::{AccountStatus, OrderId, OrderStatus, RestaurantId, UserId};

fn client_for(server: &MockServer) -> BackendClient {
    let config = BackendConfig {
        api_url: format!("{}/api", server.uri()),
        socket_url: "ws://127.0.0.1:1/ws".to_string(),
    };
    BackendClient::new(&config).expect("client builds")
}

#[tokio::test]
async fn login_decodes_user_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("bypass-tunnel-reminder", "true"))
        .and(header("pinggy-skip-browser-warning", "true"))
        .and(body_json(json!({
            "email": "owner@example.com",
            "password": "hunter2!"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": 7,
                "name": "Ana",
                "email": "owner@example.com",
                "role": "admin",
                "phone": "555-0100"
            },
            "token": "tok_abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let login = client.login("owner@example.com", "hunter2!").await.unwrap();

    assert_eq!(login.user.id, UserId::new(7));
    assert_eq!(login.user.name, "Ana");
    assert_eq!(login.token, "tok_abc123");
}

#[tokio::test]
async fn login_surfaces_account_status_codes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "Account awaiting verification",
            "code": "NOT_VERIFIED",
            "userId": 7
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .login("owner@example.com", "hunter2!")
        .await
        .unwrap_err();

    assert_eq!(err.account_status(), Some(AccountStatus::NotVerified));
    match err {
        BackendError::Api {
            status, user_id, ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(user_id, Some(UserId::new(7)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn orders_decode_and_board_filters_terminal_statuses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "restaurant_id": 4,
                "status": "PENDING",
                "total_price": "12.00",
                "delivery_address": "Calle Falsa 123",
                "estimated_time": null,
                "driver_name": null,
                "items": "[{\"quantity\":1,\"name\":\"Pizza\"}]"
            },
            {
                "id": 2,
                "restaurant_id": 4,
                "status": "DELIVERED",
                "total_price": "30.00",
                "delivery_address": "Av. Siempreviva 742",
                "estimated_time": 25,
                "driver_name": "Marcos",
                "items": null
            },
            {
                "id": 3,
                "restaurant_id": 4,
                "status": "CANCELLED",
                "total_price": "8.00",
                "delivery_address": "Calle 9",
                "estimated_time": null,
                "driver_name": null,
                "items": null
            },
            {
                "id": 4,
                "restaurant_id": 4,
                "status": "READY",
                "total_price": "15.50",
                "delivery_address": "Calle 10",
                "estimated_time": 20,
                "driver_name": null,
                "items": null
            }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let orders = client.orders(RestaurantId::new(4)).await.unwrap();
    assert_eq!(orders.len(), 4);

    let groups = group_active_orders(&orders);
    let grouped_ids: Vec<i32> = groups
        .iter()
        .flat_map(|(_, group)| group.iter().map(|o| o.id.as_i32()))
        .collect();

    // DELIVERED and CANCELLED never reach the board
    assert_eq!(grouped_ids, vec![1, 4]);
    assert_eq!(groups[0].0, OrderStatus::Pending);
    assert_eq!(groups[1].0, OrderStatus::Ready);
}

#[tokio::test]
async fn confirm_sends_status_and_estimated_time() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/orders/9/status"))
        .and(body_json(json!({
            "status": "CONFIRMED",
            "estimated_time": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .update_order_status(OrderId::new(9), OrderStatus::Confirmed, Some(30))
        .await
        .unwrap();
}

#[tokio::test]
async fn ready_omits_estimated_time() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/orders/9/status"))
        .and(body_json(json!({ "status": "READY" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .update_order_status(OrderId::new(9), OrderStatus::Ready, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn cancel_uses_dedicated_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders/cancel/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.cancel_order(OrderId::new(3)).await.unwrap();
}

#[tokio::test]
async fn analytics_pass_range_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/menu/analytics/summary/4"))
        .and(query_param("range", "week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSales": "250.00",
            "totalOrders": 12,
            "avgTicket": "20.83",
            "pendingOrders": 2
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let summary = client
        .analytics_summary(RestaurantId::new(4), &TimeRange::Week)
        .await
        .unwrap();

    assert_eq!(summary.total_orders, 12);
    assert_eq!(summary.pending_orders, 2);
}

#[tokio::test]
async fn analytics_custom_range_sends_bounds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/menu/analytics/sales-chart/4"))
        .and(query_param("range", "custom"))
        .and(query_param("start", "2025-02-01"))
        .and(query_param("end", "2025-02-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"date": "2025-02-01", "sales": 10.0},
            {"date": "2025-02-02", "sales": 20.5}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let range = TimeRange::from_query(Some("custom"), Some("2025-02-01"), Some("2025-02-28"));
    let points = client.sales_chart(RestaurantId::new(4), &range).await.unwrap();

    assert_eq!(points.len(), 2);
    assert!((points[1].sales - 20.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn pending_approve_reject_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 11,
                "name": "Luis",
                "email": "luis@example.com",
                "phone": "555-0101",
                "role": "admin",
                "restaurant_name": "Tacos Luis"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/approve"))
        .and(body_json(json!({ "userId": 11 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/reject"))
        .and(body_json(json!({ "userId": 11 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let pending = client.pending_users().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].restaurant_name.as_deref(), Some("Tacos Luis"));

    client.approve_user(UserId::new(11)).await.unwrap();
    client.reject_user(UserId::new(11)).await.unwrap();
}

#[tokio::test]
async fn self_healing_creates_restaurant_for_owner() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/menu/restaurants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/menu/restaurants"))
        .and(body_json(json!({
            "owner_id": 7,
            "name": "Ana",
            "category": "General"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "owner_id": 7,
            "name": "Ana",
            "description": null,
            "category": "General",
            "latitude": null,
            "longitude": null,
            "image_url": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let existing = client.restaurants().await.unwrap();
    assert!(existing.iter().all(|r| r.owner_id != UserId::new(7)));

    let created = client
        .create_restaurant(UserId::new(7), "Ana", "General")
        .await
        .unwrap();
    assert_eq!(created.id, RestaurantId::new(4));
    assert_eq!(created.owner_id, UserId::new(7));
}

#[tokio::test]
async fn category_write_posts_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/menu/categories"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let input = pappi_admin::backend::CategoryInput {
        restaurant_id: RestaurantId::new(4),
        name: "Burgers".to_string(),
        image: Some(pappi_admin::backend::ImagePayload {
            bytes: vec![0xFF, 0xD8, 0xFF],
            file_name: "burger.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }),
    };

    client.create_category(&input).await.unwrap();
}

#[tokio::test]
async fn non_json_error_body_degrades_gracefully() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/4"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.orders(RestaurantId::new(4)).await.unwrap_err();

    match err {
        BackendError::Api { status, code, .. } => {
            assert_eq!(status, 502);
            assert_eq!(code, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
