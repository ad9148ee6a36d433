//! Integration tests for `StoreClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use storefront_checkout::{classify_backend_message, CheckoutError, OrderGateway};
use storefront_core::{NewOrder, NewOrderItem, ServiceType, StockAdjustment};
use storefront_store::{StoreClient, StoreError};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORDER_ID: &str = "7f3c2a9e-51b4-4d0c-9a77-0c9e1d2b4fab";

fn test_client(base_url: &str) -> StoreClient {
    StoreClient::with_base_url(base_url, "test-key", 30)
        .expect("client construction should not fail")
}

fn new_order() -> NewOrder {
    NewOrder {
        customer_name: "Ana Cruz".to_string(),
        contact_number: "09171234567".to_string(),
        service_type: ServiceType::Pickup,
        address: None,
        pickup_time: None,
        party_size: None,
        dine_in_time: None,
        payment_method: "gcash".to_string(),
        reference_number: None,
        notes: Some("Landmark: blue gate".to_string()),
        total: Decimal::from(2250),
        ip_address: Some("203.0.113.9".to_string()),
        receipt_url: None,
        renter_id_url: Some("https://img.example/id.jpg".to_string()),
        rental_start_date: NaiveDate::from_ymd_opt(2026, 3, 5),
    }
}

fn order_row(status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": ORDER_ID,
        "customer_name": "Ana Cruz",
        "contact_number": "09171234567",
        "service_type": "pickup",
        "address": null,
        "pickup_time": null,
        "party_size": null,
        "dine_in_time": null,
        "payment_method": "gcash",
        "reference_number": null,
        "notes": "Landmark: blue gate",
        "total": "2250",
        "status": status,
        "created_at": "2026-03-01T08:00:00Z",
        "receipt_url": null,
        "renter_id_url": "https://img.example/id.jpg",
        "rental_start_date": "2026-03-05"
    })
}

#[tokio::test]
async fn stock_levels_filters_by_id_and_sends_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/menu_items"))
        .and(query_param("select", "id,track_inventory,stock_quantity"))
        .and(query_param("id", "in.(tent,stove)"))
        .and(header("apikey", "test-key"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "tent", "track_inventory": true, "stock_quantity": 2 },
            { "id": "stove", "track_inventory": false, "stock_quantity": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let rows = client
        .stock_levels(&["tent".to_string(), "stove".to_string()])
        .await
        .expect("should parse stock rows");

    assert_eq!(rows.len(), 2);
    assert!(rows[0].is_short_of(3));
    assert!(!rows[1].is_short_of(3));
}

#[tokio::test]
async fn stock_levels_with_no_ids_skips_the_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let rows = client.stock_levels(&[]).await.expect("no request needed");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn insert_order_returns_created_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/orders"))
        .and(header("prefer", "return=representation"))
        .and(body_string_contains("\"customer_name\":\"Ana Cruz\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([order_row(
            "pending"
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let record = client
        .insert_order(&new_order())
        .await
        .expect("should return the created row");

    assert_eq!(record.id, ORDER_ID);
    assert_eq!(record.order_code(), "1D2B4FAB");
    assert_eq!(record.total, Decimal::from(2250));
}

#[tokio::test]
async fn insert_order_without_rows_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.insert_order(&new_order()).await.unwrap_err();
    assert!(matches!(err, StoreError::EmptyResponse(_)));
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Rate limit exceeded: please wait",
            "code": "P0001",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.insert_order(&new_order()).await.unwrap_err();

    match &err {
        StoreError::Api { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "Rate limit exceeded: please wait");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_errors_classify_on_the_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Insufficient stock for Dome Tent",
            "code": "P0001"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let gateway: &dyn OrderGateway = &client;
    let err = gateway.insert_order(&new_order()).await.unwrap_err();

    assert_eq!(
        classify_backend_message(&err.message),
        CheckoutError::StockRejected("Insufficient stock for Dome Tent".to_string())
    );
}

#[tokio::test]
async fn plain_text_error_body_is_used_as_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/order_items"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.insert_order_items(&[]).await.unwrap_err();
    assert_eq!(err.backend_message(), "upstream unavailable");
}

#[tokio::test]
async fn insert_order_items_posts_rows_without_representation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/order_items"))
        .and(header("prefer", "return=minimal"))
        .and(body_string_contains(&format!("\"order_id\":\"{ORDER_ID}\"")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let item = NewOrderItem {
        order_id: ORDER_ID.to_string(),
        item_id: "tent".to_string(),
        name: "Dome Tent".to_string(),
        description: None,
        variation: None,
        add_ons: None,
        unit_price: Decimal::from(750),
        quantity: 3,
        subtotal: Decimal::from(2250),
    };

    let client = test_client(&server.uri());
    client
        .insert_order_items(&[item])
        .await
        .expect("items insert should succeed");
}

#[tokio::test]
async fn decrement_stock_calls_the_rpc() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/decrement_menu_item_stock"))
        .and(body_json(serde_json::json!({
            "items": [{ "id": "tent", "quantity": 3 }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .decrement_stock(&[StockAdjustment {
            id: "tent".to_string(),
            quantity: 3,
        }])
        .await
        .expect("rpc should succeed");
}

#[tokio::test]
async fn fetch_orders_embeds_items_newest_first() {
    let server = MockServer::start().await;

    let mut row = order_row("pending");
    row["order_items"] = serde_json::json!([{
        "id": "oi-1",
        "order_id": ORDER_ID,
        "item_id": "tent",
        "name": "Dome Tent",
        "description": null,
        "variation": null,
        "add_ons": [{ "id": "lamp", "name": "Lamp", "price": "50", "quantity": 2 }],
        "unit_price": "750",
        "quantity": 3,
        "subtotal": "2250"
    }]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("select", "*,order_items(*)"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([row])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let orders = client.fetch_orders().await.expect("should parse orders");

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.status, "pending");
    assert_eq!(orders[0].order_items[0].add_ons.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn update_order_status_patches_then_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", format!("eq.{ORDER_ID}")))
        .and(body_json(serde_json::json!({ "status": "confirmed" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([order_row("confirmed")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let orders = client
        .update_order_status(ORDER_ID, "confirmed")
        .await
        .expect("status update should succeed");

    assert_eq!(orders[0].order.status, "confirmed");
}
