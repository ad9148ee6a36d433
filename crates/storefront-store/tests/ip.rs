//! Integration tests for the client IP lookup.

use std::time::Duration;

use storefront_store::lookup_client_ip;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn returns_reported_ip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": "203.0.113.9" })),
        )
        .mount(&server)
        .await;

    let ip = lookup_client_ip(&server.uri(), Duration::from_secs(3)).await;
    assert_eq!(ip.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn slow_lookup_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "ip": "203.0.113.9" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let ip = lookup_client_ip(&server.uri(), Duration::from_millis(50)).await;
    assert_eq!(ip, None);
}

#[tokio::test]
async fn failed_lookup_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ip = lookup_client_ip(&server.uri(), Duration::from_secs(3)).await;
    assert_eq!(ip, None);
}
