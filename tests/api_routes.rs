//! HTTP surface tests driven through the router with `oneshot`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use barbican_cache::api::build_router;
use barbican_cache::resolver::{
    BarbicanClient, ContainerIndex, InMemorySecretIndex, SecretResolver, StaticTokenProvider,
};
use common::MockBarbican;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn send_request(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };
    router.clone().oneshot(request).await.expect("request")
}

async fn read_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.expect("read response body").to_vec()
}

async fn read_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&read_bytes(response).await).expect("parse json response")
}

async fn loaded_router(barbican: &MockBarbican) -> Router {
    barbican.mount_billing_listing().await;
    let (resolver, _) = barbican.resolver();
    resolver.load_all().await.expect("initial load");
    build_router(resolver)
}

#[tokio::test]
async fn health_returns_ok() {
    let barbican = MockBarbican::start().await;
    let (resolver, _) = barbican.resolver();
    let router = build_router(resolver);

    let response = send_request(&router, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_bytes(response).await, b"OK");
}

#[tokio::test]
async fn get_secret_returns_raw_payload() {
    let barbican = MockBarbican::start().await;
    barbican.mount_payload("s-456", b"\x00binary\xff", 1).await;
    let router = loaded_router(&barbican).await;

    let response = send_request(&router, Method::GET, "/api/v1/secrets/billing/db-pass", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
    assert_eq!(read_bytes(response).await, b"\x00binary\xff");
}

#[tokio::test]
async fn unknown_secret_is_404_with_error_body() {
    let barbican = MockBarbican::start().await;
    let router = loaded_router(&barbican).await;

    let response = send_request(&router, Method::GET, "/api/v1/secrets/billing/unknown", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await, json!({ "error": "Secret not found" }));
}

#[tokio::test]
async fn create_upload_get_delete_round_trip() {
    let barbican = MockBarbican::start().await;
    barbican.mount_upload_flow("api-key", "c-new", "s-new").await;
    barbican.mount_payload("s-new", b"sk-live-123", 1).await;
    Mock::given(method("DELETE"))
        .and(path("/v1/secrets/s-new"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&barbican.server)
        .await;
    let (resolver, _) = barbican.resolver();
    let router = build_router(resolver);

    let response =
        send_request(&router, Method::POST, "/api/v1/containers", Some(json!({ "name": "payments" })))
            .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_bytes(response).await, b"OK");

    let upload = json!({ "container": "payments", "name": "api-key", "payload": "sk-live-123" });
    let response = send_request(&router, Method::POST, "/api/v1/secrets", Some(upload)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        send_request(&router, Method::GET, "/api/v1/secrets/payments/api-key", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_bytes(response).await, b"sk-live-123");

    let response =
        send_request(&router, Method::DELETE, "/api/v1/secrets/payments/api-key", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_bytes(response).await, b"OK");

    let response =
        send_request(&router, Method::GET, "/api/v1/secrets/payments/api-key", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_to_unknown_container_is_404() {
    let barbican = MockBarbican::start().await;
    let (resolver, _) = barbican.resolver();
    let router = build_router(resolver);

    let upload = json!({ "container": "nowhere", "name": "db-pass", "payload": "x" });
    let response = send_request(&router, Method::POST, "/api/v1/secrets", Some(upload)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await, json!({ "error": "Container not found" }));
}

#[tokio::test]
async fn empty_or_missing_name_is_400() {
    let barbican = MockBarbican::start().await;
    let (resolver, _) = barbican.resolver();
    let router = build_router(resolver);

    let response =
        send_request(&router, Method::POST, "/api/v1/containers", Some(json!({ "name": "" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].is_string());

    let response = send_request(&router, Method::POST, "/api/v1/containers", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let upload = json!({ "container": "billing", "payload": "x" });
    let response = send_request(&router, Method::POST, "/api/v1/secrets", Some(upload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(barbican.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_400_with_error_body() {
    let barbican = MockBarbican::start().await;
    let (resolver, _) = barbican.resolver();
    let router = build_router(resolver);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/containers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json(response).await["error"].is_string());
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let barbican = MockBarbican::start().await;
    let (resolver, _) = barbican.resolver();
    let router = build_router(resolver);

    let response =
        send_request(&router, Method::PUT, "/api/v1/secrets/billing/db-pass", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = send_request(&router, Method::GET, "/api/v1/containers", None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn backend_rejection_status_is_relayed() {
    let barbican = MockBarbican::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secrets/s-456/payload"))
        .respond_with(ResponseTemplate::new(403).set_body_string("policy does not allow"))
        .mount(&barbican.server)
        .await;
    let router = loaded_router(&barbican).await;

    let response = send_request(&router, Method::GET, "/api/v1/secrets/billing/db-pass", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await, json!({ "error": "Error getting secret from Barbican" }));
}

#[tokio::test]
async fn backend_outage_is_generic_500() {
    let barbican = MockBarbican::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secrets/s-456/payload"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&barbican.server)
        .await;
    barbican.mount_billing_listing().await;

    let http = reqwest::Client::builder().timeout(Duration::from_millis(200)).build().unwrap();
    let resolver = SecretResolver::new(
        Arc::new(ContainerIndex::default()),
        Arc::new(InMemorySecretIndex::new()),
        Arc::new(BarbicanClient::new(
            http,
            barbican.uri(),
            Arc::new(StaticTokenProvider::new(common::TEST_TOKEN)),
        )),
    );
    resolver.load_all().await.unwrap();
    let router = build_router(resolver);

    let response = send_request(&router, Method::GET, "/api/v1/secrets/billing/db-pass", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn upload_answered_with_wrong_success_status_is_502() {
    let barbican = MockBarbican::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/secrets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "secret_ref": barbican.reference("secrets", "s-orphan") })),
        )
        .mount(&barbican.server)
        .await;
    let router = loaded_router(&barbican).await;

    let upload = json!({ "container": "billing", "name": "api-key", "payload": "x" });
    let response = send_request(&router, Method::POST, "/api/v1/secrets", Some(upload)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json(response).await, json!({ "error": "Error uploading secret to Barbican" }));

    let response = send_request(&router, Method::GET, "/api/v1/secrets/billing/api-key", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
