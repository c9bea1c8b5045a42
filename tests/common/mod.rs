//! Shared fixtures: a wiremock Barbican and resolvers wired against it.
#![allow(dead_code)]

use std::sync::Arc;

use barbican_cache::resolver::{
    BarbicanClient, ContainerIndex, InMemorySecretIndex, SecretResolver, StaticTokenProvider,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

pub struct MockBarbican {
    pub server: MockServer,
}

impl MockBarbican {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Full reference for a backend object, e.g. `reference("secrets", "s-456")`.
    pub fn reference(&self, kind: &str, id: &str) -> String {
        format!("{}/v1/{}/{}", self.server.uri(), kind, id)
    }

    pub fn client(&self) -> BarbicanClient {
        BarbicanClient::new(
            reqwest::Client::new(),
            self.server.uri(),
            Arc::new(StaticTokenProvider::new(TEST_TOKEN)),
        )
    }

    /// Resolver over this mock with a fresh in-memory secret index.
    pub fn resolver(&self) -> (SecretResolver, InMemorySecretIndex) {
        let secrets = InMemorySecretIndex::new();
        (self.resolver_with(secrets.clone()), secrets)
    }

    /// Resolver sharing an existing secret index, as a second service instance would.
    pub fn resolver_with(&self, secrets: InMemorySecretIndex) -> SecretResolver {
        SecretResolver::new(
            Arc::new(ContainerIndex::default()),
            Arc::new(secrets),
            Arc::new(self.client()),
        )
    }

    /// Serve a single-page container listing.
    pub async fn mount_listing(&self, containers: Value) {
        let total = containers.as_array().map_or(0, Vec::len);
        Mock::given(method("GET"))
            .and(path("/v1/containers"))
            .and(header("X-Auth-Token", TEST_TOKEN))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "containers": containers, "total": total })),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Listing with one container `billing` (`c-123`) holding `db-pass` (`s-456`).
    pub async fn mount_billing_listing(&self) {
        self.mount_listing(json!([{
            "name": "billing",
            "container_ref": self.reference("containers", "c-123"),
            "secret_refs": [{ "name": "db-pass", "secret_ref": self.reference("secrets", "s-456") }]
        }]))
        .await;
    }

    pub async fn mount_payload(&self, secret_id: &str, payload: &'static [u8], calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/secrets/{}/payload", secret_id)))
            .and(header("Accept", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Mount create-container, upload and attach endpoints for one container and secret.
    pub async fn mount_upload_flow(&self, name: &str, container_id: &str, secret_id: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/containers"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "container_ref": self.reference("containers", container_id)
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/secrets"))
            .and(wiremock::matchers::body_partial_json(json!({ "name": name })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "secret_ref": self.reference("secrets", secret_id)
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/v1/containers/{}/secrets", container_id)))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "container_ref": self.reference("containers", container_id)
            })))
            .mount(&self.server)
            .await;
    }
}
