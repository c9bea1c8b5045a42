//! Backend gateway for the Barbican secret store.
//!
//! Translates container and secret operations into authenticated REST calls. The
//! gateway performs no retries and keeps transport failures
//! ([`ResolveError::BackendUnavailable`]) apart from unexpected status codes
//! ([`ResolveError::BackendRejected`]).

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn, Instrument};

use super::auth::TokenProvider;
use super::error::{ResolveError, Result};
use super::reference::{ContainerId, SecretId};
use crate::backend_span;

/// Header carrying the Keystone token on Barbican requests.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Content type declared for every uploaded payload.
pub const PAYLOAD_CONTENT_TYPE: &str = "application/octet-stream";

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A secret attached to a container, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSecretRef {
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    pub secret_ref: String,
}

/// Container metadata owned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub container_ref: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub container_type: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub secret_refs: Vec<NamedSecretRef>,
}

impl ContainerRecord {
    /// Identifier extracted from the container reference.
    pub fn identifier(&self) -> Result<ContainerId> {
        ContainerId::from_reference(&self.container_ref)
    }
}

#[derive(Debug, Deserialize)]
struct ContainerListResponse {
    #[serde(default)]
    containers: Vec<ContainerRecord>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecretRefResponse {
    secret_ref: String,
}

/// Operations the resolver needs from the secret store.
#[async_trait]
pub trait BackendGateway: Send + Sync + std::fmt::Debug {
    /// Enumerate every container along with its secret references.
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>>;

    /// Create a generic container and return the backend's record for it.
    async fn create_container(&self, name: &str) -> Result<ContainerRecord>;

    /// Store a secret payload and return its reference.
    async fn upload_secret(&self, name: &str, payload: &[u8]) -> Result<String>;

    /// Attach an uploaded secret to a container under `name`.
    async fn attach_secret(
        &self,
        container: &ContainerId,
        secret_ref: &str,
        name: &str,
    ) -> Result<()>;

    /// Fetch the raw payload of a secret.
    async fn fetch_secret_payload(&self, secret: &SecretId) -> Result<Bytes>;

    /// Delete a secret.
    async fn delete_secret(&self, secret: &SecretId) -> Result<()>;
}

/// REST client for the Barbican v1 API.
#[derive(Clone)]
pub struct BarbicanClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for BarbicanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarbicanClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl BarbicanClient {
    pub fn new(client: Client, base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), tokens }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Pagination links must stay on the configured endpoint, since the token goes with them.
    fn is_own_url(&self, url: &str) -> bool {
        url.strip_prefix(&self.base_url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']))
    }

    /// Send an authenticated request. Only transport failures are errors here.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        accept: Option<&str>,
    ) -> Result<Response> {
        let span = backend_span!(method.as_str(), url);
        async {
            let token = self.tokens.token().await?;

            let mut request =
                self.client.request(method.clone(), url).header(AUTH_TOKEN_HEADER, token);
            if let Some(body) = body {
                request = request.json(body);
            }
            if let Some(accept) = accept {
                request = request.header(header::ACCEPT, accept);
            }

            let response = request.send().await.map_err(|e| {
                error!(url = %url, error = %e, "Error making Barbican request");
                ResolveError::backend_unavailable(url, e.to_string())
            })?;
            debug!(status = response.status().as_u16(), "Barbican responded");
            Ok::<_, ResolveError>(response)
        }
        .instrument(span)
        .await
    }

    /// Turn any status other than `expected` into a rejection carrying the response body.
    async fn expect_status(
        operation: &'static str,
        response: Response,
        expected: StatusCode,
    ) -> Result<Response> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        Err(Self::rejected(operation, response).await)
    }

    async fn rejected(operation: &'static str, response: Response) -> ResolveError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        error!(operation, status, resp = %body, "Barbican rejected request");
        ResolveError::backend_rejected(operation, status, body)
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Error decoding Barbican response");
            ResolveError::invalid_response(e.to_string())
        })
    }
}

#[async_trait]
impl BackendGateway for BarbicanClient {
    async fn list_containers(&self) -> Result<Vec<ContainerRecord>> {
        const OPERATION: &str = "loading containers";

        let mut url = self.url("/v1/containers");
        let mut visited = HashSet::new();
        let mut containers = Vec::new();
        loop {
            visited.insert(url.clone());
            let response = self.send(Method::GET, &url, None, None).await?;
            if !response.status().is_success() {
                return Err(Self::rejected(OPERATION, response).await);
            }

            let page: ContainerListResponse = Self::decode(response).await?;
            let page_len = page.containers.len();
            containers.extend(page.containers);
            debug!(page = page_len, total = page.total, "Fetched container page");

            if page.total > 0 && containers.len() as u64 >= page.total {
                break;
            }
            let next = match page.next {
                Some(next) if !next.is_empty() && page_len > 0 => next,
                _ => break,
            };
            if !self.is_own_url(&next) {
                error!(next = %next, "Container page links outside the Barbican endpoint");
                return Err(ResolveError::invalid_response(format!(
                    "pagination link {} is not under {}",
                    next, self.base_url
                )));
            }
            if visited.contains(&next) {
                warn!(next = %next, "Container pagination revisits a page, stopping");
                break;
            }
            url = next;
        }

        Ok(containers)
    }

    async fn create_container(&self, name: &str) -> Result<ContainerRecord> {
        let body = json!({ "name": name, "type": "generic" });
        let url = self.url("/v1/containers");

        let response = self.send(Method::POST, &url, Some(&body), None).await?;
        let response =
            Self::expect_status("creating container in Barbican", response, StatusCode::CREATED)
                .await?;

        let mut record: ContainerRecord = Self::decode(response).await?;
        if record.name.is_empty() {
            record.name = name.to_string();
        }
        Ok(record)
    }

    async fn upload_secret(&self, name: &str, payload: &[u8]) -> Result<String> {
        let body = json!({
            "name": name,
            "payload": STANDARD.encode(payload),
            "payload_content_type": PAYLOAD_CONTENT_TYPE,
            "payload_content_encoding": "base64",
            "secret_type": "symmetric",
        });
        let url = self.url("/v1/secrets");

        let response = self.send(Method::POST, &url, Some(&body), None).await?;
        let response =
            Self::expect_status("uploading secret to Barbican", response, StatusCode::CREATED)
                .await?;

        let created: SecretRefResponse = Self::decode(response).await?;
        Ok(created.secret_ref)
    }

    async fn attach_secret(
        &self,
        container: &ContainerId,
        secret_ref: &str,
        name: &str,
    ) -> Result<()> {
        let body = json!({ "secret_ref": secret_ref, "name": name });
        let url = self.url(&format!("/v1/containers/{}/secrets", container));
        debug!(container = %container, secret_name = %name, "Adding secret to container");

        let response = self.send(Method::POST, &url, Some(&body), None).await?;
        Self::expect_status("adding secret to container", response, StatusCode::CREATED).await?;
        Ok(())
    }

    async fn fetch_secret_payload(&self, secret: &SecretId) -> Result<Bytes> {
        let url = self.url(&format!("/v1/secrets/{}/payload", secret));

        let response =
            self.send(Method::GET, &url, None, Some(PAYLOAD_CONTENT_TYPE)).await?;
        let response =
            Self::expect_status("getting secret from Barbican", response, StatusCode::OK).await?;

        response.bytes().await.map_err(|e| {
            error!(url = %url, error = %e, "Error reading Barbican response");
            ResolveError::backend_unavailable(url.as_str(), e.to_string())
        })
    }

    async fn delete_secret(&self, secret: &SecretId) -> Result<()> {
        let url = self.url(&format!("/v1/secrets/{}", secret));

        let response = self.send(Method::DELETE, &url, None, None).await?;
        Self::expect_status("deleting secret from Barbican", response, StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }
}
