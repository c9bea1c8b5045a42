//! Authentication token providers for backend calls.
//!
//! The gateway asks a [`TokenProvider`] for a credential before every request. Tokens
//! are not cached here; each call obtains a fresh one.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use super::error::{ResolveError, Result};

/// Header carrying the issued token in Keystone responses.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Source of short-lived credentials for the secret store.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    /// Obtain a token to attach to the next backend request.
    async fn token(&self) -> Result<String>;
}

/// Provider that always returns the same token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"[REDACTED]").finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Keystone application-credential authentication.
///
/// Posts the credential to `{auth_url}/auth/tokens` and reads the issued token from
/// the `X-Subject-Token` response header.
#[derive(Clone)]
pub struct KeystoneTokenProvider {
    client: Client,
    auth_url: String,
    credential_id: String,
    credential_secret: String,
}

impl std::fmt::Debug for KeystoneTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoneTokenProvider")
            .field("auth_url", &self.auth_url)
            .field("credential_id", &self.credential_id)
            .field("credential_secret", &"[REDACTED]")
            .finish()
    }
}

impl KeystoneTokenProvider {
    pub fn new(
        client: Client,
        auth_url: impl Into<String>,
        credential_id: impl Into<String>,
        credential_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            credential_id: credential_id.into(),
            credential_secret: credential_secret.into(),
        }
    }

    fn tokens_url(&self) -> String {
        format!("{}/auth/tokens", self.auth_url)
    }
}

#[async_trait]
impl TokenProvider for KeystoneTokenProvider {
    async fn token(&self) -> Result<String> {
        let url = self.tokens_url();
        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["application_credential"],
                    "application_credential": {
                        "id": self.credential_id,
                        "secret": self.credential_secret,
                    }
                }
            }
        });

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!(url = %url, error = %e, "Error requesting Keystone token");
            ResolveError::authentication_failed(format!("Keystone unreachable: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "Keystone rejected credential");
            return Err(ResolveError::authentication_failed(format!(
                "Keystone returned status {}",
                status.as_u16()
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ResolveError::authentication_failed("Keystone response missing X-Subject-Token")
            })?
            .to_string();

        debug!(url = %url, "Obtained Keystone token");
        Ok(token)
    }
}
