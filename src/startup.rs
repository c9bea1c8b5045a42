//! Component wiring for the cache service
//!
//! Builds the token provider, gateway and both cache tiers from [`AppConfig`] and
//! returns the [`SecretResolver`] the API serves from.

use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, KeystoneConfig};
use crate::errors::{Error, Result};
use crate::resolver::{
    BarbicanClient, ContainerIndex, KeystoneTokenProvider, RedisSecretIndex, SecretIndex,
    SecretResolver, StaticTokenProvider, TokenProvider,
};

/// Build the HTTP client shared by Keystone and Barbican calls.
pub fn build_http_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.barbican.request_timeout())
        .build()
        .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))
}

/// A static token takes precedence over Keystone credentials.
pub fn build_token_provider(
    config: &KeystoneConfig,
    client: reqwest::Client,
) -> Result<Arc<dyn TokenProvider>> {
    if let Some(token) = &config.static_token {
        info!("Using static Barbican token");
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }

    match (&config.auth_url, &config.credential_id, &config.credential_secret) {
        (Some(auth_url), Some(id), Some(secret)) => {
            info!(auth_url = %auth_url, "Using Keystone application credential");
            Ok(Arc::new(KeystoneTokenProvider::new(client, auth_url, id, secret)))
        }
        _ => Err(Error::config("Keystone application credential is incomplete")),
    }
}

/// Connect the shared index. Startup fails when it is unreachable.
pub async fn build_secret_index(kv_url: &str) -> Result<Arc<dyn SecretIndex>> {
    let index = RedisSecretIndex::connect(kv_url).await?;
    Ok(Arc::new(index))
}

pub async fn build_resolver(config: &AppConfig) -> Result<SecretResolver> {
    let client = build_http_client(config)?;
    let tokens = build_token_provider(&config.keystone, client.clone())?;
    let gateway = BarbicanClient::new(client, &config.barbican.url, tokens);
    let secrets = build_secret_index(&config.cache.kv_url).await?;
    let containers = ContainerIndex::new(config.cache.container_capacity);

    Ok(SecretResolver::new(Arc::new(containers), secrets, Arc::new(gateway)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolveError;

    #[test]
    fn test_static_token_wins() {
        let config = KeystoneConfig {
            auth_url: Some("http://keystone:5000/v3".to_string()),
            static_token: Some("tok".to_string()),
            ..Default::default()
        };
        let provider = build_token_provider(&config, reqwest::Client::new()).unwrap();
        assert!(format!("{:?}", provider).starts_with("StaticTokenProvider"));
    }

    #[test]
    fn test_incomplete_credential_is_rejected() {
        let config = KeystoneConfig {
            auth_url: Some("http://keystone:5000/v3".to_string()),
            credential_id: Some("app-id".to_string()),
            ..Default::default()
        };
        let err = build_token_provider(&config, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_unusable_kv_url_fails_startup() {
        let err = build_secret_index("redis://bad host:6379").await.unwrap_err();
        assert!(matches!(err, Error::Resolve(ResolveError::CacheUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_build_resolver_does_not_fall_back_to_local_index() {
        let mut config = AppConfig::default();
        config.keystone.static_token = Some("tok".to_string());
        config.cache.kv_url = "redis://bad host:6379".to_string();

        assert!(build_resolver(&config).await.is_err());
    }
}
