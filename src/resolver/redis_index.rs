//! Redis-backed shared secret index.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::error::{ResolveError, Result};
use super::reference::SecretId;
use super::secret_index::SecretIndex;

/// Shared secret index stored as Redis hashes.
///
/// Each operation is a single HSET/HGET/HDEL, so no client-side locking is needed.
/// Concurrent writers to the same field resolve as last-write-wins.
#[derive(Clone)]
pub struct RedisSecretIndex {
    redis: ConnectionManager,
}

impl std::fmt::Debug for RedisSecretIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSecretIndex").field("redis", &"<ConnectionManager>").finish()
    }
}

/// Normalize a cache address into a `redis://` URL.
///
/// Accepts either a full URL or a bare `host:port`.
pub fn redis_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{}", address)
    }
}

impl RedisSecretIndex {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(address: &str) -> Result<Self> {
        let url = redis_url(address);
        let client = redis::Client::open(url.as_str())?;
        let mut redis = ConnectionManager::new(client).await?;

        let _: String = redis::cmd("PING").query_async(&mut redis).await?;
        info!(address = %address, "Connected to shared secret index");

        Ok(Self { redis })
    }

    fn redis(&self) -> ConnectionManager {
        self.redis.clone()
    }
}

#[async_trait]
impl SecretIndex for RedisSecretIndex {
    async fn hset(&self, container_key: &str, field: &str, value: &SecretId) -> Result<()> {
        self.redis()
            .hset::<_, _, _, ()>(container_key, field, value.as_str())
            .await
            .map_err(|e| ResolveError::cache_unavailable(format!("HSET {}: {}", container_key, e)))?;
        debug!(key = %container_key, field = %field, "Stored secret identifier");
        Ok(())
    }

    async fn hget(&self, container_key: &str, field: &str) -> Result<Option<SecretId>> {
        let value: Option<String> = self
            .redis()
            .hget(container_key, field)
            .await
            .map_err(|e| ResolveError::cache_unavailable(format!("HGET {}: {}", container_key, e)))?;
        Ok(value.map(SecretId::new))
    }

    async fn hdel(&self, container_key: &str, field: &str) -> Result<()> {
        self.redis()
            .hdel::<_, _, ()>(container_key, field)
            .await
            .map_err(|e| ResolveError::cache_unavailable(format!("HDEL {}: {}", container_key, e)))?;
        debug!(key = %container_key, field = %field, "Removed secret identifier");
        Ok(())
    }
}


#[cfg(feature = "redis_tests")]
mod redis_tests {
    use super::*;

    async fn connect() -> RedisSecretIndex {
        let address =
            std::env::var("REDIS_TEST_URL").unwrap_or_else(|_| "localhost:6379".to_string());
        RedisSecretIndex::connect(&address).await.expect("Redis must be running for redis_tests")
    }

    fn unique_key() -> String {
        format!("container:test-{}", uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_hset_hget_hdel() {
        let index = connect().await;
        let key = unique_key();

        index.hset(&key, "db-pass", &SecretId::new("s-456")).await.unwrap();
        assert_eq!(index.hget(&key, "db-pass").await.unwrap(), Some(SecretId::new("s-456")));

        index.hset(&key, "db-pass", &SecretId::new("s-789")).await.unwrap();
        assert_eq!(index.hget(&key, "db-pass").await.unwrap(), Some(SecretId::new("s-789")));

        index.hdel(&key, "db-pass").await.unwrap();
        assert_eq!(index.hget(&key, "db-pass").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_key_and_field_are_none() {
        let index = connect().await;
        let key = unique_key();

        assert_eq!(index.hget(&key, "anything").await.unwrap(), None);
        index.hset(&key, "present", &SecretId::new("s-1")).await.unwrap();
        assert_eq!(index.hget(&key, "absent").await.unwrap(), None);

        // Deleting an absent field is not an error.
        index.hdel(&key, "absent").await.unwrap();
        index.hdel(&key, "present").await.unwrap();
    }

    #[tokio::test]
    async fn test_visible_across_connections() {
        let writer = connect().await;
        let reader = connect().await;
        let key = unique_key();

        writer.hset(&key, "api-key", &SecretId::new("s-shared")).await.unwrap();
        assert_eq!(reader.hget(&key, "api-key").await.unwrap(), Some(SecretId::new("s-shared")));
        writer.hdel(&key, "api-key").await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_type_is_error_not_miss() {
        let index = connect().await;
        let key = unique_key();
        let _: () = redis::AsyncCommands::set(&mut index.redis(), &key, "plain").await.unwrap();

        let err = index.hget(&key, "field").await.unwrap_err();
        assert!(matches!(err, ResolveError::CacheUnavailable { .. }));

        let _: () = redis::AsyncCommands::del(&mut index.redis(), &key).await.unwrap();
    }
}
