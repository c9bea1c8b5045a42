//! Shared secret index abstraction.
//!
//! The shared tier is a hash-of-hashes: one hash per container key
//! (`container:<name>`), one field per secret name, valued with the secret identifier.
//! It lives outside the process so that every instance resolves secrets the same way.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::Result;
use super::reference::SecretId;

/// Hash-field operations against the shared cache tier.
///
/// `hget` returns `Ok(None)` for a plain miss; an `Err` always means the cache itself
/// failed and is reported as [`ResolveError::CacheUnavailable`](super::ResolveError).
#[async_trait]
pub trait SecretIndex: Send + Sync + std::fmt::Debug {
    /// Set `field` in the hash at `container_key`.
    async fn hset(&self, container_key: &str, field: &str, value: &SecretId) -> Result<()>;

    /// Read `field` from the hash at `container_key`.
    async fn hget(&self, container_key: &str, field: &str) -> Result<Option<SecretId>>;

    /// Remove `field` from the hash at `container_key`. Removing an absent field is not an error.
    async fn hdel(&self, container_key: &str, field: &str) -> Result<()>;
}

/// Process-local secret index.
///
/// Test double for the shared tier. The service never builds one. Entries are not
/// visible to other processes.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretIndex {
    inner: Arc<RwLock<HashMap<String, HashMap<String, SecretId>>>>,
}

impl InMemorySecretIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields stored under a container key.
    pub async fn field_count(&self, container_key: &str) -> usize {
        self.inner.read().await.get(container_key).map_or(0, HashMap::len)
    }
}

#[async_trait]
impl SecretIndex for InMemorySecretIndex {
    async fn hset(&self, container_key: &str, field: &str, value: &SecretId) -> Result<()> {
        let mut hashes = self.inner.write().await;
        hashes.entry(container_key.to_string()).or_default().insert(field.to_string(), value.clone());
        Ok(())
    }

    async fn hget(&self, container_key: &str, field: &str) -> Result<Option<SecretId>> {
        let hashes = self.inner.read().await;
        Ok(hashes.get(container_key).and_then(|fields| fields.get(field)).cloned())
    }

    async fn hdel(&self, container_key: &str, field: &str) -> Result<()> {
        let mut hashes = self.inner.write().await;
        if let Some(fields) = hashes.get_mut(container_key) {
            fields.remove(field);
            // Redis drops a hash once its last field is gone.
            if fields.is_empty() {
                hashes.remove(container_key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hset_hget() {
        let index = InMemorySecretIndex::new();
        index.hset("container:billing", "db-pass", &SecretId::new("s-456")).await.unwrap();

        let found = index.hget("container:billing", "db-pass").await.unwrap();
        assert_eq!(found, Some(SecretId::new("s-456")));
    }

    #[tokio::test]
    async fn test_miss_is_not_an_error() {
        let index = InMemorySecretIndex::new();
        assert_eq!(index.hget("container:billing", "missing").await.unwrap(), None);

        index.hset("container:billing", "db-pass", &SecretId::new("s-456")).await.unwrap();
        assert_eq!(index.hget("container:other", "db-pass").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_hdel() {
        let index = InMemorySecretIndex::new();
        index.hset("container:billing", "a", &SecretId::new("1")).await.unwrap();
        index.hset("container:billing", "b", &SecretId::new("2")).await.unwrap();

        index.hdel("container:billing", "a").await.unwrap();
        assert_eq!(index.hget("container:billing", "a").await.unwrap(), None);
        assert_eq!(index.field_count("container:billing").await, 1);

        index.hdel("container:billing", "b").await.unwrap();
        index.hdel("container:billing", "never-set").await.unwrap();
        assert_eq!(index.field_count("container:billing").await, 0);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let index = InMemorySecretIndex::new();
        index.hset("container:billing", "db-pass", &SecretId::new("old")).await.unwrap();
        index.hset("container:billing", "db-pass", &SecretId::new("new")).await.unwrap();
        assert_eq!(
            index.hget("container:billing", "db-pass").await.unwrap(),
            Some(SecretId::new("new"))
        );
    }
}
