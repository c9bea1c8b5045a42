//! In-process container index.
//!
//! Maps container names to their backend identifiers. The index is bounded and evicts
//! the least recently used entry once full; entries never expire on time.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use tracing::debug;

use super::reference::{container_key, ContainerId};

/// Default number of containers kept in memory.
pub const DEFAULT_CONTAINER_CAPACITY: usize = 1000;

/// Bounded, thread-safe container name → identifier map.
///
/// `get` promotes the entry, so it needs the same exclusive lock as `set`. The lock is
/// never held across an await point.
#[derive(Debug)]
pub struct ContainerIndex {
    inner: Mutex<LruCache<String, ContainerId>>,
}

impl ContainerIndex {
    /// Create an index holding at most `capacity` containers (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, ContainerId>> {
        // Each operation is a single push/get, so a poisoned guard still holds whole entries.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up the identifier for a container name.
    pub fn get(&self, container: &str) -> Option<ContainerId> {
        self.lock().get(&container_key(container)).cloned()
    }

    /// Record the identifier for a container name, evicting the oldest entry if full.
    pub fn set(&self, container: &str, id: ContainerId) {
        let key = container_key(container);
        let displaced = self.lock().push(key.clone(), id);
        if let Some((evicted, _)) = displaced {
            if evicted != key {
                debug!(evicted = %evicted, "Evicted container from local index");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

impl Default for ContainerIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_CAPACITY)
    }
}
