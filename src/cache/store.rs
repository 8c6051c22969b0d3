//! Object Store Module
//!
//! Keyed storage for produced values behind a reader/writer lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Object Store ==
/// Map of keys to cached entries.
///
/// Reads never check expiry. An entry stays visible until the eviction worker
/// removes it or the key is deleted explicitly.
#[derive(Debug)]
pub struct ObjectStore<T> {
    entries: RwLock<HashMap<String, Arc<CacheEntry<T>>>>,
}

impl<T> ObjectStore<T> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // == Get ==
    /// Returns a handle to the entry for `key`, expired or not.
    pub async fn get(&self, key: &str) -> Option<Arc<CacheEntry<T>>> {
        self.entries.read().await.get(key).cloned()
    }

    // == Put ==
    /// Stores `entry` under `key`, replacing any previous entry.
    pub async fn put(&self, key: impl Into<String>, entry: Arc<CacheEntry<T>>) {
        self.entries.write().await.insert(key.into(), entry);
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns true if one was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    // == Delete Expired ==
    /// Removes every entry whose expiry is strictly before `now`.
    ///
    /// Returns the number of entries removed.
    pub async fn delete_expired_as_of(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Clear ==
    /// Drops every entry regardless of expiry. Returns the number removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    // == Length ==
    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<T> Default for ObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
