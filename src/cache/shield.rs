//! Shield Registry Module
//!
//! Per-key exclusive tokens that serialize producer invocations for the same
//! key without a global lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

// == Shield Token ==
/// Exclusive-access token for a single key.
#[derive(Debug)]
pub struct ShieldToken {
    created_at: Instant,
    lock: Mutex<()>,
}

impl ShieldToken {
    fn new(now: Instant) -> Self {
        Self {
            created_at: now,
            lock: Mutex::new(()),
        }
    }

    /// Instant the token was first created for its key.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Waits until no other caller holds this key, then takes it.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Returns true if some caller currently holds the key.
    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

#[derive(Debug)]
struct ShieldSlot {
    token: Arc<ShieldToken>,
    last_used: Instant,
}

impl ShieldSlot {
    /// A slot is stale once idle past `ttl` and nobody outside the registry
    /// holds its token. Must be evaluated under the registry lock.
    fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        self.last_used + ttl < now && Arc::strong_count(&self.token) == 1
    }
}

// == Shield Registry ==
/// Map of keys to shield tokens.
///
/// The registry lock only covers lookup, insert and removal. It is never held
/// while a token is locked.
#[derive(Debug, Default)]
pub struct ShieldRegistry {
    slots: Mutex<HashMap<String, ShieldSlot>>,
}

impl ShieldRegistry {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get Or Create ==
    /// Returns the token for `key`, creating it on first use.
    ///
    /// Every call marks the token as used now.
    pub async fn get_or_create(&self, key: &str) -> Arc<ShieldToken> {
        let now = Instant::now();
        let mut slots = self.slots.lock().await;

        if let Some(slot) = slots.get_mut(key) {
            slot.last_used = now;
            return Arc::clone(&slot.token);
        }

        let token = Arc::new(ShieldToken::new(now));
        slots.insert(
            key.to_string(),
            ShieldSlot {
                token: Arc::clone(&token),
                last_used: now,
            },
        );
        token
    }

    // == Delete Stale ==
    /// Removes tokens idle for longer than `ttl` as of `now`.
    ///
    /// Tokens still held or awaited by a caller are kept, so a key never has
    /// two live tokens. Returns the number removed.
    pub async fn delete_stale_as_of(&self, now: Instant, ttl: Duration) -> usize {
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|_, slot| !slot.is_stale(now, ttl));
        before - slots.len()
    }

    // == Clear ==
    /// Drops every token. Returns the number removed.
    pub async fn clear(&self) -> usize {
        let mut slots = self.slots.lock().await;
        let count = slots.len();
        slots.clear();
        count
    }

    // == Length ==
    /// Returns the current number of tokens.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Returns true if no tokens are registered.
    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SHIELD_TTL;

    #[tokio::test]
    async fn test_get_or_create_reuses_token() {
        let registry = ShieldRegistry::new();

        let first = registry.get_or_create("key").await;
        let second = registry.get_or_create("key").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.created_at(), second.created_at());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_tokens() {
        let registry = ShieldRegistry::new();

        let a = registry.get_or_create("a").await;
        let b = registry.get_or_create("b").await;

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_token_is_exclusive() {
        let registry = ShieldRegistry::new();
        let token = registry.get_or_create("key").await;

        let guard = token.acquire().await;
        assert!(token.is_held());

        drop(guard);
        assert!(!token.is_held());
    }

    #[tokio::test]
    async fn test_delete_stale_removes_idle_tokens() {
        let registry = ShieldRegistry::new();
        drop(registry.get_or_create("idle").await);

        let now = Instant::now();
        assert_eq!(registry.delete_stale_as_of(now, SHIELD_TTL).await, 0);

        let later = now + SHIELD_TTL + Duration::from_millis(1);
        assert_eq!(registry.delete_stale_as_of(later, SHIELD_TTL).await, 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_stale_boundary_condition() {
        let registry = ShieldRegistry::new();
        let created = registry.get_or_create("key").await.created_at();

        // Idle for exactly the TTL is still live; only `last_used + ttl < now` is stale
        let boundary = created + SHIELD_TTL;
        assert_eq!(registry.delete_stale_as_of(boundary, SHIELD_TTL).await, 0);
        assert_eq!(registry.len().await, 1);

        let past = boundary + Duration::from_nanos(1);
        assert_eq!(registry.delete_stale_as_of(past, SHIELD_TTL).await, 1);
    }

    #[tokio::test]
    async fn test_delete_stale_keeps_tokens_in_use() {
        let registry = ShieldRegistry::new();
        let token = registry.get_or_create("busy").await;
        let _guard = token.acquire().await;

        let later = Instant::now() + SHIELD_TTL * 10;
        assert_eq!(registry.delete_stale_as_of(later, SHIELD_TTL).await, 0);

        let again = registry.get_or_create("busy").await;
        assert!(Arc::ptr_eq(&token, &again));
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_refreshes_last_used() {
        let registry = ShieldRegistry::new();
        let created = registry.get_or_create("key").await.created_at();

        tokio::time::sleep(Duration::from_secs(4)).await;
        let refreshed = registry.get_or_create("key").await;
        assert_eq!(refreshed.created_at(), created);
        drop(refreshed);

        // 6s after creation but only 2s after the last access
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            registry.delete_stale_as_of(Instant::now(), SHIELD_TTL).await,
            0
        );
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = ShieldRegistry::new();
        let held = registry.get_or_create("a").await;
        registry.get_or_create("b").await;

        assert_eq!(registry.clear().await, 2);
        assert!(registry.is_empty().await);
        drop(held);
    }
}
