//! Cache Entry Module
//!
//! Defines the immutable record stored for every cached key.

use std::time::Duration;

use tokio::time::Instant;

/// Lifetime used when `now + ttl` does not fit in an `Instant`
const NEVER_EXPIRES: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

// == Cache Entry ==
/// A produced value and the instant after which it is logically expired.
///
/// Entries are never mutated; a fresh fetch replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    /// Absolute expiry instant
    pub expires: Instant,
    /// The produced value
    pub data: T,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// A TTL too large to represent (e.g. `Duration::MAX`) is clamped to
    /// roughly thirty years.
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + NEVER_EXPIRES);
        Self::with_expiry(data, expires)
    }

    /// Creates an entry with an explicit expiry instant.
    pub fn with_expiry(data: T, expires: Instant) -> Self {
        Self { expires, data }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired as of `now`.
    ///
    /// Boundary condition: an entry expiring exactly at `now` is still live;
    /// only `expires < now` counts as expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires < now
    }

    /// Checks whether the entry is expired as of the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires.saturating_duration_since(Instant::now())
    }
}
