//! Shielded Cache - An embeddable in-memory cache with request shielding
//!
//! Caches the results of an expensive, possibly failing producer with TTL
//! expiry enforced by a background eviction worker. Concurrent callers asking
//! for the same missing key share a single producer invocation.
//!
//! # Example
//! ```ignore
//! let cache: ShieldedCache<u64> = ShieldedCache::new(Duration::from_millis(100));
//! let (trigger, shutdown) = shutdown_channel();
//! let worker = cache.start_worker(shutdown)?;
//!
//! let fetched = cache
//!     .fetch("answer", Duration::from_secs(2), || async { load_answer().await })
//!     .await?;
//! println!("{} (hit: {})", fetched.data(), fetched.hit);
//!
//! trigger.cancel();
//! worker.await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, Fetched, ShieldedCache, SHIELD_TTL};
pub use config::Config;
pub use error::{CacheError, FetchError};
pub use tasks::{shutdown_channel, Shutdown, ShutdownTrigger};
