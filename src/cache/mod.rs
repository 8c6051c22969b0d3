//! Cache Module
//!
//! Provides the shielded in-memory cache and its building blocks.

use std::time::Duration;

mod entry;
mod shield;
mod shielded;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use shield::{ShieldRegistry, ShieldToken};
pub use shielded::{Fetched, ShieldedCache};
pub use stats::CacheStats;
pub use store::ObjectStore;

pub(crate) use shielded::CacheShared;

// == Public Constants ==
/// Idle time after which the eviction worker drops an unused shield token
pub const SHIELD_TTL: Duration = Duration::from_secs(5);
