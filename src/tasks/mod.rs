//! Background Tasks Module
//!
//! Contains the background work that runs alongside the cache.
//!
//! # Tasks
//! - Eviction: removes expired entries and idle shields every GC interval,
//!   flushing everything when its shutdown scope fires

mod eviction;
mod shutdown;

pub(crate) use eviction::spawn_eviction_task;
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};
