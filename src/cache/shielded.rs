//! Shielded Cache Module
//!
//! Ties the object store, the shield registry and the eviction worker into
//! the public fetch-or-compute API.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats, ObjectStore, ShieldRegistry};
use crate::config::Config;
use crate::error::{CacheError, FetchError, Result};
use crate::tasks::{spawn_eviction_task, Shutdown};

// == Shared State ==
/// State shared between cache handles and the eviction worker.
#[derive(Debug)]
pub(crate) struct CacheShared<T> {
    pub(crate) objects: ObjectStore<T>,
    pub(crate) shields: ShieldRegistry,
    pub(crate) stats: StatsRecorder,
    pub(crate) gc_interval: Duration,
    pub(crate) worker_running: AtomicBool,
}

impl<T> CacheShared<T> {
    pub(crate) fn new(gc_interval: Duration) -> Self {
        Self {
            objects: ObjectStore::new(),
            shields: ShieldRegistry::new(),
            stats: StatsRecorder::default(),
            gc_interval,
            worker_running: AtomicBool::new(false),
        }
    }
}

// == Fetched ==
/// Result of a successful [`ShieldedCache::fetch`].
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Handle to the cached entry
    pub entry: Arc<CacheEntry<T>>,
    /// True if served from the store without running the producer
    pub hit: bool,
}

impl<T> Fetched<T> {
    /// Borrows the cached value.
    pub fn data(&self) -> &T {
        &self.entry.data
    }
}

// == Shielded Cache ==
/// In-memory cache that runs at most one producer per key at a time.
///
/// Concurrent callers asking for the same missing key queue on that key's
/// shield; the first one runs the producer and the rest observe its result.
/// Clones share the same storage.
///
/// Fetching requires a running eviction worker (see
/// [`start_worker`](Self::start_worker)).
#[derive(Debug)]
pub struct ShieldedCache<T> {
    shared: Arc<CacheShared<T>>,
}

impl<T> Clone for ShieldedCache<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> ShieldedCache<T>
where
    T: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache whose worker sweeps every `gc_interval`.
    pub fn new(gc_interval: Duration) -> Self {
        Self {
            shared: Arc::new(CacheShared::new(gc_interval)),
        }
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gc_interval())
    }

    // == Start Worker ==
    /// Starts the eviction worker on the current tokio runtime.
    ///
    /// The worker runs until `shutdown` fires, then flushes the cache. Await
    /// the returned handle to know when it has fully stopped.
    ///
    /// # Errors
    /// - `AlreadyRunning` if a worker is active for this cache
    /// - `NoRuntime` if called outside a tokio runtime
    pub fn start_worker(&self, shutdown: Shutdown) -> Result<JoinHandle<()>> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        self.shared
            .worker_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CacheError::AlreadyRunning)?;

        Ok(spawn_eviction_task(
            &runtime,
            Arc::clone(&self.shared),
            shutdown,
        ))
    }

    /// Returns true while the eviction worker is active.
    pub fn is_worker_running(&self) -> bool {
        self.shared.worker_running.load(Ordering::SeqCst)
    }

    /// Returns the interval between eviction sweeps.
    pub fn gc_interval(&self) -> Duration {
        self.shared.gc_interval
    }

    // == Fetch ==
    /// Returns the entry for `key`, running `producer` on a miss.
    ///
    /// Waits while another caller resolves the same key. On success a missing
    /// value is stored for `ttl`. A producer error is returned unchanged and
    /// nothing is cached, so the next caller runs the producer again.
    ///
    /// Entries are not checked for expiry here; an expired entry is served
    /// until the eviction worker removes it.
    ///
    /// # Errors
    /// - `FetchError::Cache(WorkerNotRunning)` if the worker is stopped
    /// - `FetchError::Producer` with the producer's own error
    pub async fn fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> std::result::Result<Fetched<T>, FetchError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if !self.is_worker_running() {
            self.shared.stats.record_rejected();
            return Err(CacheError::WorkerNotRunning.into());
        }

        let shield = self.shared.shields.get_or_create(key).await;
        let _guard = shield.acquire().await;

        if let Some(entry) = self.shared.objects.get(key).await {
            self.shared.stats.record_hit();
            return Ok(Fetched { entry, hit: true });
        }

        self.shared.stats.record_miss();
        debug!("Cache miss for key '{}', invoking producer", key);

        let data = match producer().await {
            Ok(data) => data,
            Err(err) => {
                self.shared.stats.record_producer_error();
                warn!("Producer failed for key '{}'; result not cached", key);
                return Err(FetchError::Producer(err));
            }
        };

        let entry = Arc::new(CacheEntry::new(data, ttl));
        self.shared.objects.put(key, Arc::clone(&entry)).await;

        Ok(Fetched { entry, hit: false })
    }

    // == Delete Object ==
    /// Removes the entry for `key` immediately, bypassing TTL and GC.
    pub async fn delete_object(&self, key: &str) {
        if self.shared.objects.delete(key).await {
            debug!("Deleted key '{}'", key);
        }
    }

    // == Usage ==
    /// Returns `(object_count, shield_count)`.
    ///
    /// Each count is read under its own lock; the pair is not a joint snapshot.
    pub async fn usage(&self) -> (usize, usize) {
        let objects = self.shared.objects.len().await;
        let shields = self.shared.shields.len().await;
        (objects, shields)
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.stats.snapshot()
    }
}
