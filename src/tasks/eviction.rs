//! Eviction Task
//!
//! Background task that periodically removes expired entries and idle shield
//! tokens, and flushes the cache when its shutdown scope fires.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{CacheShared, SHIELD_TTL};
use crate::tasks::Shutdown;

/// Clears the cache's running flag when the worker's future is dropped.
///
/// Covers every way the task can end: cancellation, `JoinHandle::abort`,
/// a panic inside the loop, or the runtime shutting down before or after the
/// task was first polled.
struct RunningFlag<T> {
    shared: Arc<CacheShared<T>>,
}

impl<T> Drop for RunningFlag<T> {
    fn drop(&mut self) {
        self.shared.worker_running.store(false, Ordering::SeqCst);
    }
}

/// Spawns the eviction loop for `shared` on `runtime`.
///
/// The loop sleeps for the cache's GC interval between sweeps. When
/// `shutdown` fires it clears both stores and exits. The caller is
/// responsible for having set the running flag; the task clears it however
/// it ends.
pub(crate) fn spawn_eviction_task<T>(
    runtime: &Handle,
    shared: Arc<CacheShared<T>>,
    mut shutdown: Shutdown,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    let running = RunningFlag { shared };

    runtime.spawn(async move {
        let shared = &running.shared;
        let interval = shared.gc_interval;
        info!("Starting eviction worker with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let (objects, shields) = flush(shared).await;
                    info!(
                        "Eviction worker stopped: flushed {} entries and {} shields",
                        objects, shields
                    );
                    return;
                }
                _ = tokio::time::sleep(interval) => {
                    sweep(shared, Instant::now()).await;
                }
            }
        }
    })
}

/// Removes entries expired before `now` and shields idle past `SHIELD_TTL`.
async fn sweep<T>(shared: &CacheShared<T>, now: Instant) -> (usize, usize) {
    let expired = shared.objects.delete_expired_as_of(now).await;
    let shields = shared.shields.delete_stale_as_of(now, SHIELD_TTL).await;
    shared.stats.record_sweep(expired, shields);

    if expired > 0 || shields > 0 {
        info!(
            "Eviction sweep: removed {} expired entries and {} idle shields",
            expired, shields
        );
    } else {
        debug!("Eviction sweep: nothing to remove");
    }

    (expired, shields)
}

/// Drops every entry and shield.
async fn flush<T>(shared: &CacheShared<T>) -> (usize, usize) {
    let objects = shared.objects.clear().await;
    let shields = shared.shields.clear().await;
    (objects, shields)
}
