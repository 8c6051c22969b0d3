//! Error types for the shielded cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache itself.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// `fetch` was called while the eviction worker is stopped
    #[error("eviction worker is not running")]
    WorkerNotRunning,

    /// `start_worker` was called on a running worker
    #[error("eviction worker is already running")]
    AlreadyRunning,

    /// `start_worker` was called outside of a tokio runtime
    #[error("no tokio runtime available to spawn the eviction worker")]
    NoRuntime,
}

// == Fetch Error Enum ==
/// Error returned by [`ShieldedCache::fetch`](crate::cache::ShieldedCache::fetch).
///
/// Producer failures are carried as-is: `Display` and `source` are forwarded
/// to the producer's own error.
#[derive(Error, Debug)]
pub enum FetchError<E> {
    /// The cache refused the request
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The producer failed; nothing was cached
    #[error(transparent)]
    Producer(E),
}

impl<E> FetchError<E> {
    /// Returns the producer's error, if that is what this is.
    pub fn into_producer_error(self) -> Option<E> {
        match self {
            FetchError::Producer(err) => Some(err),
            FetchError::Cache(_) => None,
        }
    }

    /// Returns true if the cache rejected the call because the worker is stopped.
    pub fn is_worker_not_running(&self) -> bool {
        matches!(self, FetchError::Cache(CacheError::WorkerNotRunning))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
