//! Shielded Cache demo
//!
//! Runs several concurrent callers against a slow simulated backend so the
//! shielding and eviction behaviour can be watched in the logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shielded_cache::{shutdown_channel, Config, Shutdown, ShieldedCache};

/// Keys the demo callers rotate through
const DEMO_KEYS: [&str; 3] = ["alpha", "beta", "gamma"];

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and start its eviction worker
/// 4. Spawn concurrent callers and a periodic usage reporter
/// 5. On SIGINT/SIGTERM cancel the shutdown scope and wait for the worker
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shielded_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shielded Cache demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: gc_interval={}ms, default_ttl={}ms, producer_delay={}ms, callers={}",
        config.gc_interval_ms, config.default_ttl_ms, config.producer_delay_ms, config.callers
    );

    let cache: ShieldedCache<u64> = ShieldedCache::from_config(&config);
    let (trigger, shutdown) = shutdown_channel();
    let worker = cache
        .start_worker(shutdown.clone())
        .context("failed to start eviction worker")?;

    let backend_calls = Arc::new(AtomicU64::new(0));
    let mut callers = JoinSet::new();
    for id in 0..config.callers {
        callers.spawn(run_caller(
            id,
            cache.clone(),
            config.clone(),
            Arc::clone(&backend_calls),
            shutdown.clone(),
        ));
    }
    callers.spawn(report_usage(cache.clone(), shutdown));

    shutdown_signal().await;
    trigger.cancel();

    while callers.join_next().await.is_some() {}
    worker.await.context("eviction worker panicked")?;

    let stats = serde_json::to_string(&cache.stats())?;
    info!(
        "Demo finished after {} backend calls: {}",
        backend_calls.load(Ordering::Relaxed),
        stats
    );
    Ok(())
}

/// Repeatedly fetches demo keys until the scope fires.
async fn run_caller(
    id: usize,
    cache: ShieldedCache<u64>,
    config: Config,
    backend_calls: Arc<AtomicU64>,
    shutdown: Shutdown,
) {
    let mut round = id;
    while !shutdown.is_cancelled() {
        let key = DEMO_KEYS[round % DEMO_KEYS.len()];
        round += 1;

        let calls = Arc::clone(&backend_calls);
        let delay = config.producer_delay();
        let result = cache
            .fetch(key, config.default_ttl(), || async move {
                tokio::time::sleep(delay).await;
                let n = calls.fetch_add(1, Ordering::Relaxed) + 1;
                // Every seventh backend call fails to show errors are not cached
                if n % 7 == 0 {
                    Err(anyhow::anyhow!("backend call {} failed", n))
                } else {
                    Ok(n)
                }
            })
            .await;

        match result {
            Ok(fetched) if !fetched.hit => {
                info!("caller {} produced '{}' = {}", id, key, fetched.data());
            }
            Ok(_) => {}
            Err(err) if err.is_worker_not_running() => break,
            Err(err) => warn!("caller {} failed to fetch '{}': {}", id, key, err),
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Logs store sizes and counters once per second.
async fn report_usage(cache: ShieldedCache<u64>, mut shutdown: Shutdown) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                let (objects, shields) = cache.usage().await;
                let stats = cache.stats();
                info!(
                    "usage: objects={}, shields={}, hit_rate={:.2}, producer_errors={}",
                    objects,
                    shields,
                    stats.hit_rate(),
                    stats.producer_errors
                );
            }
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
