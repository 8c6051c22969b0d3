//! Configuration Module
//!
//! Handles loading cache and demo settings from environment variables.

use std::env;
use std::time::Duration;

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interval between eviction sweeps in milliseconds
    pub gc_interval_ms: u64,
    /// TTL in milliseconds applied to values produced by the demo
    pub default_ttl_ms: u64,
    /// Simulated producer latency in milliseconds for the demo
    pub producer_delay_ms: u64,
    /// Number of concurrent callers the demo spawns
    pub callers: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GC_INTERVAL_MS` - Eviction sweep interval (default: 1000)
    /// - `DEFAULT_TTL_MS` - TTL for produced values (default: 5000)
    /// - `PRODUCER_DELAY_MS` - Simulated producer latency (default: 250)
    /// - `CALLERS` - Concurrent demo callers (default: 8)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gc_interval_ms: env_or("GC_INTERVAL_MS", defaults.gc_interval_ms),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            producer_delay_ms: env_or("PRODUCER_DELAY_MS", defaults.producer_delay_ms),
            callers: env_or("CALLERS", defaults.callers),
        }
    }

    /// Eviction sweep interval.
    pub fn gc_interval(&self) -> Duration {
        Duration::from_millis(self.gc_interval_ms)
    }

    /// TTL for produced values.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Simulated producer latency.
    pub fn producer_delay(&self) -> Duration {
        Duration::from_millis(self.producer_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gc_interval_ms: 1000,
            default_ttl_ms: 5000,
            producer_delay_ms: 250,
            callers: 8,
        }
    }
}

fn env_or<V: std::str::FromStr>(name: &str, default: V) -> V {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.gc_interval_ms, 1000);
        assert_eq!(config.default_ttl_ms, 5000);
        assert_eq!(config.producer_delay_ms, 250);
        assert_eq!(config.callers, 8);
    }

    #[test]
    fn test_config_durations() {
        let config = Config::default();
        assert_eq!(config.gc_interval(), Duration::from_secs(1));
        assert_eq!(config.default_ttl(), Duration::from_secs(5));
        assert_eq!(config.producer_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_from_env() {
        // Only this test touches these variables
        env::set_var("GC_INTERVAL_MS", "50");
        env::set_var("CALLERS", "not-a-number");
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("PRODUCER_DELAY_MS");

        let config = Config::from_env();
        assert_eq!(config.gc_interval_ms, 50);
        assert_eq!(config.callers, 8);
        assert_eq!(config.default_ttl_ms, 5000);
        assert_eq!(config.producer_delay_ms, 250);

        env::remove_var("GC_INTERVAL_MS");
        env::remove_var("CALLERS");
    }
}
