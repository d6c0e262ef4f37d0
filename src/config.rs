//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default number of shards. This should be much larger than the number of
/// threads likely to access the cache at any one time.
pub const DEFAULT_SHARD_COUNT: usize = 256;

/// Default pause between two curator sweeps, in milliseconds.
pub const DEFAULT_CURATOR_INTERVAL_MS: u64 = 30_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of independently locked shards, fixed for the cache's lifetime
    pub shard_count: usize,
    /// Pause between two curator sweeps
    pub curator_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SHARD_COUNT` - Number of shards (default: 256)
    /// - `CACHE_CURATOR_INTERVAL_MS` - Curator sweep interval in ms (default: 30000)
    ///
    /// Values that are missing or fail to parse fall back to the defaults.
    /// Range checks happen later, when a cache is built from the config.
    pub fn from_env() -> Self {
        Self {
            shard_count: env::var("CACHE_SHARD_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SHARD_COUNT),
            curator_interval: Duration::from_millis(
                env::var("CACHE_CURATOR_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CURATOR_INTERVAL_MS),
            ),
        }
    }

    /// Returns a copy with the given shard count.
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Returns a copy with the given curator interval.
    pub fn with_curator_interval(mut self, interval: Duration) -> Self {
        self.curator_interval = interval;
        self
    }

    /// Rejects configurations the cache cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(CacheError::MisconfiguredShardCount);
        }
        if self.curator_interval.is_zero() {
            return Err(CacheError::InvalidCuratorInterval(self.curator_interval));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            curator_interval: Duration::from_millis(DEFAULT_CURATOR_INTERVAL_MS),
        }
    }
}
