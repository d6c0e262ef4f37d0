//! Error types for the cache
//!
//! Provides unified error handling using thiserror. A missing or expired
//! key is never an error; lookups report absence through `Option` or a
//! zero count.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A cache cannot be built without at least one shard
    #[error("Shard count must be at least 1")]
    MisconfiguredShardCount,

    /// The curator cannot run with a zero-length interval
    #[error("Invalid curator interval: {0:?}")]
    InvalidCuratorInterval(Duration),

    /// Exclusive access was requested for a value that is still shared
    #[error("Object is currently locked")]
    Locked,

    /// The background curator thread could not be started
    #[error("Failed to start curator: {0}")]
    CuratorSpawn(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
