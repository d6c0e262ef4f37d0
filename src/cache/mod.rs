//! Cache Module
//!
//! Provides the sharded in-memory cache with TTL expiration.

mod entry;
mod shard;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use shard::{Shard, ShardMap};
pub use stats::CacheStats;
pub use store::{Cache, WriteMode};

pub(crate) use stats::StatsRecorder;
