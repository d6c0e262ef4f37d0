//! Storage Cache - An in-process sharded key/value cache
//!
//! Provides per-key linearizable get/set/delete with TTL expiration, lazy
//! eviction on read, and a background curator sweeping expired entries.
//!
//! ```
//! use storage_cache::{Cache, CacheConfig, WriteMode};
//!
//! let cache: Cache<String, u32> = Cache::new(CacheConfig::default()).unwrap();
//! cache.set("answer".to_string(), 42, None, WriteMode::WriteAlways);
//! assert_eq!(cache.get("answer").as_deref(), Some(&42));
//! assert_eq!(cache.del("answer"), 1);
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod tasks;

pub use cache::{Cache, CacheStats, WriteMode};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use models::StorageItem;
