//! Global Registry
//!
//! Holds at most one process-wide `String -> StorageItem` cache, created on
//! first use and torn down explicitly. Teardown stops the curator before
//! the registry lets go of the instance.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::StorageItem;

/// The cache type the registry hands out.
pub type StorageCache = Cache<String, StorageItem>;

static INSTANCE: Mutex<Option<Arc<StorageCache>>> = Mutex::new(None);

/// Returns the shared cache, creating it from [`CacheConfig::from_env`] on
/// first call (or first call after a teardown).
///
/// # Errors
/// Fails if the environment describes an invalid configuration.
pub fn instance() -> Result<Arc<StorageCache>> {
    let mut slot = INSTANCE.lock();
    if let Some(cache) = slot.as_ref() {
        return Ok(Arc::clone(cache));
    }

    let cache = Arc::new(StorageCache::new(CacheConfig::from_env())?);
    info!("Global storage cache initialized");
    *slot = Some(Arc::clone(&cache));
    Ok(cache)
}

/// True if an instance currently exists.
pub fn is_initialized() -> bool {
    INSTANCE.lock().is_some()
}

/// Stops the global cache's curator and releases the registry's handle.
///
/// Handles obtained earlier stay valid but no longer get background
/// eviction. Does nothing if no instance exists.
pub fn teardown() {
    let cache = INSTANCE.lock().take();
    if let Some(cache) = cache {
        cache.shutdown();
        info!("Global storage cache torn down");
    }
}

// == Teardown Guard ==
/// Calls [`teardown`] when dropped. Keep one alive in `main` to tear the
/// global cache down on the way out.
#[derive(Debug, Default)]
#[must_use = "the registry is torn down as soon as the guard is dropped"]
pub struct TeardownGuard;

impl TeardownGuard {
    pub fn new() -> Self {
        Self
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        teardown();
    }
}
