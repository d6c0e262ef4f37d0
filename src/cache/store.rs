//! Cache Store Module
//!
//! Main cache engine: a fixed array of shards, a hash router from key to
//! shard, and a curator thread sweeping expired entries in the background.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Shard, ShardMap, StatsRecorder};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::Curator;

// == Write Mode ==
/// Policy deciding whether `set` proceeds based on current key presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert or replace unconditionally
    #[default]
    WriteAlways,
    /// Replace only if the key is present
    WriteOnlyIfSet,
    /// Insert only if the key is absent
    WriteOnlyIfNotSet,
}

/// Outcome of looking a key up under its shard lock.
enum Probe {
    Absent,
    Expired,
    Live,
}

/// State shared between the cache handle and its curator.
struct CacheCore<K, V, S> {
    shards: Box<[Shard<K, V>]>,
    hasher: S,
    clock: Arc<dyn Clock>,
    stats: StatsRecorder,
}

impl<K: Eq + Hash, V, S> CacheCore<K, V, S> {
    /// Sweeps every shard in turn, never holding two shard locks at once.
    fn purge_expired(&self) -> usize {
        let removed: usize = self
            .shards
            .iter()
            .map(|shard| {
                let mut map = shard.lock();
                map.cull_expired(self.clock.now())
            })
            .sum();
        self.stats.record_sweep(removed);
        removed
    }

    /// Classifies `key`, evicting it if expired.
    fn probe<Q>(&self, map: &mut ShardMap<K, V>, key: &Q, now: Timestamp) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match map.lookup(key) {
            None => return Probe::Absent,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            map.remove(key);
            self.stats.record_lazy_expiration();
            Probe::Expired
        } else {
            Probe::Live
        }
    }

    /// Like [`CacheCore::probe`], counting the outcome as a hit or a miss.
    fn probe_read<Q>(&self, map: &mut ShardMap<K, V>, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(map, key, self.clock.now()) {
            Probe::Live => {
                self.stats.record_hit();
                true
            }
            Probe::Absent | Probe::Expired => {
                self.stats.record_miss();
                false
            }
        }
    }
}

// == Cache ==
/// A sharded, TTL-aware key/value cache shared across threads.
///
/// Every per-key operation locks exactly one shard, chosen by hashing the
/// key with `S`. Values are stored behind `Arc` and handed out as
/// immutable snapshots; see [`Cache::update`] for exclusive mutation.
///
/// `keys`, `size` and sweeps visit shards one at a time, so their results
/// are assembled from per-shard snapshots taken at different instants
/// rather than a single point-in-time view of the whole cache.
pub struct Cache<K, V, S = RandomState> {
    core: Arc<CacheCore<K, V, S>>,
    curator: Mutex<Option<Curator>>,
}

impl<K, V> Cache<K, V, RandomState>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its curator.
    ///
    /// # Errors
    /// - `MisconfiguredShardCount` if `config.shard_count` is zero
    /// - `InvalidCuratorInterval` if `config.curator_interval` is zero
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_hasher(config, RandomState::new())
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_hasher_and_clock(config, RandomState::new(), clock)
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    /// Creates a cache routing keys with `hasher`.
    pub fn with_hasher(config: CacheConfig, hasher: S) -> Result<Self> {
        Self::with_hasher_and_clock(config, hasher, Arc::new(SystemClock))
    }

    /// Creates a cache routing keys with `hasher` and reading time from `clock`.
    pub fn with_hasher_and_clock(
        config: CacheConfig,
        hasher: S,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let shards = (0..config.shard_count).map(|_| Shard::new()).collect();
        let core = Arc::new(CacheCore {
            shards,
            hasher,
            clock,
            stats: StatsRecorder::default(),
        });

        let sweeper = Arc::clone(&core);
        let curator = Curator::spawn(config.curator_interval, move || sweeper.purge_expired())?;
        debug!(
            "Cache created with {} shards, curator interval {:?}",
            config.shard_count, config.curator_interval
        );

        Ok(Self {
            core,
            curator: Mutex::new(Some(curator)),
        })
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    // == Route ==
    /// Returns the index of the shard owning `key`.
    ///
    /// Stable for the lifetime of the cache: the same key always routes to
    /// the same shard.
    pub fn route<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        (self.core.hasher.hash_one(key) % self.core.shards.len() as u64) as usize
    }

    fn shard_for<Q>(&self, key: &Q) -> &Shard<K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        &self.core.shards[self.route(key)]
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.core.shards.len()
    }

    // == Set ==
    /// Stores `value` under `key` according to `mode`.
    ///
    /// `expires_at` is an absolute Unix-seconds deadline; `None` never
    /// expires. An entry present but already expired counts as absent and
    /// is evicted before the mode is evaluated.
    ///
    /// Returns the number of entries written (0 or 1).
    pub fn set(&self, key: K, value: V, expires_at: Option<Timestamp>, mode: WriteMode) -> usize {
        self.set_shared(key, Arc::new(value), expires_at, mode)
    }

    /// Stores a value the caller already shares.
    pub fn set_shared(
        &self,
        key: K,
        value: Arc<V>,
        expires_at: Option<Timestamp>,
        mode: WriteMode,
    ) -> usize {
        let mut map = self.shard_for(&key).lock();
        let present = matches!(
            self.core.probe(&mut map, &key, self.core.clock.now()),
            Probe::Live
        );

        match (mode, present) {
            (WriteMode::WriteOnlyIfSet, false) | (WriteMode::WriteOnlyIfNotSet, true) => 0,
            _ => {
                map.insert_or_replace(key, CacheEntry::new(value, expires_at));
                1
            }
        }
    }

    /// Unconditionally stores `value` with no expiration.
    pub fn put(&self, key: K, value: V) -> usize {
        self.set(key, value, None, WriteMode::WriteAlways)
    }

    // == Get ==
    /// Retrieves a shared snapshot of the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or expired; an expired entry is
    /// evicted on the way.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.shard_for(key).lock();
        if !self.core.probe_read(&mut map, key) {
            return None;
        }
        map.lookup(key).map(CacheEntry::value)
    }

    /// Retrieves an owned copy of the value stored under `key`.
    pub fn get_cloned<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).map(|value| V::clone(&value))
    }

    /// Retrieves the value only if nobody else holds a snapshot of it.
    ///
    /// # Errors
    /// - `Locked` if a handle returned earlier is still alive
    pub fn get_exclusive<Q>(&self, key: &Q) -> Result<Option<Arc<V>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.shard_for(key).lock();
        if !self.core.probe_read(&mut map, key) {
            return Ok(None);
        }
        match map.lookup(key) {
            Some(entry) if entry.outside_holders() > 0 => Err(CacheError::Locked),
            entry => Ok(entry.map(CacheEntry::value)),
        }
    }

    // == Update ==
    /// Mutates the stored value in place under the shard lock.
    ///
    /// Returns `Ok(None)` if the key is absent or expired.
    ///
    /// # Errors
    /// - `Locked` if any snapshot of the value is still held outside the cache
    ///
    /// # Deadlocks
    /// `f` runs while the key's shard lock is held. It must not call back
    /// into this cache: any key routed to the same shard blocks forever.
    pub fn update<Q, F, R>(&self, key: &Q, f: F) -> Result<Option<R>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        let mut map = self.shard_for(key).lock();
        if !self.core.probe_read(&mut map, key) {
            return Ok(None);
        }
        match map.lookup_mut(key) {
            Some(entry) => Arc::get_mut(&mut entry.value)
                .map(|value| Some(f(value)))
                .ok_or(CacheError::Locked),
            None => Ok(None),
        }
    }

    // == Exists ==
    /// Reports whether `key` holds a live entry, evicting it if expired.
    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.shard_for(key).lock();
        self.core.probe_read(&mut map, key)
    }

    // == Delete ==
    /// Removes `key`, returning the number of entries removed (0 or 1).
    pub fn del<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).lock().remove(key)
    }

    // == Keys ==
    /// Collects every key present, shard by shard.
    ///
    /// Expired entries not yet evicted are included, and no ordering is
    /// imposed. Follow up with `get` or `exists` for exact liveness.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::new();
        for shard in self.core.shards.iter() {
            shard.lock().for_each_key(|key| keys.push(key.clone()));
        }
        keys
    }

    // == Size ==
    /// Sums entry counts shard by shard, expired entries included.
    ///
    /// This is an upper bound on live entries, not an exact count.
    pub fn size(&self) -> usize {
        self.core.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Alias for [`Cache::size`].
    pub fn metrics(&self) -> usize {
        self.size()
    }

    /// True if no shard holds an entry, expired or not.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.core.stats.snapshot(self.size())
    }

    // == Purge Expired ==
    /// Runs one sweep over all shards on the calling thread.
    ///
    /// Counted in `sweeps` and `curated_expirations` like a curator sweep.
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.core.purge_expired()
    }

    /// Removes every entry, shard by shard.
    pub fn clear(&self) {
        for shard in self.core.shards.iter() {
            shard.lock().clear();
        }
    }
}

impl<K, V, S> Cache<K, V, S> {
    // == Shutdown ==
    /// Stops the curator and waits for it to exit.
    ///
    /// The cache stays usable afterwards but expired entries are only
    /// evicted lazily. Calling this more than once is a no-op.
    pub fn shutdown(&self) {
        let curator = self.curator.lock().take();
        if let Some(mut curator) = curator {
            curator.stop();
        }
    }

    /// True while the background curator thread is alive.
    pub fn curator_running(&self) -> bool {
        self.curator
            .lock()
            .as_ref()
            .is_some_and(Curator::is_running)
    }
}

impl<K, V, S> Drop for Cache<K, V, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<K, V, S> fmt::Debug for Cache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("shards", &self.core.shards.len())
            .field("clock", &self.core.clock)
            .field("curator_running", &self.curator_running())
            .finish()
    }
}
