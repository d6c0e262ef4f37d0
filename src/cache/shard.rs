//! Shard Module
//!
//! One independently lockable partition of the key space.
//!
//! # Design
//!
//! - Each shard owns its own `parking_lot::Mutex`; every map access goes
//!   through the guard returned by [`Shard::lock`]
//! - No invariant spans two shards

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::{Mutex, MutexGuard};

use crate::cache::CacheEntry;
use crate::clock::Timestamp;

// == Shard ==
/// A mutex-protected key to entry map.
#[derive(Debug)]
pub struct Shard<K, V> {
    map: Mutex<ShardMap<K, V>>,
}

impl<K, V> Default for Shard<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Shard<K, V> {
    /// Creates a new empty shard.
    pub fn new() -> Self {
        Self {
            map: Mutex::new(ShardMap {
                entries: HashMap::new(),
            }),
        }
    }

    /// Acquires the shard's exclusive lock.
    pub fn lock(&self) -> MutexGuard<'_, ShardMap<K, V>> {
        self.map.lock()
    }
}

// == Shard Map ==
/// The map behind a shard's lock. Only reachable through [`Shard::lock`].
#[derive(Debug)]
pub struct ShardMap<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> ShardMap<K, V> {
    // == Insert ==
    /// Inserts or replaces the entry for `key`.
    ///
    /// Returns true if the key was new, false if an existing entry was
    /// discarded in favor of the new one.
    pub fn insert_or_replace(&mut self, key: K, entry: CacheEntry<V>) -> bool {
        self.entries.insert(key, entry).is_none()
    }

    // == Lookup ==
    /// Returns the entry for `key`, expired or not.
    pub fn lookup<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns the entry for `key` for in-place mutation.
    pub fn lookup_mut<Q>(&mut self, key: &Q) -> Option<&mut CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    // == Remove ==
    /// Removes `key`, returning the number of entries removed (0 or 1).
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.entries.remove(key).is_some())
    }

    /// True if `key` is present, expired or not.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Visits every key present, expired or not.
    pub fn for_each_key<F>(&self, mut visitor: F)
    where
        F: FnMut(&K),
    {
        self.entries.keys().for_each(|key| visitor(key));
    }

    // == Cull Expired ==
    /// Removes every entry expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn cull_expired(&mut self, now: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries present, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the shard holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
