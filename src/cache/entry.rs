//! Cache Entry Module
//!
//! Defines the wrapper pairing a stored value with its optional expiration.

use std::sync::Arc;

use crate::clock::Timestamp;

// == Cache Entry ==
/// Represents a single cache entry with value and expiration.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value, possibly shared with callers holding a snapshot
    pub(crate) value: Arc<V>,
    /// Expiration timestamp (Unix seconds), None = no expiration
    pub expires_at: Option<Timestamp>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// No validation is done: an expiration in the past yields an entry
    /// that is already expired.
    pub fn new(value: Arc<V>, expires_at: Option<Timestamp>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: the expiration second itself is still valid; the
    /// entry expires once `now` is strictly greater.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Returns a new handle to the stored value.
    pub fn value(&self) -> Arc<V> {
        Arc::clone(&self.value)
    }

    /// Number of handles to the value held outside the cache.
    pub fn outside_holders(&self) -> usize {
        Arc::strong_count(&self.value) - 1
    }

    // == Time To Live ==
    /// Returns remaining TTL in seconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_seconds)` otherwise
    pub fn ttl_remaining(&self, now: Timestamp) -> Option<u64> {
        self.expires_at
            .map(|expires| if expires > now { (expires - now) as u64 } else { 0 })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_no_expiration_never_expires() {
        let entry = CacheEntry::new(Arc::new("value"), None);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(0));
        assert!(!entry.is_expired(i64::MAX));
        assert!(entry.ttl_remaining(100).is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(Arc::new("value"), Some(1_000));

        assert!(!entry.is_expired(999));
        assert!(!entry.is_expired(1_000), "Expiration second is still valid");
        assert!(entry.is_expired(1_001));
    }

    #[test]
    fn test_past_expiration_is_legal() {
        let entry = CacheEntry::new(Arc::new(7), Some(10));
        assert!(entry.is_expired(11));
        assert_eq!(entry.ttl_remaining(11), Some(0));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(Arc::new(7), Some(160));
        assert_eq!(entry.ttl_remaining(100), Some(60));
    }

    #[test]
    fn test_outside_holders() {
        let entry = CacheEntry::new(Arc::new(String::from("v")), None);
        assert_eq!(entry.outside_holders(), 0);

        let snapshot = entry.value();
        assert_eq!(entry.outside_holders(), 1);

        drop(snapshot);
        assert_eq!(entry.outside_holders(), 0);
    }
}
