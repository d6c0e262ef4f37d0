//! Clock Module
//!
//! Supplies seconds-resolution wall-clock time for expiration checks.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;

/// Absolute time as Unix seconds.
pub type Timestamp = i64;

// == Clock Trait ==
/// A source of the current time, callable from any thread.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time in Unix seconds.
    fn now(&self) -> Timestamp;
}

// == System Clock ==
/// Reads the real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

// == Manual Clock ==
/// A clock that only moves when told to. Used to drive expiration
/// deterministically in tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Jumps to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance(&self, by: Duration) {
        let secs = whole_secs(by);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(secs))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Absolute expiration `ttl` from now, rounded down to whole seconds.
///
/// Saturates at `Timestamp::MAX` for TTLs beyond the representable range.
pub fn expires_in(clock: &dyn Clock, ttl: Duration) -> Timestamp {
    clock.now().saturating_add(whole_secs(ttl))
}

fn whole_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
