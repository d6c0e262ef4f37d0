//! Curator Task
//!
//! Background thread that periodically removes expired cache entries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::error::{CacheError, Result};

/// Stop flag plus the condvar the curator sleeps on.
#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Sleeps for `interval` or until stopped. Returns true once stopped.
    ///
    /// An interval too large to express as a deadline sleeps until stopped.
    fn wait(&self, interval: Duration) -> bool {
        let deadline = Instant::now().checked_add(interval);
        let mut stopped = self.stopped.lock();
        while !*stopped {
            match deadline {
                Some(deadline) => {
                    if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
                None => self.wake.wait(&mut stopped),
            }
        }
        *stopped
    }

    fn raise(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }
}

// == Curator ==
/// Handle to a running curator thread.
///
/// Dropping the handle stops the thread and waits for it to exit.
#[derive(Debug)]
pub struct Curator {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Curator {
    /// Spawns a thread that calls `sweep` once per `interval` until stopped.
    ///
    /// `sweep` returns the number of entries it removed. A sweep that panics
    /// is logged and the loop carries on with the next interval.
    ///
    /// # Example
    /// ```ignore
    /// let curator = Curator::spawn(Duration::from_secs(30), move || core.purge_expired())?;
    /// // Later, during teardown:
    /// curator.stop();
    /// ```
    pub fn spawn<F>(interval: Duration, sweep: F) -> Result<Self>
    where
        F: Fn() -> usize + Send + 'static,
    {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name("cache-curator".to_string())
            .spawn(move || {
                info!("Starting cache curator with interval of {:?}", interval);

                while !thread_signal.wait(interval) {
                    match panic::catch_unwind(AssertUnwindSafe(&sweep)) {
                        Ok(0) => debug!("Curator sweep: no expired entries found"),
                        Ok(removed) => info!("Curator sweep: removed {} expired entries", removed),
                        Err(_) => error!("Curator sweep failed; retrying next interval"),
                    }
                }

                info!("Cache curator stopped");
            })
            .map_err(|e| CacheError::CuratorSpawn(e.to_string()))?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// True until [`Curator::stop`] has completed.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the thread and blocks until it has exited. Safe to call twice.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.signal.raise();
        if handle.join().is_err() {
            warn!("Cache curator exited abnormally");
        }
    }
}

impl Drop for Curator {
    fn drop(&mut self) {
        self.stop();
    }
}
