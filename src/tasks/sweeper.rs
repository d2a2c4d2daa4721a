//! Expiry Sweeper
//!
//! Background task that periodically reclaims expired cache entries so
//! keys that are never read again do not pile up. Reads already enforce
//! expiration; this pass only bounds memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::adapter::CacheAdapter;

// == Sweeper ==
/// Handle to a running sweep loop.
///
/// The loop is aborted by [`Sweeper::stop`] or when the handle is dropped,
/// so replacing an engine never leaves an orphaned loop behind.
#[derive(Debug)]
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns a sweep loop over `adapter` on the current tokio runtime.
    ///
    /// The first pass runs one `interval` after spawning.
    ///
    /// # Arguments
    /// * `adapter` - Backend whose expired entries are purged
    /// * `interval` - Time between passes
    pub fn spawn<V>(adapter: Arc<dyn CacheAdapter<V>>, interval: Duration) -> Self
    where
        V: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            info!(
                backend = adapter.name(),
                interval_ms = interval.as_millis() as u64,
                "Starting expiry sweeper"
            );

            loop {
                tokio::time::sleep(interval).await;

                let removed = adapter.purge_expired();

                if removed > 0 {
                    debug!("Sweep: removed {} expired entries", removed);
                } else {
                    debug!("Sweep: no expired entries found");
                }
            }
        });

        Self { handle }
    }

    /// Returns true once the loop has been cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the loop. Safe to call more than once.
    pub fn stop(&self) {
        if !self.handle.is_finished() {
            self.handle.abort();
            debug!("Expiry sweeper stopped");
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
