//! Expiration Sweep Task
//!
//! Background task that periodically removes expired entries from a
//! [`MemoryStore`]. Reads already skip expired entries; the sweep reclaims
//! entries that are never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::MemoryStore;

/// Spawns a background task that periodically purges expired entries.
///
/// # Arguments
/// * `store` - Store to sweep (clones share data)
/// * `interval` - Delay between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop sweeping.
pub fn spawn_cleanup_task(store: MemoryStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiration sweep every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("Expiration sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiration sweep: no expired entries found");
            }
        }
    })
}
