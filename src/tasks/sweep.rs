//! TTL Sweep Task
//!
//! Background task that periodically removes expired entries from the
//! memory tier and keeps the tag index aligned. Lazy expiry at read
//! time is what guarantees correctness; the sweep only bounds memory
//! held by keys nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TagIndex;
use crate::tiers::MemoryTier;

/// Spawns the periodic sweep over the memory tier.
///
/// Swept keys are also removed from the tag index so it never drifts
/// from the tiers.
///
/// # Arguments
/// * `memory` - The authoritative tier to sweep
/// * `tag_index` - Shared tag index to strip swept keys from
/// * `interval_secs` - Seconds between sweep runs
///
/// # Returns
/// A JoinHandle used to abort the task during shutdown.
pub fn spawn_sweep_task(
    memory: Arc<MemoryTier>,
    tag_index: Arc<RwLock<TagIndex>>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "starting TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let swept = memory.sweep_expired().await;
            if !swept.is_empty() {
                let mut index = tag_index.write().await;
                for key in &swept {
                    index.remove(key);
                }
                info!(count = swept.len(), "sweep removed expired entries");
            } else {
                debug!("sweep found no expired entries");
            }
        }
    })
}
