//! Background job: drop expired result-cache entries.
//!
//! Memory hygiene only. Reads already treat expired entries as absent, and
//! nothing here refreshes data.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use crate::cache::ResultCache;

/// Spawn the sweep task. Call this once at startup.
pub fn spawn(cache: ResultCache, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            sweep(&cache);
        }
    })
}

fn sweep(cache: &ResultCache) -> usize {
    let removed = cache.evict_expired();
    if removed > 0 {
        tracing::debug!(removed, remaining = cache.len(), "evicted expired model lists");
    }
    removed
}
