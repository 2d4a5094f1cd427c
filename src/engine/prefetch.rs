// Background warming of the next chunk, attempted at most once per key.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::cache::ChunkCache;
use super::progression::{CacheKey, Tier};

/// Keys whose prefetch has been attempted. A key is never removed, so a failed
/// prefetch is not retried automatically; a regular `get` still can fill it.
#[derive(Default)]
pub struct PrefetchMarkers {
    attempted: Mutex<HashSet<CacheKey>>,
}

impl PrefetchMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as attempted. Returns `false` if it already was.
    pub fn mark(&self, key: CacheKey) -> bool {
        self.attempted.lock().insert(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.attempted.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.attempted.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempted.lock().is_empty()
    }
}

impl ChunkCache {
    /// Warm `(tier, chunk_index)` in the background.
    ///
    /// Returns the spawned task, or `None` when the key was already attempted.
    /// Callers are not expected to await the handle. Failures are logged inside
    /// the task and never reach the caller. Must be called within a tokio runtime.
    pub fn prefetch(self: &Arc<Self>, tier: Tier, chunk_index: u32) -> Option<JoinHandle<()>> {
        let key = CacheKey::new(tier, chunk_index);

        // Marked before the fill runs so overlapping calls collapse to one attempt.
        if !self.prefetched.mark(key) {
            self.stats.record_prefetch_skipped();
            debug!("prefetch {} skipped: already attempted", key);
            return None;
        }

        self.stats.record_prefetch_started();
        let cache = Arc::clone(self);

        Some(tokio::spawn(async move {
            if cache.contains(key.tier, key.chunk_index) {
                debug!("prefetch {} skipped: already resident", key);
                return;
            }

            match cache.fill(key).await {
                Ok(chunk) => {
                    debug!("prefetch {} done ({} puzzles)", key, chunk.len());
                }
                Err(e) => {
                    cache.stats.record_prefetch_failed();
                    warn!("prefetch {} failed: {}", key, e);
                }
            }
        }))
    }

    pub fn prefetch_attempted(&self, tier: Tier, chunk_index: u32) -> bool {
        self.prefetched.contains(&CacheKey::new(tier, chunk_index))
    }
}
