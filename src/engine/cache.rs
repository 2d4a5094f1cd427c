// In-memory chunk cache: capped, insertion-ordered, filled from the remote store.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::decoder::ChunkDecoder;
use super::prefetch::PrefetchMarkers;
use super::progression::{chunk_url, CacheKey, Tier};
use super::puzzle::Chunk;
use super::stats::{CacheStats, CacheStatsSnapshot};
use crate::error::Result;
use crate::source::traits::ChunkSource;

/// Capped map that evicts the oldest *inserted* key. Reads do not refresh order.
pub struct ChunkStore {
    capacity: usize,
    order: VecDeque<CacheKey>,
    entries: HashMap<CacheKey, Arc<Chunk>>,
}

impl ChunkStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            entries: HashMap::with_capacity(capacity + 1),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Chunk>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert `chunk`, returning the key evicted to stay within capacity.
    ///
    /// Replacing an existing key keeps its original insertion position.
    pub fn insert(&mut self, key: CacheKey, chunk: Arc<Chunk>) -> Option<CacheKey> {
        if self.entries.insert(key, chunk).is_some() {
            return None;
        }
        self.order.push_back(key);

        if self.entries.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            self.entries.remove(&oldest);
            return Some(oldest);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resident keys, oldest insertion first.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.order.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

pub struct ChunkCache {
    cdn_base: String,
    source: Arc<dyn ChunkSource>,
    decoder: ChunkDecoder,
    store: Mutex<ChunkStore>,
    pub(super) prefetched: PrefetchMarkers,
    pub(super) stats: CacheStats,
}

impl ChunkCache {
    /// `source` should already carry the retry policy (see `RetryingSource`).
    pub fn new(
        cdn_base: impl Into<String>,
        source: Arc<dyn ChunkSource>,
        decoder: ChunkDecoder,
        capacity: usize,
    ) -> Self {
        Self {
            cdn_base: cdn_base.into(),
            source,
            decoder,
            store: Mutex::new(ChunkStore::new(capacity)),
            prefetched: PrefetchMarkers::new(),
            stats: CacheStats::new(),
        }
    }

    /// Return the chunk for `(tier, chunk_index)`, fetching it on a miss.
    ///
    /// `None` means the chunk is unavailable right now (fetch or decode failed);
    /// the failure is logged and nothing is cached. A successful fill schedules a
    /// background prefetch of the following chunk.
    pub async fn get(self: &Arc<Self>, tier: Tier, chunk_index: u32) -> Option<Arc<Chunk>> {
        let key = CacheKey::new(tier, chunk_index);

        let cached = self.store.lock().get(&key);
        if let Some(chunk) = cached {
            self.stats.record_hit();
            debug!("chunk {} cache hit", key);
            return Some(chunk);
        }

        self.stats.record_miss();
        debug!("chunk {} cache miss", key);

        match self.fill(key).await {
            Ok(chunk) => {
                // Fire-and-forget: the handle is dropped, the task keeps running.
                let _ = self.prefetch(tier, chunk_index.saturating_add(1));
                Some(chunk)
            }
            Err(e) => {
                warn!("chunk {} unavailable: {}", key, e);
                None
            }
        }
    }

    /// Fetch, decode and insert `key`. Not single-flight: concurrent fills of the
    /// same key each hit the network and the last insert wins.
    pub(super) async fn fill(&self, key: CacheKey) -> Result<Arc<Chunk>> {
        let url = chunk_url(&self.cdn_base, &key);

        let result = async {
            let compressed = self.source.fetch(&url).await?;
            self.decoder.decode(&compressed).await
        }
        .await;

        let puzzles = match result {
            Ok(puzzles) => puzzles,
            Err(e) => {
                self.stats.record_fill_failure();
                return Err(e);
            }
        };

        let chunk = Arc::new(Chunk { key, puzzles });
        let evicted = self.store.lock().insert(key, Arc::clone(&chunk));
        self.stats.record_fill();
        info!("chunk {} cached ({} puzzles)", key, chunk.len());

        if let Some(old) = evicted {
            self.stats.record_eviction();
            debug!("chunk {} evicted", old);
        }

        Ok(chunk)
    }

    pub fn contains(&self, tier: Tier, chunk_index: u32) -> bool {
        self.store.lock().contains(&CacheKey::new(tier, chunk_index))
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn keys_in_order(&self) -> Vec<CacheKey> {
        self.store.lock().keys()
    }

    pub fn decoder(&self) -> &ChunkDecoder {
        &self.decoder
    }

    pub fn source(&self) -> &Arc<dyn ChunkSource> {
        &self.source
    }

    pub fn cdn_base(&self) -> &str {
        &self.cdn_base
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        let resident = self.len();
        self.stats.snapshot(resident)
    }
}
