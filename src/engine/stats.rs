// Cache counters: hit rate, fills, evictions and prefetch outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub fills: u64,
    pub fill_failures: u64,
    pub evictions: u64,
    pub prefetch_started: u64,
    pub prefetch_skipped: u64,
    pub prefetch_failed: u64,
    pub resident_chunks: usize,
    pub hit_rate: f64,
}

#[derive(Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    fills: AtomicU64,
    fill_failures: AtomicU64,
    evictions: AtomicU64,
    prefetch_started: AtomicU64,
    prefetch_skipped: AtomicU64,
    prefetch_failed: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fill(&self) {
        self.fills.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fill_failure(&self) {
        self.fill_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prefetch_started(&self) {
        self.prefetch_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prefetch_skipped(&self) {
        self.prefetch_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prefetch_failed(&self) {
        self.prefetch_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, resident_chunks: usize) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups > 0 {
            hits as f64 / lookups as f64
        } else {
            0.0
        };

        CacheStatsSnapshot {
            hits,
            misses,
            fills: self.fills.load(Ordering::Relaxed),
            fill_failures: self.fill_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            prefetch_started: self.prefetch_started.load(Ordering::Relaxed),
            prefetch_skipped: self.prefetch_skipped.load(Ordering::Relaxed),
            prefetch_failed: self.prefetch_failed.load(Ordering::Relaxed),
            resident_chunks,
            hit_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let stats = CacheStats::new();
        stats.record_miss();
        stats.record_fill();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_eviction();
        stats.record_prefetch_started();
        stats.record_prefetch_skipped();

        let snap = stats.snapshot(4);
        assert_eq!(snap.resident_chunks, 4);
        assert_eq!(snap.hits, 3);
        assert_eq!(snap.fills, 1);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.prefetch_skipped, 1);
        assert!((snap.hit_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_hit_rate() {
        assert_eq!(CacheStats::new().snapshot(0).hit_rate, 0.0);
    }
}
