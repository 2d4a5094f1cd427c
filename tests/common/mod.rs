// Shared fixtures: an in-memory content store and chunk builders.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use parking_lot::Mutex;
use serde_json::{json, Value};

use puzzle_rush_engine::engine::cache::ChunkCache;
use puzzle_rush_engine::engine::decoder::ChunkDecoder;
use puzzle_rush_engine::engine::progression::{chunk_url, metadata_url, CacheKey, Tier};
use puzzle_rush_engine::error::FetchError;
use puzzle_rush_engine::source::traits::ChunkSource;

pub const CDN: &str = "https://cdn.test/puzzles";

pub const WHITE_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
pub const BLACK_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 2 3";

/// Content store keyed by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct MemorySource {
    objects: Mutex<HashMap<String, Bytes>>,
    failures: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn insert(&self, url: impl Into<String>, body: impl Into<Bytes>) {
        self.objects.lock().insert(url.into(), body.into());
    }

    pub fn insert_chunk(&self, tier: Tier, index: u32, puzzles: &[Value]) {
        self.insert(chunk_url_for(tier, index), gzip_json(&json!(puzzles)));
    }

    pub fn insert_metadata(&self) {
        let meta = json!({
            "counts": {"tutorial": 100, "coreLoop": 300, "spice": 100, "boss": 0},
            "timestamp": "2024-05-01T12:00:00"
        });
        self.insert(metadata_url(CDN), serde_json::to_vec(&meta).unwrap());
    }

    /// The next `n` fetches of `url` answer 503.
    pub fn fail_next(&self, url: impl Into<String>, n: u32) {
        self.failures.lock().insert(url.into(), n);
    }

    pub fn requests_for(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requests.lock().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut failures = self.failures.lock();
            if let Some(remaining) = failures.get_mut(url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Status {
                        status: 503,
                        url: url.to_string(),
                    });
                }
            }
        }

        self.objects
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

pub fn chunk_url_for(tier: Tier, index: u32) -> String {
    chunk_url(CDN, &CacheKey::new(tier, index))
}

pub fn puzzle(fen: &str, moves: &str, rating: u32, themes: &str) -> Value {
    json!({
        "FEN": fen,
        "Moves": moves,
        "Rating": rating.to_string(),
        "Themes": themes,
    })
}

pub fn gzip_json(value: &Value) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&serde_json::to_vec(value).unwrap())
        .unwrap();
    encoder.finish().unwrap()
}

pub fn zstd_json(value: &Value) -> Vec<u8> {
    zstd::stream::encode_all(&serde_json::to_vec(value).unwrap()[..], 3).unwrap()
}

pub fn new_cache(source: Arc<MemorySource>) -> Arc<ChunkCache> {
    Arc::new(ChunkCache::new(CDN, source, ChunkDecoder::standard(), 5))
}

/// Poll `cond` for up to two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
