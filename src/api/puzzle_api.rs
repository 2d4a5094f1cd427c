use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::cache::ChunkCache;
use crate::engine::decoder::ChunkDecoder;
use crate::engine::session::PuzzleSession;
use crate::source::http_source::HttpSource;
use crate::source::retry::RetryingSource;
use crate::source::traits::ChunkSource;

/// Session wired to the HTTP content store described by `config`.
///
/// Call `init()` on the result before serving puzzles.
pub fn create_session(config: &EngineConfig) -> PuzzleSession {
    create_session_with_source(config, Arc::new(HttpSource::new()))
}

/// Session over an arbitrary single-attempt transport; the configured retry
/// policy is layered on top.
pub fn create_session_with_source(
    config: &EngineConfig,
    transport: Arc<dyn ChunkSource>,
) -> PuzzleSession {
    let source = Arc::new(RetryingSource::new(transport, config.retry_policy()));
    let cache = Arc::new(ChunkCache::new(
        config.cdn_base.clone(),
        source,
        ChunkDecoder::standard(),
        config.cache_capacity,
    ));
    PuzzleSession::new(cache, config)
}
