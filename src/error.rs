// Error taxonomy: network, decode and initialization failures.

use std::time::Duration;

use thiserror::Error;

use crate::detect::compression::Compression;

/// Failure to retrieve bytes from the content store.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Failure to turn a fetched payload into puzzle records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported payload encoding: {0:?}")]
    Unsupported(Compression),
    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),
    #[error("malformed chunk json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("network error: {0}")]
    Network(#[from] FetchError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("initialization error: {0}")]
    Initialization(String),
}

pub type Result<T, E = PuzzleError> = std::result::Result<T, E>;
