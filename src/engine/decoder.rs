// Chunk decoder: decompress fetched bytes and parse the JSON puzzle array.

use std::io::{Read, Write};
use std::sync::Arc;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::puzzle::PuzzleRecord;
use crate::detect::compression::{detect_compression, Compression};
use crate::error::{DecodeError, PuzzleError, Result};

pub trait Codec: Send + Sync {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError>;
}

/// Produces the codec. Runs at most once per successful `ChunkDecoder` initialization.
#[async_trait]
pub trait CodecLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Codec>>;
}

/// gzip via flate2, zstd via the zstd crate. Uncompressed JSON arrays pass
/// through untouched.
pub struct ChunkCodec;

impl Codec for ChunkCodec {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        match detect_compression(input) {
            Compression::Gzip => {
                let mut out = Vec::with_capacity(input.len() * 4);
                GzDecoder::new(input).read_to_end(&mut out)?;
                Ok(out)
            }
            Compression::Zstd => Ok(zstd::stream::decode_all(input)?),
            Compression::PlainJson => Ok(input.to_vec()),
            other => Err(DecodeError::Unsupported(other)),
        }
    }
}

/// Loads `ChunkCodec` after a round-trip self-test of both compressors.
pub struct ChunkCodecLoader;

impl ChunkCodecLoader {
    const PROBE: &'static [u8] = b"[]";

    fn self_test(codec: &ChunkCodec, name: &str, compressed: &[u8]) -> Result<()> {
        let round_trip = codec
            .decompress(compressed)
            .map_err(|e| PuzzleError::Initialization(format!("{} self-test: {}", name, e)))?;
        if round_trip != Self::PROBE {
            return Err(PuzzleError::Initialization(format!(
                "{} self-test produced wrong output",
                name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CodecLoader for ChunkCodecLoader {
    async fn load(&self) -> Result<Arc<dyn Codec>> {
        let init_err = |name: &str, e: std::io::Error| {
            PuzzleError::Initialization(format!("{} self-test: {}", name, e))
        };

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder
            .write_all(Self::PROBE)
            .map_err(|e| init_err("gzip", e))?;
        let gzipped = encoder.finish().map_err(|e| init_err("gzip", e))?;
        let zstded = zstd::stream::encode_all(Self::PROBE, 1).map_err(|e| init_err("zstd", e))?;

        let codec = ChunkCodec;
        Self::self_test(&codec, "gzip", &gzipped)?;
        Self::self_test(&codec, "zstd", &zstded)?;

        info!("chunk codec ready (gzip, zstd)");
        Ok(Arc::new(codec))
    }
}

pub struct ChunkDecoder {
    loader: Arc<dyn CodecLoader>,
    codec: OnceCell<Arc<dyn Codec>>,
}

impl ChunkDecoder {
    pub fn new(loader: Arc<dyn CodecLoader>) -> Self {
        Self {
            loader,
            codec: OnceCell::new(),
        }
    }

    /// Decoder backed by `ChunkCodecLoader`.
    pub fn standard() -> Self {
        Self::new(Arc::new(ChunkCodecLoader))
    }

    /// Wait for the codec to be initialized. Concurrent callers share one load;
    /// after success every call returns immediately. A failed load is retried
    /// by the next caller.
    pub async fn ready(&self) -> Result<&Arc<dyn Codec>> {
        self.codec.get_or_try_init(|| self.loader.load()).await
    }

    pub fn is_ready(&self) -> bool {
        self.codec.initialized()
    }

    pub async fn decode(&self, compressed: &[u8]) -> Result<Vec<PuzzleRecord>> {
        let codec = self.ready().await?;
        let raw = codec.decompress(compressed)?;
        let puzzles: Vec<PuzzleRecord> = serde_json::from_slice(&raw).map_err(DecodeError::from)?;
        debug!(
            "decoded {} puzzles ({} -> {} bytes)",
            puzzles.len(),
            compressed.len(),
            raw.len()
        );
        Ok(puzzles)
    }
}
