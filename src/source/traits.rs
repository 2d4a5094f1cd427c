use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// One retrieval of a remote object. Implementations make a single attempt;
/// retries and deadlines are layered on by `RetryingSource`.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
