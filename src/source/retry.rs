// Retrying fetcher: shared deadline plus exponential backoff around any ChunkSource.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use super::traits::ChunkSource;
use crate::config::{BACKOFF_BASE_MS, DEFAULT_FETCH_RETRIES, FETCH_TIMEOUT_MS};
use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Zero is treated as one.
    pub retries: u32,
    /// Deadline covering every attempt and every backoff sleep of one fetch.
    pub timeout: Duration,
    /// Delay before the first retry; doubled for each retry after it.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_FETCH_RETRIES,
            timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
            backoff_base: Duration::from_millis(BACKOFF_BASE_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based): `backoff_base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }
}

/// Decorator adding the retry policy to an inner single-attempt source.
pub struct RetryingSource {
    inner: Arc<dyn ChunkSource>,
    policy: RetryPolicy,
}

impl RetryingSource {
    pub fn new(inner: Arc<dyn ChunkSource>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Bytes, FetchError> {
        let attempts = self.policy.retries.max(1);
        let mut attempt = 0u32;

        loop {
            match self.inner.fetch(url).await {
                Ok(data) => {
                    debug!("fetched {} ({} bytes, attempt {})", url, data.len(), attempt);
                    return Ok(data);
                }
                Err(e) if attempt + 1 >= attempts => {
                    warn!("fetch {} failed after {} attempts: {}", url, attempts, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "fetch {} failed (attempt {}): {}; retrying in {:?}",
                        url, attempt, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl ChunkSource for RetryingSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        // Dropping the retry future on expiry cancels whichever request is in flight.
        match tokio::time::timeout(self.policy.timeout, self.fetch_with_retry(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("fetch {} timed out after {:?}", url, self.policy.timeout);
                Err(FetchError::Timeout(self.policy.timeout))
            }
        }
    }
}
