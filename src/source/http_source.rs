use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use super::traits::ChunkSource;
use crate::error::FetchError;

pub struct HttpSource {
    client: Client,
    headers: HashMap<String, String>,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::with_headers(HashMap::new())
    }

    /// Source that sends `headers` with every request (e.g. a CDN access token).
    pub fn with_headers(headers: HashMap<String, String>) -> Self {
        Self {
            client: Client::new(),
            headers,
        }
    }

    fn build_request(&self, url: &str) -> RequestBuilder {
        let mut req = self.client.get(url);
        for (k, v) in &self.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        req
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChunkSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let resp = self
            .build_request(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        debug!("http fetch status={} url={}", status.as_u16(), url);
        if !status.is_success() {
            warn!("http fetch failed status={} url={}", status.as_u16(), url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
