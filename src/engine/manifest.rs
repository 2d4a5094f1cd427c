use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use super::progression::metadata_url;
use crate::error::{DecodeError, Result};
use crate::source::traits::ChunkSource;

/// `metadata.json` written by the chunk batcher. Only logged, not validated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    /// Per-category entries keyed by the category's file name (`coreLoop`, ...).
    /// Usually a bare count, but any JSON value is accepted.
    #[serde(default)]
    pub counts: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

impl Manifest {
    pub async fn fetch(source: &dyn ChunkSource, cdn_base: &str) -> Result<Self> {
        let url = metadata_url(cdn_base);
        let body = source.fetch(&url).await?;
        let manifest: Manifest = serde_json::from_slice(&body).map_err(DecodeError::from)?;
        info!(
            "puzzle metadata loaded: counts={:?} timestamp={}",
            manifest.counts,
            manifest
                .timestamp
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        Ok(manifest)
    }

    /// Count for one category when it is a non-negative integer.
    pub fn count(&self, category: &str) -> Option<u64> {
        self.counts.get(category).and_then(|v| v.as_u64())
    }

    /// Sum of the integer counts; other entries are skipped.
    pub fn total_puzzles(&self) -> u64 {
        self.counts.values().filter_map(|v| v.as_u64()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{"counts": {"tutorial": 120, "coreLoop": 4300, "spice": 900, "boss": 75},
                       "timestamp": "2024-05-01T12:00:00"}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.count("coreLoop"), Some(4300));
        assert_eq!(manifest.total_puzzles(), 5395);
        assert!(manifest.timestamp.is_some());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let json = r#"{"counts": {}, "timestamp": 1714564800, "version": 2}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.total_puzzles(), 0);
    }

    #[test]
    fn test_non_integer_counts_accepted() {
        let json = r#"{"counts": {"tutorial": {"puzzles": 250, "chunks": 3}, "spice": 12.5, "boss": 40},
                       "timestamp": "2024-05-01"}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.count("tutorial"), None);
        assert_eq!(manifest.count("boss"), Some(40));
        assert_eq!(manifest.total_puzzles(), 40);
        assert!(manifest.counts["tutorial"].is_object());
    }
}
