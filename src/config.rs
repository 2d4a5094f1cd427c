use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::source::retry::RetryPolicy;

/// Maximum number of decoded chunks resident in the cache at once.
pub const CACHE_CAPACITY: usize = 5;

/// Total fetch attempts per request (first try included).
pub const DEFAULT_FETCH_RETRIES: u32 = 3;

/// Deadline shared by all attempts of a single fetch (5 s).
pub const FETCH_TIMEOUT_MS: u64 = 5_000;

/// Backoff before retry `n` is `BACKOFF_BASE_MS * 2^n` (1 s, 2 s, 4 s, ...).
pub const BACKOFF_BASE_MS: u64 = 1_000;

/// Length of a timed run in seconds.
pub const SESSION_SECONDS: f64 = 60.0;

/// Points for a solved puzzle before streak and speed multipliers.
pub const BASE_POINTS: u32 = 100;

/// Cap on the streak multiplier.
pub const MAX_STREAK_MULTIPLIER: f64 = 3.0;

/// Streak multiplier gained per consecutive solve.
pub const STREAK_MULTIPLIER_STEP: f64 = 0.1;

/// Solves faster than this earn a speed bonus above 1x.
pub const SPEED_BONUS_WINDOW_SECONDS: f64 = 15.0;

/// Top-level configuration for the puzzle engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the content store holding `metadata.json` and tier directories.
    pub cdn_base: String,
    /// Maximum number of chunks kept in memory.
    pub cache_capacity: usize,
    /// Total attempts per fetch.
    pub fetch_retries: u32,
    /// Deadline for one fetch across all its attempts.
    pub fetch_timeout_ms: u64,
    /// First backoff delay; doubles on every further retry.
    pub backoff_base_ms: u64,
    /// Run length restored by `reset()`.
    pub session_seconds: f64,
    /// Points for a solve before multipliers.
    pub base_points: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cdn_base: String::new(),
            cache_capacity: CACHE_CAPACITY,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            backoff_base_ms: BACKOFF_BASE_MS,
            session_seconds: SESSION_SECONDS,
            base_points: BASE_POINTS,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Fields missing from the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.fetch_retries,
            timeout: Duration::from_millis(self.fetch_timeout_ms),
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }
}
