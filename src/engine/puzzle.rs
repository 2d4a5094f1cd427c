// Puzzle records as shipped in chunk files, and the view handed to the UI.

use serde::{Deserialize, Deserializer, Serialize};

use super::progression::CacheKey;

/// One puzzle from a chunk file. Field names follow the chunk JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    #[serde(rename = "FEN")]
    pub fen: String,
    /// Space-separated solution moves.
    #[serde(rename = "Moves")]
    pub moves: String,
    #[serde(rename = "Rating", deserialize_with = "rating_from_str_or_int")]
    pub rating: u32,
    /// Space-separated theme tags.
    #[serde(rename = "Themes", default)]
    pub themes: String,
}

impl PuzzleRecord {
    pub fn solution(&self) -> Vec<String> {
        self.moves.split_whitespace().map(str::to_string).collect()
    }

    pub fn theme_tags(&self) -> impl Iterator<Item = &str> {
        self.themes.split_whitespace()
    }
}

/// The batch tool writes ratings as strings; accept plain integers too.
fn rating_from_str_or_int<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A decoded chunk: immutable once inserted into the cache.
#[derive(Debug)]
pub struct Chunk {
    pub key: CacheKey,
    pub puzzles: Vec<PuzzleRecord>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}

/// What the UI needs to render the active puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleView {
    pub fen: String,
    pub moves: Vec<String>,
    pub rating: u32,
    pub themes: Vec<String>,
    pub goal: String,
}
