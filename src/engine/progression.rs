// Difficulty curve: streak -> (tier, chunk index), plus chunk addressing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Puzzles solved before leaving the tutorial tier.
const TUTORIAL_STREAK: u32 = 3;
/// Streak at which the spice rotation starts.
const ROTATION_STREAK: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Tutorial,
    CoreLoop,
    Spice,
    Boss,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Tutorial, Tier::CoreLoop, Tier::Spice, Tier::Boss];

    /// Directory name on the content store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tutorial => "tutorial",
            Tier::CoreLoop => "core-loop",
            Tier::Spice => "spice",
            Tier::Boss => "boss",
        }
    }

    /// Prefix of the chunk files inside the tier directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Tier::Tutorial => "tutorial",
            Tier::CoreLoop => "coreLoop",
            Tier::Spice => "spice",
            Tier::Boss => "boss",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    /// Accepts both the directory form (`core-loop`) and the file form (`coreLoop`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.as_str() == s || t.file_name() == s)
            .ok_or_else(|| format!("unknown tier: {}", s))
    }
}

/// Cache key; displays as `"{tier}-{chunk_index}"`, e.g. `core-loop-3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tier: Tier,
    pub chunk_index: u32,
}

impl CacheKey {
    pub fn new(tier: Tier, chunk_index: u32) -> Self {
        Self { tier, chunk_index }
    }

    /// The chunk after this one in the same tier.
    pub fn next(&self) -> Self {
        Self::new(self.tier, self.chunk_index.saturating_add(1))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tier, self.chunk_index)
    }
}

/// Map a streak to the tier and chunk the next puzzle is drawn from.
///
/// Below 3 everything comes from tutorial chunk 0. From 3 to 7 the core-loop
/// chunk advances every two solves. From 8 on, every fifth puzzle is a spice
/// puzzle (new spice chunk every ten solves) and the rest are core-loop (new
/// chunk every five solves). Chunk indices are not clamped to what exists.
pub fn resolve(streak: u32) -> (Tier, u32) {
    if streak < TUTORIAL_STREAK {
        return (Tier::Tutorial, 0);
    }
    if streak < ROTATION_STREAK {
        return (Tier::CoreLoop, (streak - TUTORIAL_STREAK) / 2);
    }

    let p = streak - ROTATION_STREAK;
    if p % 5 == 4 {
        (Tier::Spice, p / 10)
    } else {
        (Tier::CoreLoop, p / 5)
    }
}

/// `{cdn_base}/{tier}/{tierFileName}-{chunk_index}.json.gz`
pub fn chunk_url(cdn_base: &str, key: &CacheKey) -> String {
    format!(
        "{}/{}/{}-{}.json.gz",
        cdn_base.trim_end_matches('/'),
        key.tier.as_str(),
        key.tier.file_name(),
        key.chunk_index
    )
}

pub fn metadata_url(cdn_base: &str) -> String {
    format!("{}/metadata.json", cdn_base.trim_end_matches('/'))
}
