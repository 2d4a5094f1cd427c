//! Chunk cache, difficulty progression and scoring session for timed chess
//! puzzle runs.
//!
//! Puzzles live on a remote content store as compressed chunks grouped by
//! difficulty tier. A [`PuzzleSession`] maps the player's streak to a tier and
//! chunk, pulls that chunk through the [`ChunkCache`] (which keeps at most a few
//! chunks in memory and warms the next one in the background), and scores moves
//! against the stored solution while a countdown runs.

pub mod api;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod source;

pub use config::EngineConfig;
pub use engine::cache::ChunkCache;
pub use engine::progression::{resolve, CacheKey, Tier};
pub use engine::puzzle::{Chunk, PuzzleRecord, PuzzleView};
pub use engine::session::{FinalScore, MoveOutcome, PuzzleSession, SessionState, SolveSummary};
pub use error::{DecodeError, FetchError, PuzzleError};
