// Puzzle engine: chunk cache, prefetch, progression and the scoring session.

pub mod cache;
pub mod decoder;
pub mod manifest;
pub mod prefetch;
pub mod progression;
pub mod puzzle;
pub mod scoring;
pub mod session;
pub mod stats;
