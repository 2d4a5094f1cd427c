// Timed puzzle run: progression, timer, streak and scoring over the chunk cache.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::cache::ChunkCache;
use super::manifest::Manifest;
use super::progression::{resolve, Tier};
use super::puzzle::{Chunk, PuzzleView};
use super::scoring::{calculate_puzzle_score, goal_text};
use crate::config::EngineConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No puzzle active (fresh, after reset, or after a solve).
    Idle,
    InProgress,
    /// Time ran out. Only `reset()` leaves this state.
    GameOver,
}

/// Result of a completed puzzle.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveSummary {
    pub score: u32,
    pub solve_seconds: f64,
    /// Streak including this solve.
    pub streak: u32,
    pub total_score: u64,
    pub remaining_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// No puzzle is active, or the run is over.
    NoActivePuzzle,
    /// Wrong move; the streak was reset and the puzzle stays active.
    Incorrect { move_index: usize },
    /// Right move, more moves still expected.
    Correct { move_index: usize },
    /// Right final move; the puzzle was scored.
    Solved(SolveSummary),
}

impl MoveOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, MoveOutcome::Correct { .. } | MoveOutcome::Solved(_))
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, MoveOutcome::Solved(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub score: u64,
    pub streak: u32,
    /// Equal to the current streak, so a miss also resets it.
    pub puzzles_solved: u32,
}

struct ActivePuzzle {
    chunk: Arc<Chunk>,
    index: usize,
    solution: Vec<String>,
}

impl ActivePuzzle {
    fn view(&self) -> PuzzleView {
        let record = &self.chunk.puzzles[self.index];
        PuzzleView {
            fen: record.fen.clone(),
            moves: self.solution.clone(),
            rating: record.rating,
            themes: record.theme_tags().map(str::to_string).collect(),
            goal: goal_text(&record.fen, &record.themes),
        }
    }
}

pub struct PuzzleSession {
    cache: Arc<ChunkCache>,
    rng: StdRng,
    total_time: f64,
    base_points: u32,
    current_tier: Tier,
    current_streak: u32,
    current_score: u64,
    remaining_time: f64,
    solve_started: Option<Instant>,
    last_tick: Option<Instant>,
    current_puzzle: Option<ActivePuzzle>,
    manifest: Option<Manifest>,
}

impl PuzzleSession {
    pub fn new(cache: Arc<ChunkCache>, config: &EngineConfig) -> Self {
        Self::with_rng(cache, config, StdRng::from_entropy())
    }

    /// Session with a reproducible puzzle pick order.
    pub fn with_rng_seed(cache: Arc<ChunkCache>, config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(cache, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cache: Arc<ChunkCache>, config: &EngineConfig, rng: StdRng) -> Self {
        Self {
            cache,
            rng,
            total_time: config.session_seconds,
            base_points: config.base_points,
            current_tier: Tier::Tutorial,
            current_streak: 0,
            current_score: 0,
            remaining_time: config.session_seconds,
            solve_started: None,
            last_tick: None,
            current_puzzle: None,
            manifest: None,
        }
    }

    /// Bring up the codec and read the content manifest. Returns `false` if
    /// either fails; the session must not be used until this succeeds.
    pub async fn init(&mut self) -> bool {
        match self.try_init().await {
            Ok(()) => true,
            Err(e) => {
                warn!("puzzle session init failed: {}", e);
                false
            }
        }
    }

    async fn try_init(&mut self) -> Result<()> {
        self.cache.decoder().ready().await?;
        let manifest =
            Manifest::fetch(self.cache.source().as_ref(), self.cache.cdn_base()).await?;
        info!("puzzle session ready ({} puzzles listed)", manifest.total_puzzles());
        self.manifest = Some(manifest);
        Ok(())
    }

    /// Record the solve start. The tick clock is anchored on the first call only.
    pub fn start_puzzle_timer(&mut self) {
        self.start_puzzle_timer_at(Instant::now());
    }

    pub fn start_puzzle_timer_at(&mut self, now: Instant) {
        self.solve_started = Some(now);
        if self.last_tick.is_none() {
            self.last_tick = Some(now);
        }
    }

    /// Charge real time elapsed since the previous tick. Returns remaining seconds.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let last = *self.last_tick.get_or_insert(now);
        let elapsed = now.saturating_duration_since(last).as_secs_f64();
        self.remaining_time = (self.remaining_time - elapsed).max(0.0);
        self.last_tick = Some(now);
        if self.remaining_time <= 0.0 {
            debug!("session time exhausted");
        }
        self.remaining_time
    }

    /// Serve the next puzzle for the current streak. `None` when the run is over
    /// or the chunk is unavailable.
    pub async fn next_puzzle(&mut self) -> Option<PuzzleView> {
        if self.is_game_over() {
            return None;
        }

        let (tier, chunk_index) = resolve(self.current_streak);
        self.current_tier = tier;

        let chunk = self.cache.get(tier, chunk_index).await?;
        if chunk.is_empty() {
            warn!("chunk {} has no puzzles", chunk.key);
            return None;
        }

        let index = self.rng.gen_range(0..chunk.len());
        let solution = chunk.puzzles[index].solution();
        let active = ActivePuzzle {
            chunk,
            index,
            solution,
        };
        let view = active.view();
        debug!(
            "serving puzzle {}#{} rating={} streak={}",
            active.chunk.key, index, view.rating, self.current_streak
        );

        self.current_puzzle = Some(active);
        self.start_puzzle_timer();
        Some(view)
    }

    pub fn submit_move(&mut self, mv: &str, move_index: usize) -> MoveOutcome {
        self.submit_move_at(mv, move_index, Instant::now())
    }

    pub fn submit_move_at(&mut self, mv: &str, move_index: usize, now: Instant) -> MoveOutcome {
        if self.is_game_over() {
            return MoveOutcome::NoActivePuzzle;
        }
        let Some(active) = &self.current_puzzle else {
            return MoveOutcome::NoActivePuzzle;
        };

        let expected = active.solution.get(move_index);
        if expected.map(String::as_str) != Some(mv) {
            debug!(
                "incorrect move {} at {} (streak {} lost)",
                mv, move_index, self.current_streak
            );
            self.current_streak = 0;
            return MoveOutcome::Incorrect { move_index };
        }

        if move_index + 1 < active.solution.len() {
            return MoveOutcome::Correct { move_index };
        }

        let solve_seconds = self
            .solve_started
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0);
        let score = calculate_puzzle_score(self.base_points, self.current_streak, solve_seconds);

        self.current_streak += 1;
        self.current_score += u64::from(score);
        self.current_puzzle = None;
        self.solve_started = None;

        info!(
            "puzzle solved score={} time={:.1}s streak={} total={}",
            score, solve_seconds, self.current_streak, self.current_score
        );

        MoveOutcome::Solved(SolveSummary {
            score,
            solve_seconds,
            streak: self.current_streak,
            total_score: self.current_score,
            remaining_time: self.remaining_time,
        })
    }

    pub fn is_game_over(&self) -> bool {
        self.remaining_time <= 0.0
    }

    pub fn get_final_score(&self) -> FinalScore {
        FinalScore {
            score: self.current_score,
            streak: self.current_streak,
            puzzles_solved: self.current_streak,
        }
    }

    /// Record `tier` as the current tier and restart the streak.
    ///
    /// The tier is advisory only: it is reported by `current_tier` until the next
    /// `next_puzzle`, which picks the tier from the streak again. Calling
    /// `set_mode(Tier::Boss)` therefore serves a tutorial puzzle next, not a boss one.
    pub fn set_mode(&mut self, tier: Tier) {
        self.current_tier = tier;
        self.current_streak = 0;
    }

    pub fn reset(&mut self) {
        self.current_tier = Tier::Tutorial;
        self.current_streak = 0;
        self.current_score = 0;
        self.remaining_time = self.total_time;
        self.solve_started = None;
        self.last_tick = None;
        self.current_puzzle = None;
        debug!("session reset");
    }

    pub fn state(&self) -> SessionState {
        if self.is_game_over() {
            SessionState::GameOver
        } else if self.current_puzzle.is_some() {
            SessionState::InProgress
        } else {
            SessionState::Idle
        }
    }

    pub fn current_puzzle(&self) -> Option<PuzzleView> {
        self.current_puzzle.as_ref().map(ActivePuzzle::view)
    }

    pub fn current_tier(&self) -> Tier {
        self.current_tier
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn current_score(&self) -> u64 {
        self.current_score
    }

    pub fn remaining_time(&self) -> f64 {
        self.remaining_time
    }

    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn cache(&self) -> &Arc<ChunkCache> {
        &self.cache
    }
}
