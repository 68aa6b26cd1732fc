//! Beat-synchronized typing engine.
//!
//! Players press the first letter of the highlighted word while a beat clock
//! walks a cursor over a shuffled grid of eight tiles. Correct, well-timed
//! presses score; wrong keys and silent beats drain health. Clearing every set
//! of a level moves on to the next, faster one.
//!
//! Pieces, leaf-first:
//! - [`LevelTable`] / [`LevelSpec`] / [`Tile`]: validated, immutable level data.
//! - [`BeatClock`]: per-slot beat durations and boundary detection.
//! - [`TileSequencer`]: the shuffled active set and the tile cursor.
//! - [`judge`]: timing / correctness classification of one key press.
//! - [`Health`]: damage model.
//! - [`RhythmEngine`]: set / level state machine owning a [`RunState`] and
//!   emitting [`EngineEvent`]s for renderers to consume.
//!
//! Rendering, audio and scene flow are out of scope here; see `web.rs` for the
//! browser glue that drives the engine from `requestAnimationFrame` and
//! `keydown`.

use std::sync::OnceLock;

mod clock;
mod error;
mod health;
mod judge;
mod level;
mod progression;
mod sequencer;

// Built-in level definitions live in separate files:
mod rhythm_level1;
mod rhythm_level2;
mod rhythm_level3;
mod rhythm_level4;
mod rhythm_level5;

pub use clock::BeatClock;
pub use error::LevelError;
pub use health::{Health, MAX_HEALTH};
pub use judge::{
    GREAT_SCORE, IgnoreReason, Outcome, PERFECT_EARLY, PERFECT_LATE, PERFECT_SCORE, judge,
};
pub use level::{LevelSpec, LevelTable, Tile};
pub use progression::{KeyPress, KeyResult, RhythmEngine};
pub use sequencer::{NextTile, TileSequencer};

pub use rhythm_level1::LEVEL1_WORDS;
pub use rhythm_level2::LEVEL2_WORDS;
pub use rhythm_level3::LEVEL3_WORDS;
pub use rhythm_level4::LEVEL4_WORDS;
pub use rhythm_level5::LEVEL5_WORDS;

/// The shipped table, built once.
pub(crate) fn builtin_levels() -> &'static LevelTable {
    static TABLE: OnceLock<LevelTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            rhythm_level1::level1(),
            rhythm_level2::level2(),
            rhythm_level3::level3(),
            rhythm_level4::level4(),
            rhythm_level5::level5(),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .and_then(LevelTable::new)
        .expect("built-in level table is valid")
    })
}

/// Where the run is in the set / level flow.
///
/// `SetComplete` and `LevelComplete` are passed through inside a single engine
/// call; between calls the engine rests in `Playing`, `GameOver` or
/// `RunComplete`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GamePhase {
    Playing,
    SetComplete,
    LevelComplete,
    GameOver,
    RunComplete,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::RunComplete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Playing => "PLAYING",
            GamePhase::SetComplete => "SET_COMPLETE",
            GamePhase::LevelComplete => "LEVEL_COMPLETE",
            GamePhase::GameOver => "GAME_OVER",
            GamePhase::RunComplete => "RUN_COMPLETE",
        }
    }
}

/// Transitions the engine reports to renderers / audio / narrative layers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EngineEvent {
    LevelStarted { level_id: u32 },
    /// A fresh shuffle is in place; redraw the grid from `active_set()`.
    SetStarted { level_id: u32, set_number: u32 },
    TileActivated { index: usize },
    Judged { tile: usize, outcome: Outcome, score_delta: u32 },
    HealthChanged { health: u32 },
    SetCompleted { set_number: u32 },
    LevelCompleted { level_id: u32 },
    GameOver { final_score: u64 },
    RunCompleted { final_score: u64 },
}

/// Mutable run aggregate carried across sets and levels.
#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    pub(crate) level_index: usize,
    pub(crate) set_number: u32,
    pub(crate) active_tile: Option<usize>,
    pub(crate) health: Health,
    pub(crate) score: u64,
    pub(crate) beat_anchor_ms: f64,
    pub(crate) judged: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            level_index: 0,
            set_number: 1,
            active_tile: None,
            health: Health::default(),
            score: 0,
            beat_anchor_ms: 0.0,
            judged: true,
        }
    }
}

impl RunState {
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn active_tile(&self) -> Option<usize> {
        self.active_tile
    }

    /// Cursor as the grid sees it: -1 before the first beat of a set.
    pub fn active_tile_index(&self) -> i32 {
        self.active_tile.map_or(-1, |i| i as i32)
    }

    pub fn health(&self) -> u32 {
        self.health.value()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn beat_anchor_ms(&self) -> f64 {
        self.beat_anchor_ms
    }

    pub fn has_judged_current_beat(&self) -> bool {
        self.judged
    }
}
