//! Configuration errors for level tables.
//!
//! None of these can happen mid-run: a table is validated once when it is built
//! (or parsed) and the engine only ever sees validated data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("tile word cannot be empty")]
    EmptyWord,
    #[error("level {level_id} has an empty word pool")]
    EmptyWordPool { level_id: u32 },
    #[error("level {level_id} has non-positive bpm {bpm}")]
    NonPositiveBpm { level_id: u32, bpm: f64 },
    #[error("level {level_id} must have at least one set")]
    ZeroSets { level_id: u32 },
    #[error("level {level_id} beat pattern has {pattern_len} slots but {tile_count} tiles")]
    PatternLengthMismatch {
        level_id: u32,
        pattern_len: usize,
        tile_count: usize,
    },
    #[error("level {level_id} beat multiplier at slot {slot} must be positive, got {value}")]
    NonPositiveMultiplier { level_id: u32, slot: usize, value: f64 },
    #[error("level table cannot be empty")]
    EmptyTable,
    #[error("duplicate level id in table: {level_id}")]
    DuplicateLevelId { level_id: u32 },
    #[cfg(feature = "serde_json")]
    #[error("level table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
