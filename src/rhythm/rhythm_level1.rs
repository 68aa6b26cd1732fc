// Rhythm Level 1 definition
// This file contains LEVEL1_WORDS, LEVEL1_PATTERN and the level1() builder.
use super::{LevelError, LevelSpec};

pub static LEVEL1_WORDS: [&str; 8] = ["APPLE", "BANANA", "CHERRY", "DATE", "EGG", "FIG", "GRAPE", "HONEY"];

// Straight quarters.
pub static LEVEL1_PATTERN: [f64; 8] = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];

pub fn level1() -> Result<LevelSpec, LevelError> {
    LevelSpec::new(1, 90.0, 3, 10, LEVEL1_PATTERN.to_vec(), LEVEL1_WORDS)
}
