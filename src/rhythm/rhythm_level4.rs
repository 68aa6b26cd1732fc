// Rhythm Level 4 definition
// This file contains LEVEL4_WORDS, LEVEL4_PATTERN and the level4() builder.
use super::{LevelError, LevelSpec};

pub static LEVEL4_WORDS: [&str; 8] = ["BREAD", "CAKE", "DOUGH", "FISH", "GUM", "HAM", "JAM", "KALE"];

// Syncopated: eighth pairs on slots 2-3 and 6-7.
pub static LEVEL4_PATTERN: [f64; 8] = [1.0, 0.5, 0.5, 1.0, 1.0, 0.5, 0.5, 1.0];

pub fn level4() -> Result<LevelSpec, LevelError> {
    LevelSpec::new(4, 120.0, 3, 16, LEVEL4_PATTERN.to_vec(), LEVEL4_WORDS)
}
