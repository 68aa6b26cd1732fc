// Rhythm Level 2 definition
// This file contains LEVEL2_WORDS, LEVEL2_PATTERN and the level2() builder.
use super::{LevelError, LevelSpec};

pub static LEVEL2_WORDS: [&str; 8] = ["ICE", "JELLY", "KIWI", "LEMON", "MELON", "NUT", "ORANGE", "PEAR"];

// Double note on the 3rd tile.
pub static LEVEL2_PATTERN: [f64; 8] = [1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0];

pub fn level2() -> Result<LevelSpec, LevelError> {
    LevelSpec::new(2, 100.0, 3, 12, LEVEL2_PATTERN.to_vec(), LEVEL2_WORDS)
}
