// Rhythm Level 3 definition
// This file contains LEVEL3_WORDS, LEVEL3_PATTERN and the level3() builder.
use super::{LevelError, LevelSpec};

pub static LEVEL3_WORDS: [&str; 8] = ["QUARTZ", "RICE", "SALT", "TOFU", "UDON", "VEAL", "WHEY", "YAM"];

// Double note on the 7th tile.
pub static LEVEL3_PATTERN: [f64; 8] = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.5];

pub fn level3() -> Result<LevelSpec, LevelError> {
    LevelSpec::new(3, 110.0, 3, 14, LEVEL3_PATTERN.to_vec(), LEVEL3_WORDS)
}
