// Rhythm Level 5 definition
// This file contains LEVEL5_WORDS, LEVEL5_PATTERN and the level5() builder.
use super::{LevelError, LevelSpec};

pub static LEVEL5_WORDS: [&str; 8] = ["MINT", "OAT", "PORK", "SAGE", "TART", "VINE", "WINE", "ZEST"];

// All fast eighths.
pub static LEVEL5_PATTERN: [f64; 8] = [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5];

pub fn level5() -> Result<LevelSpec, LevelError> {
    LevelSpec::new(5, 130.0, 3, 18, LEVEL5_PATTERN.to_vec(), LEVEL5_WORDS)
}
