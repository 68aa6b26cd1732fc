//! Input judge: classifies a key press against the active tile and beat phase.

/// Presses earlier than this fraction of the beat are PERFECT.
pub const PERFECT_EARLY: f64 = 0.25;
/// Presses later than this fraction of the beat are PERFECT.
pub const PERFECT_LATE: f64 = 0.8;

pub const PERFECT_SCORE: u32 = 100;
pub const GREAT_SCORE: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Outcome {
    Perfect,
    Great,
    WrongKey,
    /// Raised by the clock when a beat closes without any press.
    Miss,
}

impl Outcome {
    pub fn score_delta(self) -> u32 {
        match self {
            Outcome::Perfect => PERFECT_SCORE,
            Outcome::Great => GREAT_SCORE,
            Outcome::WrongKey | Outcome::Miss => 0,
        }
    }

    pub fn deals_damage(self) -> bool {
        matches!(self, Outcome::WrongKey | Outcome::Miss)
    }

    /// Feedback text shown under the grid.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Perfect => "PERFECT",
            Outcome::Great => "GREAT",
            Outcome::WrongKey => "WRONG KEY",
            Outcome::Miss => "MISS",
        }
    }
}

/// Why a key press was dropped without a judgment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IgnoreReason {
    /// Before the first beat of a set.
    NoActiveTile,
    AlreadyJudged,
    /// Game over or run complete.
    NotPlaying,
    /// Timestamp predates the current beat; that beat already closed as a MISS.
    Stale,
}

/// Classify one press. Both ends of the beat are PERFECT; the middle is GREAT.
pub fn judge(expected: char, pressed: char, phase: f64) -> Outcome {
    let mut upper = pressed.to_uppercase();
    let matches = upper.next() == Some(expected) && upper.next().is_none();
    if !matches {
        return Outcome::WrongKey;
    }
    if phase < PERFECT_EARLY || phase > PERFECT_LATE {
        Outcome::Perfect
    } else {
        Outcome::Great
    }
}
