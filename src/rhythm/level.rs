//! Level catalog: tiles, per-level tempo / damage / pattern, and the ordered table.
//!
//! All types here are immutable once built. Constructors validate, so everything
//! downstream (clock, sequencer, progression) can index without re-checking.

use super::error::LevelError;

/// One word on the grid and the key that answers it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tile {
    word: String,
    expected_key: char,
}

impl Tile {
    pub fn new(word: impl Into<String>) -> Result<Self, LevelError> {
        let word = word.into();
        let first = word.chars().next().ok_or(LevelError::EmptyWord)?;
        // Multi-char uppercase forms (e.g. 'ß') keep their leading char only.
        let expected_key = first.to_uppercase().next().unwrap_or(first);
        Ok(Self { word, expected_key })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn expected_key(&self) -> char {
        self.expected_key
    }
}

/// Level descriptor (immutable).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LevelSpec {
    id: u32,
    bpm: f64,
    sets_per_level: u32,
    damage_per_miss: u32,
    /// Per-slot multiplier on the base beat (1.0 = quarter, 0.5 = eighth).
    /// Empty means every slot gets a full beat.
    beat_pattern: Vec<f64>,
    word_pool: Vec<Tile>,
}

impl LevelSpec {
    pub fn new<W>(
        id: u32,
        bpm: f64,
        sets_per_level: u32,
        damage_per_miss: u32,
        beat_pattern: Vec<f64>,
        words: impl IntoIterator<Item = W>,
    ) -> Result<Self, LevelError>
    where
        W: Into<String>,
    {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(LevelError::NonPositiveBpm { level_id: id, bpm });
        }
        if sets_per_level == 0 {
            return Err(LevelError::ZeroSets { level_id: id });
        }
        let word_pool = words
            .into_iter()
            .map(Tile::new)
            .collect::<Result<Vec<_>, _>>()?;
        if word_pool.is_empty() {
            return Err(LevelError::EmptyWordPool { level_id: id });
        }
        if !beat_pattern.is_empty() && beat_pattern.len() != word_pool.len() {
            return Err(LevelError::PatternLengthMismatch {
                level_id: id,
                pattern_len: beat_pattern.len(),
                tile_count: word_pool.len(),
            });
        }
        if let Some((slot, &value)) = beat_pattern
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m <= 0.0)
        {
            return Err(LevelError::NonPositiveMultiplier {
                level_id: id,
                slot,
                value,
            });
        }
        Ok(Self {
            id,
            bpm,
            sets_per_level,
            damage_per_miss,
            beat_pattern,
            word_pool,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn sets_per_level(&self) -> u32 {
        self.sets_per_level
    }

    pub fn damage_per_miss(&self) -> u32 {
        self.damage_per_miss
    }

    pub fn beat_pattern(&self) -> &[f64] {
        &self.beat_pattern
    }

    pub fn word_pool(&self) -> &[Tile] {
        &self.word_pool
    }

    pub fn tile_count(&self) -> usize {
        self.word_pool.len()
    }
}

/// Ordered level sequence. Lookup past the end means the run is complete.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    levels: Vec<LevelSpec>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelSpec>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyTable);
        }
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].iter().any(|l| l.id == level.id) {
                return Err(LevelError::DuplicateLevelId { level_id: level.id });
            }
        }
        Ok(Self { levels })
    }

    /// The five shipped levels (90 → 130 bpm).
    pub fn builtin() -> Self {
        super::builtin_levels().clone()
    }

    /// Parse and validate a table from JSON:
    /// `[{"id":1,"bpm":90,"sets_per_level":3,"damage_per_miss":10,"beat_pattern":[1,1],"words":["A","B"]}]`.
    /// `beat_pattern` may be omitted.
    #[cfg(feature = "serde_json")]
    pub fn from_json(src: &str) -> Result<Self, LevelError> {
        #[derive(serde::Deserialize)]
        struct RawLevel {
            id: u32,
            bpm: f64,
            sets_per_level: u32,
            damage_per_miss: u32,
            #[serde(default)]
            beat_pattern: Vec<f64>,
            words: Vec<String>,
        }

        let raw: Vec<RawLevel> = serde_json::from_str(src)?;
        let levels = raw
            .into_iter()
            .map(|r| {
                LevelSpec::new(
                    r.id,
                    r.bpm,
                    r.sets_per_level,
                    r.damage_per_miss,
                    r.beat_pattern,
                    r.words,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    pub fn get(&self, index: usize) -> Option<&LevelSpec> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelSpec> {
        self.levels.iter()
    }
}
