//! Beat clock: turns wall-clock milliseconds into beat-boundary crossings.
//!
//! The clock holds only per-level parameters. The anchor (timestamp of the last
//! boundary) lives in [`RunState`](super::RunState) and is re-anchored by the
//! sequencer when a tick fires, so a lag spike closes at most one beat.

use super::LevelSpec;

/// BeatClock tracks per-slot beat durations for one level.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatClock {
    base_beat_ms: f64,
    pattern: Vec<f64>,
}

impl BeatClock {
    pub fn new(bpm: f64, pattern: &[f64]) -> Self {
        Self {
            base_beat_ms: 60_000.0 / bpm,
            pattern: pattern.to_vec(),
        }
    }

    pub fn for_level(level: &LevelSpec) -> Self {
        Self::new(level.bpm(), level.beat_pattern())
    }

    pub fn base_beat_ms(&self) -> f64 {
        self.base_beat_ms
    }

    /// Duration of the beat owned by `active_tile`; no tile (or a slot the
    /// pattern does not cover) gets a plain beat.
    pub fn current_beat_duration_ms(&self, active_tile: Option<usize>) -> f64 {
        match active_tile.and_then(|i| self.pattern.get(i)) {
            Some(mult) => self.base_beat_ms * mult,
            None => self.base_beat_ms,
        }
    }

    /// Whether the boundary of the current beat has been reached at `now`.
    pub fn tick(&self, anchor_ms: f64, now: f64, active_tile: Option<usize>) -> bool {
        now - anchor_ms >= self.current_beat_duration_ms(active_tile)
    }

    /// Fractional position of `now` inside the current beat (`[0, 1)` while the
    /// beat is open).
    pub fn timing_phase(&self, anchor_ms: f64, now: f64, active_tile: Option<usize>) -> f64 {
        (now - anchor_ms) / self.current_beat_duration_ms(active_tile)
    }
}
