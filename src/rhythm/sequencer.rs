//! Tile sequencer: owns the shuffled set for the current repetition and walks the
//! active-tile cursor one beat at a time.

use rand::Rng;
use rand::seq::SliceRandom;

use super::{LevelSpec, RunState, Tile};

/// What the cursor landed on after a boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextTile {
    Activated(usize),
    /// Every tile of the set has had its beat.
    SetComplete,
}

#[derive(Clone, Debug, Default)]
pub struct TileSequencer {
    active_set: Vec<Tile>,
}

impl TileSequencer {
    /// Fresh uniform shuffle of the level's pool; cursor back before the first beat.
    pub fn start_set<R: Rng + ?Sized>(&mut self, level: &LevelSpec, rng: &mut R, state: &mut RunState) {
        self.active_set.clear();
        self.active_set.extend_from_slice(level.word_pool());
        self.active_set.shuffle(rng);
        state.active_tile = None;
        state.judged = true;
    }

    pub fn active_set(&self) -> &[Tile] {
        &self.active_set
    }

    pub fn tile_count(&self) -> usize {
        self.active_set.len()
    }

    /// The expected answer while a beat is open.
    pub fn active(&self, state: &RunState) -> Option<&Tile> {
        state.active_tile.and_then(|i| self.active_set.get(i))
    }

    /// Close the current beat. Returns the tile index if it closed unjudged
    /// (an implicit miss); the beat counts as judged afterwards.
    pub fn close_beat(&self, state: &mut RunState) -> Option<usize> {
        let missed = state.active_tile.filter(|_| !state.judged);
        state.judged = true;
        missed
    }

    /// Re-anchor at `now` and move the cursor forward.
    pub fn open_next_beat(&self, state: &mut RunState, now: f64) -> NextTile {
        state.beat_anchor_ms = now;
        let next = state.active_tile.map_or(0, |i| i + 1);
        if next >= self.active_set.len() {
            state.active_tile = None;
            state.judged = true;
            return NextTile::SetComplete;
        }
        state.active_tile = Some(next);
        state.judged = false;
        NextTile::Activated(next)
    }
}
