//! Run / level / set state machine.
//!
//! `RhythmEngine` is the single owner of run state. It is advanced by a
//! per-frame [`update`](RhythmEngine::update) and by key presses; every
//! transition is synchronous and reported through [`EngineEvent`]s.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use super::judge::judge;
use super::{
    BeatClock, EngineEvent, GamePhase, IgnoreReason, LevelSpec, LevelTable, NextTile, Outcome,
    RunState, Tile, TileSequencer,
};

/// A raw, timestamped key press (milliseconds on the same timebase as ticks).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPress {
    pub key: char,
    pub at_ms: f64,
}

impl KeyPress {
    pub fn new(key: char, at_ms: f64) -> Self {
        Self { key, at_ms }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyResult {
    Judged(Outcome),
    Ignored(IgnoreReason),
}

pub struct RhythmEngine {
    table: LevelTable,
    clock: BeatClock,
    sequencer: TileSequencer,
    state: RunState,
    phase: GamePhase,
    rng: ChaCha8Rng,
    pending_keys: VecDeque<KeyPress>,
    events: Vec<EngineEvent>,
}

impl RhythmEngine {
    /// Engine with entropy-seeded shuffles, starting a run at `now`.
    pub fn new(table: LevelTable, now: f64) -> Self {
        Self::with_rng(table, ChaCha8Rng::from_entropy(), now)
    }

    /// Deterministic shuffles (replays, tests).
    pub fn with_seed(table: LevelTable, seed: u64, now: f64) -> Self {
        Self::with_rng(table, ChaCha8Rng::seed_from_u64(seed), now)
    }

    fn with_rng(table: LevelTable, rng: ChaCha8Rng, now: f64) -> Self {
        let clock = table
            .get(0)
            .map(BeatClock::for_level)
            .unwrap_or_else(|| BeatClock::new(60.0, &[]));
        let mut engine = Self {
            table,
            clock,
            sequencer: TileSequencer::default(),
            state: RunState::default(),
            phase: GamePhase::Playing,
            rng,
            pending_keys: VecDeque::new(),
            events: Vec::new(),
        };
        engine.start_new_run(now);
        engine
    }

    /// Discard everything in flight and start again at the first level with no score.
    pub fn start_new_run(&mut self, now: f64) {
        self.resume_at(0, 0, now);
    }

    /// Enter `level_index` with `score` carried in (scene restart between levels).
    /// An index past the table ends the run immediately.
    pub fn resume_at(&mut self, level_index: usize, score: u64, now: f64) {
        self.pending_keys.clear();
        self.events.clear();
        // Health carries into enter_level so its reset is announced.
        self.state = RunState {
            score,
            health: self.state.health,
            ..RunState::default()
        };
        info!(level_index, score, "run_started");
        self.enter_level(level_index, now);
    }

    // --- Queries -----------------------------------------------------------

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    /// `None` once the run is complete.
    pub fn current_level(&self) -> Option<&LevelSpec> {
        self.table.get(self.state.level_index)
    }

    pub fn health(&self) -> u32 {
        self.state.health.value()
    }

    pub fn health_fraction(&self) -> f64 {
        self.state.health.fraction()
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    /// Shuffled words of the current set in grid order.
    pub fn active_set(&self) -> &[Tile] {
        self.sequencer.active_set()
    }

    pub fn active_tile(&self) -> Option<&Tile> {
        self.sequencer.active(&self.state)
    }

    /// HUD text, e.g. `SET 2/3`.
    pub fn set_label(&self) -> String {
        let sets = self.current_level().map_or(0, LevelSpec::sets_per_level);
        format!("SET {}/{}", self.state.set_number, sets)
    }

    pub fn current_beat_duration_ms(&self) -> f64 {
        self.clock.current_beat_duration_ms(self.state.active_tile)
    }

    /// Clamped progress through the active tile's beat, for the metronome.
    pub fn beat_progress(&self, now: f64) -> Option<f64> {
        self.state.active_tile?;
        let phase = self
            .clock
            .timing_phase(self.state.beat_anchor_ms, now, self.state.active_tile);
        Some(phase.clamp(0.0, 1.0))
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[EngineEvent] {
        &self.events
    }

    // --- Driving -----------------------------------------------------------

    /// Buffer a key press for the next [`update`](Self::update).
    pub fn queue_key(&mut self, press: KeyPress) {
        self.pending_keys.push_back(press);
    }

    /// One frame: close the beat if its boundary passed, then judge buffered
    /// keys in arrival order.
    pub fn update(&mut self, now: f64) {
        self.tick(now);
        while let Some(press) = self.pending_keys.pop_front() {
            self.press_key(press.key, press.at_ms);
        }
    }

    /// Resolve at most one beat boundary at `now`.
    pub fn tick(&mut self, now: f64) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if self
            .clock
            .tick(self.state.beat_anchor_ms, now, self.state.active_tile)
        {
            self.on_boundary(now);
        }
    }

    /// Judge one press. Any boundary pending at `at_ms` is resolved first, so a
    /// late press can't rescue a beat that already elapsed.
    pub fn press_key(&mut self, key: char, at_ms: f64) -> KeyResult {
        self.tick(at_ms);
        let result = self.judge_press(key, at_ms);
        if let KeyResult::Ignored(reason) = result {
            trace!(?key, at_ms, ?reason, "key_ignored");
        }
        result
    }

    fn judge_press(&mut self, key: char, at_ms: f64) -> KeyResult {
        if self.phase != GamePhase::Playing {
            return KeyResult::Ignored(IgnoreReason::NotPlaying);
        }
        let (Some(index), Some(expected)) = (
            self.state.active_tile,
            self.sequencer.active(&self.state).map(Tile::expected_key),
        ) else {
            return KeyResult::Ignored(IgnoreReason::NoActiveTile);
        };
        if self.state.judged {
            return KeyResult::Ignored(IgnoreReason::AlreadyJudged);
        }
        if at_ms < self.state.beat_anchor_ms {
            return KeyResult::Ignored(IgnoreReason::Stale);
        }
        let phase = self
            .clock
            .timing_phase(self.state.beat_anchor_ms, at_ms, self.state.active_tile);
        let outcome = judge(expected, key, phase);
        self.state.judged = true;
        debug!(tile = index, ?key, phase, ?outcome, "key_judged");
        self.apply_outcome(outcome, index);
        KeyResult::Judged(outcome)
    }

    // --- Transitions -------------------------------------------------------

    fn on_boundary(&mut self, now: f64) {
        if let Some(missed) = self.sequencer.close_beat(&mut self.state) {
            debug!(tile = missed, "beat_missed");
            self.apply_outcome(Outcome::Miss, missed);
            if self.phase != GamePhase::Playing {
                return;
            }
        }
        match self.sequencer.open_next_beat(&mut self.state, now) {
            NextTile::Activated(index) => {
                self.events.push(EngineEvent::TileActivated { index });
            }
            NextTile::SetComplete => self.complete_set(now),
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome, tile: usize) {
        let score_delta = outcome.score_delta();
        self.state.score += u64::from(score_delta);
        self.events.push(EngineEvent::Judged {
            tile,
            outcome,
            score_delta,
        });
        if !outcome.deals_damage() {
            return;
        }
        let damage = self.current_level().map_or(0, LevelSpec::damage_per_miss);
        let before = self.state.health.value();
        let depleted = self.state.health.apply_damage(damage);
        if self.state.health.value() != before {
            self.events.push(EngineEvent::HealthChanged {
                health: self.state.health.value(),
            });
        }
        if depleted {
            self.phase = GamePhase::GameOver;
            info!(final_score = self.state.score, "game_over");
            self.events.push(EngineEvent::GameOver {
                final_score: self.state.score,
            });
        }
    }

    fn complete_set(&mut self, now: f64) {
        let Some(level) = self.table.get(self.state.level_index) else {
            return;
        };
        let set_number = self.state.set_number;
        self.phase = GamePhase::SetComplete;
        info!(level_id = level.id(), set_number, "set_completed");
        self.events.push(EngineEvent::SetCompleted { set_number });

        if set_number < level.sets_per_level() {
            self.state.set_number += 1;
            self.sequencer.start_set(level, &mut self.rng, &mut self.state);
            self.state.beat_anchor_ms = now;
            self.phase = GamePhase::Playing;
            self.events.push(EngineEvent::SetStarted {
                level_id: level.id(),
                set_number: self.state.set_number,
            });
            return;
        }

        self.phase = GamePhase::LevelComplete;
        info!(level_id = level.id(), score = self.state.score, "level_completed");
        self.events.push(EngineEvent::LevelCompleted {
            level_id: level.id(),
        });
        self.enter_level(self.state.level_index + 1, now);
    }

    fn enter_level(&mut self, index: usize, now: f64) {
        self.state.level_index = index;
        self.state.set_number = 1;
        self.state.active_tile = None;
        self.state.judged = true;
        self.state.beat_anchor_ms = now;

        let Some(level) = self.table.get(index) else {
            self.phase = GamePhase::RunComplete;
            info!(final_score = self.state.score, "run_completed");
            self.events.push(EngineEvent::RunCompleted {
                final_score: self.state.score,
            });
            return;
        };

        let before = self.state.health.value();
        self.state.health.reset();
        self.clock = BeatClock::for_level(level);
        self.sequencer.start_set(level, &mut self.rng, &mut self.state);
        self.phase = GamePhase::Playing;
        info!(level_id = level.id(), bpm = level.bpm(), "level_started");
        self.events.push(EngineEvent::LevelStarted {
            level_id: level.id(),
        });
        if self.state.health.value() != before {
            self.events.push(EngineEvent::HealthChanged {
                health: self.state.health.value(),
            });
        }
        self.events.push(EngineEvent::SetStarted {
            level_id: level.id(),
            set_number: 1,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLACK: f64 = 0.001;

    fn one_level_table(sets: u32, damage: u32) -> LevelTable {
        let level = LevelSpec::new(
            1,
            120.0,
            sets,
            damage,
            vec![1.0, 0.5, 0.5, 1.0],
            ["ant", "bee", "cat", "dog"],
        )
        .unwrap();
        LevelTable::new(vec![level]).unwrap()
    }

    /// Fire the next boundary just after it is due and return its timestamp.
    fn next_beat(engine: &mut RhythmEngine) -> f64 {
        let t = engine.state().beat_anchor_ms() + engine.current_beat_duration_ms() + SLACK;
        engine.tick(t);
        t
    }

    fn expected_key(engine: &RhythmEngine) -> char {
        engine.active_tile().unwrap().expected_key()
    }

    #[test]
    fn test_first_beat_activates_tile_zero() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        engine.drain_events();
        engine.tick(499.0);
        assert_eq!(engine.state().active_tile(), None);
        engine.tick(500.0);
        assert_eq!(engine.state().active_tile(), Some(0));
        assert_eq!(
            engine.drain_events(),
            vec![EngineEvent::TileActivated { index: 0 }]
        );
    }

    #[test]
    fn test_lag_spike_closes_one_beat_only() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        engine.tick(10_000.0);
        assert_eq!(engine.state().active_tile(), Some(0));
        assert_eq!(engine.state().beat_anchor_ms(), 10_000.0);
        assert_eq!(engine.health(), 100);
    }

    #[test]
    fn test_syncopated_slot_durations() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        next_beat(&mut engine);
        assert_eq!(engine.current_beat_duration_ms(), 500.0);
        next_beat(&mut engine);
        assert_eq!(engine.state().active_tile(), Some(1));
        assert_eq!(engine.current_beat_duration_ms(), 250.0);
    }

    #[test]
    fn test_press_before_first_beat_is_ignored() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        assert_eq!(
            engine.press_key('a', 100.0),
            KeyResult::Ignored(IgnoreReason::NoActiveTile)
        );
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_second_press_in_same_beat_is_ignored() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        let t = next_beat(&mut engine);
        let key = expected_key(&engine);
        assert_eq!(engine.press_key(key, t + 10.0), KeyResult::Judged(Outcome::Perfect));
        assert_eq!(
            engine.press_key('z', t + 20.0),
            KeyResult::Ignored(IgnoreReason::AlreadyJudged)
        );
        assert_eq!(engine.score(), 100);
        assert_eq!(engine.health(), 100);
    }

    #[test]
    fn test_wrong_key_damages_and_blocks_miss() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 15), 1, 0.0);
        let t = next_beat(&mut engine);
        let wrong = if expected_key(&engine) == 'Z' { 'y' } else { 'z' };
        assert_eq!(engine.press_key(wrong, t + 250.0), KeyResult::Judged(Outcome::WrongKey));
        assert_eq!(engine.health(), 85);
        // Closing the judged beat must not add a MISS on top.
        next_beat(&mut engine);
        assert_eq!(engine.health(), 85);
    }

    #[test]
    fn test_late_press_resolves_boundary_first() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        next_beat(&mut engine);
        let anchor = engine.state().beat_anchor_ms();
        engine.drain_events();
        // Pressed after tile 0's beat elapsed: tile 0 is a MISS, the press
        // lands on tile 1 at phase 0.
        let key = engine.active_set()[1].expected_key();
        let result = engine.press_key(key, anchor + 500.0 + SLACK);
        assert_eq!(result, KeyResult::Judged(Outcome::Perfect));
        let events = engine.drain_events();
        assert_eq!(
            events[0],
            EngineEvent::Judged {
                tile: 0,
                outcome: Outcome::Miss,
                score_delta: 0
            }
        );
        assert!(events.contains(&EngineEvent::TileActivated { index: 1 }));
        assert_eq!(engine.health(), 90);
    }

    #[test]
    fn test_stale_queued_key_is_dropped() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        let t = next_beat(&mut engine);
        let key = expected_key(&engine);
        // The press happened during tile 0 but the frame arrives after the boundary.
        engine.queue_key(KeyPress::new(key, t + 100.0));
        engine.update(t + 500.0 + SLACK);
        assert_eq!(engine.state().active_tile(), Some(1));
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.health(), 90);
    }

    #[test]
    fn test_queued_keys_are_judged_after_tick() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        let t = next_beat(&mut engine);
        let key = expected_key(&engine);
        engine.queue_key(KeyPress::new(key, t + 250.0));
        engine.queue_key(KeyPress::new(key, t + 260.0));
        engine.update(t + 270.0);
        assert_eq!(engine.score(), 50);
        assert!(engine.state().has_judged_current_beat());
    }

    #[test]
    fn test_set_rollover_reshuffles_and_keeps_health() {
        let mut engine = RhythmEngine::with_seed(one_level_table(2, 10), 9, 0.0);
        for _ in 0..5 {
            next_beat(&mut engine);
        }
        // Four silent tiles.
        assert_eq!(engine.health(), 60);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.state().set_number(), 2);
        assert_eq!(engine.state().active_tile(), None);
        assert_eq!(engine.set_label(), "SET 2/2");
        let events = engine.drain_events();
        let completed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::SetCompleted { .. }))
            .collect();
        assert_eq!(completed, vec![&EngineEvent::SetCompleted { set_number: 1 }]);
        assert!(events.contains(&EngineEvent::SetStarted {
            level_id: 1,
            set_number: 2
        }));
    }

    #[test]
    fn test_game_over_freezes_engine() {
        let mut engine = RhythmEngine::with_seed(one_level_table(3, 50), 2, 0.0);
        next_beat(&mut engine);
        next_beat(&mut engine);
        let t = next_beat(&mut engine);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.health(), 0);
        let anchor = engine.state().beat_anchor_ms();
        engine.tick(t + 10_000.0);
        assert_eq!(engine.state().beat_anchor_ms(), anchor);
        assert_eq!(
            engine.press_key('a', t + 10_001.0),
            KeyResult::Ignored(IgnoreReason::NotPlaying)
        );
        assert_eq!(engine.health(), 0);

        engine.start_new_run(t + 20_000.0);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.health(), 100);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.state().level_index(), 0);
    }

    #[test]
    fn test_restart_after_game_over_announces_full_health() {
        let mut engine = RhythmEngine::with_seed(one_level_table(3, 50), 2, 0.0);
        next_beat(&mut engine);
        next_beat(&mut engine);
        let t = next_beat(&mut engine);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        engine.drain_events();

        engine.start_new_run(t + 1_000.0);
        assert_eq!(
            engine.drain_events(),
            vec![
                EngineEvent::LevelStarted { level_id: 1 },
                EngineEvent::HealthChanged { health: 100 },
                EngineEvent::SetStarted {
                    level_id: 1,
                    set_number: 1
                },
            ]
        );
    }

    #[test]
    fn test_restart_discards_undrained_events() {
        let mut engine = RhythmEngine::with_seed(one_level_table(3, 50), 2, 0.0);
        next_beat(&mut engine);
        next_beat(&mut engine);
        let t = next_beat(&mut engine);
        assert!(engine
            .pending_events()
            .contains(&EngineEvent::GameOver { final_score: 0 }));

        engine.start_new_run(t + 1_000.0);
        let events = engine.drain_events();
        assert_eq!(events.first(), Some(&EngineEvent::LevelStarted { level_id: 1 }));
        assert!(!events.iter().any(|e| matches!(
            e,
            EngineEvent::GameOver { .. } | EngineEvent::Judged { .. }
        )));
    }

    #[test]
    fn test_fresh_engine_does_not_announce_health() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, EngineEvent::HealthChanged { .. })));
    }

    #[test]
    fn test_resume_past_table_completes_run() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        engine.resume_at(3, 1234, 0.0);
        assert_eq!(engine.phase(), GamePhase::RunComplete);
        assert!(engine.current_level().is_none());
        assert_eq!(
            engine.drain_events().last(),
            Some(&EngineEvent::RunCompleted { final_score: 1234 })
        );
    }

    #[test]
    fn test_beat_progress() {
        let mut engine = RhythmEngine::with_seed(one_level_table(1, 10), 1, 0.0);
        assert_eq!(engine.beat_progress(100.0), None);
        let t = next_beat(&mut engine);
        let p = engine.beat_progress(t + 250.0).unwrap();
        assert!((p - 0.5).abs() < 1e-6);
        assert_eq!(engine.beat_progress(t - 5.0), Some(0.0));
    }
}
