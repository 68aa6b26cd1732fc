//! Browser glue: one thread-local engine driven by `requestAnimationFrame` and
//! `keydown`, plus snapshot queries for the JS renderer. Rendering itself
//! (grid, metronome, feedback text, health bar) lives on the JS side and follows
//! the engine's events.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::performance_now;
use crate::rhythm::{KeyPress, LevelTable, RhythmEngine};

thread_local! {
    static GAME: RefCell<Option<RhythmEngine>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Start a run on the shipped five-level table.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    start_with_table(LevelTable::builtin())
}

/// Start a run on a custom JSON level table (see `LevelTable::from_json`).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_levels(levels_json: &str) -> Result<(), JsValue> {
    let table = LevelTable::from_json(levels_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    start_with_table(table)
}

fn start_with_table(table: LevelTable) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let already_running = GAME.with(|g| g.borrow().is_some());
    let engine = RhythmEngine::new(table, performance_now());
    GAME.with(|g| *g.borrow_mut() = Some(engine));
    info!(already_running, "game_started");
    if already_running {
        // Listener and frame loop from the first start keep driving the new engine.
        return Ok(());
    }

    // Keyboard listener: single-character keys go to the judge; named keys
    // (Shift, Enter, arrows...) and auto-repeats of a held key are not answers.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let Some(key) = answer_key(&evt.key(), evt.repeat()) else {
                return;
            };
            let press = KeyPress::new(key, evt.time_stamp());
            GAME.with(|cell| {
                if let Some(engine) = cell.borrow_mut().as_mut() {
                    engine.queue_key(press);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_game_loop();
    Ok(())
}

fn start_game_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        GAME.with(|cell| {
            if let Some(engine) = cell.borrow_mut().as_mut() {
                advance_frame(engine, ts);
            }
        });
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn with_game<T>(fallback: T, f: impl FnOnce(&mut RhythmEngine) -> T) -> T {
    GAME.with(|cell| cell.borrow_mut().as_mut().map(f).unwrap_or(fallback))
}

/// One animation frame. Without `poll_events` nothing drains the event
/// buffer, so it is emptied here instead of growing every beat.
fn advance_frame(engine: &mut RhythmEngine, ts: f64) {
    engine.update(ts);
    #[cfg(not(feature = "serde_json"))]
    engine.drain_events();
}

fn answer_key(key: &str, repeat: bool) -> Option<char> {
    if repeat {
        return None;
    }
    single_char(key)
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// RESTART button after game over (or any time): level 1, score 0.
#[wasm_bindgen]
pub fn restart_game() {
    let now = performance_now();
    with_game((), |engine| engine.start_new_run(now));
}

#[wasm_bindgen]
pub fn game_phase() -> String {
    with_game(String::new(), |engine| engine.phase().as_str().to_string())
}

#[wasm_bindgen]
pub fn game_health() -> u32 {
    with_game(0, |engine| engine.health())
}

#[wasm_bindgen]
pub fn game_score() -> f64 {
    with_game(0.0, |engine| engine.score() as f64)
}

/// 0 once the run is complete.
#[wasm_bindgen]
pub fn game_level_id() -> u32 {
    with_game(0, |engine| engine.current_level().map_or(0, |l| l.id()))
}

#[wasm_bindgen]
pub fn game_set_label() -> String {
    with_game(String::new(), |engine| engine.set_label())
}

/// -1 between sets / before the first beat.
#[wasm_bindgen]
pub fn active_tile_index() -> i32 {
    with_game(-1, |engine| engine.state().active_tile_index())
}

/// Words of the current set in grid order.
#[wasm_bindgen]
pub fn active_words() -> Vec<String> {
    with_game(Vec::new(), |engine| {
        engine
            .active_set()
            .iter()
            .map(|t| t.word().to_string())
            .collect()
    })
}

/// Metronome position inside the active beat, or -1 when no tile is active.
#[wasm_bindgen]
pub fn beat_progress() -> f64 {
    let now = performance_now();
    with_game(-1.0, |engine| engine.beat_progress(now).unwrap_or(-1.0))
}

/// Drain engine events as a JSON array (`[{"type":"tile_activated","index":0}, ...]`).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn poll_events() -> String {
    with_game(String::from("[]"), |engine| {
        serde_json::to_string(&engine.drain_events()).unwrap_or_else(|_| String::from("[]"))
    })
}
