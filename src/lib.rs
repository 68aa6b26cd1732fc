//! Fridge Rhythm core crate.
//!
//! A beat-synchronized typing minigame: press the first letter of the highlighted
//! word on the beat, keep your insulin level up, clear three sets per level across
//! five levels of rising tempo. The engine in [`rhythm`] is pure Rust and runs
//! natively (tests) or in the browser through the thin glue in `web.rs`, which
//! exposes `start_game()` and snapshot queries to the JS renderer.

use wasm_bindgen::prelude::*;

pub mod rhythm;
mod web;

pub use rhythm::{
    EngineEvent, GamePhase, KeyPress, KeyResult, LevelError, LevelSpec, LevelTable, Outcome,
    RhythmEngine, RunState, Tile,
};
pub use web::*;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Browser high-resolution clock; same timebase as rAF and `KeyboardEvent.timeStamp`.
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
