//! WASM bindings for tactus-core
//!
//! Exposes the decomposition and duration math to JavaScript so a web host
//! can mirror the native transport's position display without re-deriving
//! the arithmetic.

#[cfg(feature = "wasm")]
use crate::types::{TempoConfig, TimePosition};
#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Decompose a global step counter under the given meter
///
/// Returns a `TimePosition` object (`step`, `beat`, `bar`, `phrase`,
/// `total_steps`, `total_time`).
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn position_at(
    total_steps: u32,
    bpm: f64,
    steps_per_beat: u32,
    beats_per_bar: u32,
    bars_per_phrase: u32,
) -> JsValue {
    let config = TempoConfig::new(bpm, beats_per_bar, 4, bars_per_phrase, steps_per_beat);
    let position = TimePosition::decompose(total_steps as u64, &config);
    serde_wasm_bindgen::to_value(&position).unwrap_or(JsValue::NULL)
}

/// Duration of one step in seconds at the given tempo (clamped)
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn step_duration(bpm: f64, steps_per_beat: u32) -> f64 {
    TempoConfig::new(bpm, 4, 4, 4, steps_per_beat).step_duration()
}

/// Duration of one beat in seconds at the given tempo (clamped)
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn beat_duration(bpm: f64) -> f64 {
    TempoConfig::new(bpm, 4, 4, 4, 4).beat_duration()
}
