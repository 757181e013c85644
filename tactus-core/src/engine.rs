//! Lookahead step engine
//!
//! The scheduling core of the transport. The engine is driven by an external
//! wake-up (a frame callback, a timer thread, a test loop) and an external
//! clock reading; on each poll it fires every step whose scheduled time
//! falls inside a short lookahead window ahead of "now". Firing ahead of the
//! audible moment lets downstream consumers hand the audio engine exact
//! start times, so host scheduling jitter never reaches the output.
//!
//! The engine holds no threads and reads no clocks of its own, which keeps
//! it deterministic under test and compilable to WASM.

use crate::types::position::{SeekTarget, TimePosition};
use crate::types::tempo::{TempoConfig, TempoUpdate};

/// How far ahead of the clock steps are scheduled, in seconds
///
/// Large enough to absorb a busy host frame, small enough that tempo and
/// seek changes feel immediate.
pub const LOOKAHEAD_SECS: f64 = 0.1;

/// A single fired step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepFiring {
    /// Position at the moment this step sounds
    pub position: TimePosition,
    /// Scheduled time of the step in clock-source seconds
    ///
    /// May already be slightly in the past when the caller sees it; it is
    /// still the correct time to schedule audio at.
    pub time: f64,
}

/// Lookahead scheduling state machine
#[derive(Debug, Clone)]
pub struct StepEngine {
    config: TempoConfig,
    total_steps: u64,
    next_step_time: f64,
    lookahead: f64,
}

impl StepEngine {
    /// Create an engine with the default lookahead window
    pub fn new(config: TempoConfig) -> Self {
        Self::with_lookahead(config, LOOKAHEAD_SECS)
    }

    /// Create an engine with an explicit lookahead window
    pub fn with_lookahead(config: TempoConfig, lookahead: f64) -> Self {
        Self {
            config,
            total_steps: 0,
            next_step_time: 0.0,
            lookahead,
        }
    }

    /// Current tempo/meter configuration
    pub fn config(&self) -> &TempoConfig {
        &self.config
    }

    /// Set the tempo in BPM (clamped)
    ///
    /// Takes effect from the next unscheduled step: the gap to the already
    /// computed `next_step_time` is never rewritten.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.config.set_bpm(bpm);
    }

    /// Merge a partial tempo/meter update (clamped per field)
    pub fn apply(&mut self, update: TempoUpdate) {
        self.config.apply(update);
    }

    /// Current position, derived from the global step counter
    pub fn position(&self) -> TimePosition {
        TimePosition::decompose(self.total_steps, &self.config)
    }

    /// Global step counter
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Scheduled time of the next unfired step
    pub fn next_step_time(&self) -> f64 {
        self.next_step_time
    }

    /// Jump to a partial position; unsupplied fields keep their current
    /// value
    pub fn seek(&mut self, target: SeekTarget) {
        let current = self.position();
        self.total_steps = target.resolve(&current, &self.config);
    }

    /// Reset the position to zero
    pub fn reset(&mut self) {
        self.total_steps = 0;
    }

    /// Anchor the schedule so the next step fires at `now`
    ///
    /// Called when playback (re)starts. Resuming after a pause re-anchors
    /// here too, which restarts the grid at "now" rather than continuing
    /// the old one.
    pub fn prime(&mut self, now: f64) {
        self.next_step_time = now;
    }

    /// Fire every step scheduled inside the lookahead window
    ///
    /// A late poll catches up: each elapsed step fires with its own
    /// historical time, spaced by the step duration in effect when its gap
    /// was computed. Never skips or collapses steps.
    pub fn poll(&mut self, now: f64) -> Vec<StepFiring> {
        let mut fired = Vec::new();

        while self.next_step_time < now + self.lookahead {
            fired.push(StepFiring {
                position: TimePosition::decompose(self.total_steps, &self.config),
                time: self.next_step_time,
            });

            self.total_steps += 1;

            // The step immediately after each swing-subdivision boundary is
            // delayed by swing * step_duration; the modulo rule is part of
            // the audible rhythm and must not change.
            let step_duration = self.config.step_duration();
            let swing_offset = if self.config.swing() > 0.0
                && self.total_steps % self.config.swing_subdivision() as u64 == 1
            {
                step_duration * self.config.swing()
            } else {
                0.0
            };

            self.next_step_time += step_duration + swing_offset;
        }

        fired
    }
}
