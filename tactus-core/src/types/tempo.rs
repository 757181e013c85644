//! Tempo and meter configuration
//!
//! Holds BPM, subdivision counts, and swing settings, and derives the
//! step/beat/bar/phrase durations in seconds that the step engine schedules
//! against. All setters clamp rather than reject: an out-of-range tempo or a
//! zero subdivision count is silently pulled back into the playable range.

use std::fmt;

/// Slowest playable tempo in BPM
pub const MIN_BPM: f64 = 20.0;

/// Fastest playable tempo in BPM
pub const MAX_BPM: f64 = 300.0;

/// Tempo, meter, and swing configuration for the transport
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoConfig {
    bpm: f64,
    beats_per_bar: u32,
    beat_unit: u32,
    bars_per_phrase: u32,
    steps_per_beat: u32,
    swing: f64,
    swing_subdivision: u32,
}

impl TempoConfig {
    /// Create a config with explicit values (clamped into valid ranges)
    pub fn new(
        bpm: f64,
        beats_per_bar: u32,
        beat_unit: u32,
        bars_per_phrase: u32,
        steps_per_beat: u32,
    ) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            beats_per_bar: beats_per_bar.max(1),
            beat_unit: beat_unit.max(1),
            bars_per_phrase: bars_per_phrase.max(1),
            steps_per_beat: steps_per_beat.max(1),
            swing: 0.0,
            swing_subdivision: 2,
        }
    }

    /// Current tempo in BPM
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set the tempo, clamped to [`MIN_BPM`]..=[`MAX_BPM`]
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Beats per bar (time signature numerator)
    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    /// Note value of one beat (time signature denominator)
    pub fn beat_unit(&self) -> u32 {
        self.beat_unit
    }

    /// Bars per phrase
    pub fn bars_per_phrase(&self) -> u32 {
        self.bars_per_phrase
    }

    /// Steps per beat (e.g. 4 = sixteenth notes in 4/4)
    pub fn steps_per_beat(&self) -> u32 {
        self.steps_per_beat
    }

    /// Swing amount, 0.0 (straight) to 1.0 (maximum)
    ///
    /// The fraction of a step's duration added to the gap following each
    /// swung step.
    pub fn swing(&self) -> f64 {
        self.swing
    }

    /// Set the swing amount, clamped to [0, 1]
    pub fn set_swing(&mut self, swing: f64) {
        self.swing = swing.clamp(0.0, 1.0);
    }

    /// Swing applies to every Nth step
    pub fn swing_subdivision(&self) -> u32 {
        self.swing_subdivision
    }

    /// Set the swing subdivision (minimum 1)
    pub fn set_swing_subdivision(&mut self, subdivision: u32) {
        self.swing_subdivision = subdivision.max(1);
    }

    /// Merge a partial update into this config
    ///
    /// Only the supplied fields change; each passes through the same
    /// clamping as the individual setters.
    pub fn apply(&mut self, update: TempoUpdate) {
        if let Some(bpm) = update.bpm {
            self.set_bpm(bpm);
        }
        if let Some(n) = update.beats_per_bar {
            self.beats_per_bar = n.max(1);
        }
        if let Some(n) = update.beat_unit {
            self.beat_unit = n.max(1);
        }
        if let Some(n) = update.bars_per_phrase {
            self.bars_per_phrase = n.max(1);
        }
        if let Some(n) = update.steps_per_beat {
            self.steps_per_beat = n.max(1);
        }
        if let Some(swing) = update.swing {
            self.set_swing(swing);
        }
        if let Some(n) = update.swing_subdivision {
            self.set_swing_subdivision(n);
        }
    }

    /// Duration of one step in seconds
    pub fn step_duration(&self) -> f64 {
        60.0 / self.bpm / self.steps_per_beat as f64
    }

    /// Duration of one beat in seconds
    pub fn beat_duration(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Duration of one bar in seconds
    pub fn bar_duration(&self) -> f64 {
        self.beat_duration() * self.beats_per_bar as f64
    }

    /// Duration of one phrase in seconds
    pub fn phrase_duration(&self) -> f64 {
        self.bar_duration() * self.bars_per_phrase as f64
    }

    /// Number of steps in one bar
    pub fn steps_per_bar(&self) -> u32 {
        self.steps_per_beat * self.beats_per_bar
    }

    /// Number of steps in one phrase
    pub fn steps_per_phrase(&self) -> u32 {
        self.steps_per_bar() * self.bars_per_phrase
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self::new(120.0, 4, 4, 4, 4)
    }
}

impl fmt::Display for TempoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} BPM, {}/{}, {} steps/beat, {} bars/phrase",
            self.bpm, self.beats_per_bar, self.beat_unit, self.steps_per_beat, self.bars_per_phrase
        )
    }
}

/// Partial tempo/meter update — only supplied fields are applied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoUpdate {
    pub bpm: Option<f64>,
    pub beats_per_bar: Option<u32>,
    pub beat_unit: Option<u32>,
    pub bars_per_phrase: Option<u32>,
    pub steps_per_beat: Option<u32>,
    pub swing: Option<f64>,
    pub swing_subdivision: Option<u32>,
}
