//! Musical position arithmetic
//!
//! A position is fully determined by the global step counter: step, beat,
//! bar, and phrase are always the decomposition of `total_steps` under the
//! current subdivision counts. Nothing here keeps independent counters that
//! could drift out of sync.

use crate::types::tempo::TempoConfig;
use std::fmt;

/// A point in musical time, derived from the global step counter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePosition {
    /// Step within the current beat (0-based)
    pub step: u32,
    /// Beat within the current bar (0-based)
    pub beat: u32,
    /// Bar within the current phrase (0-based)
    pub bar: u32,
    /// Phrase counter, increments without bound
    pub phrase: u64,
    /// Global step counter — the single source of truth
    pub total_steps: u64,
    /// Elapsed musical time in seconds (`total_steps * step_duration`)
    pub total_time: f64,
}

impl TimePosition {
    /// Position zero (start of playback)
    pub fn zero() -> Self {
        Self {
            step: 0,
            beat: 0,
            bar: 0,
            phrase: 0,
            total_steps: 0,
            total_time: 0.0,
        }
    }

    /// Decompose a global step count into step/beat/bar/phrase under the
    /// given meter
    pub fn decompose(total_steps: u64, config: &TempoConfig) -> Self {
        let steps_per_beat = config.steps_per_beat() as u64;
        let steps_per_bar = config.steps_per_bar() as u64;
        let steps_per_phrase = config.steps_per_phrase() as u64;

        let phrase = total_steps / steps_per_phrase;
        let steps_in_phrase = total_steps % steps_per_phrase;
        let bar = steps_in_phrase / steps_per_bar;
        let steps_in_bar = steps_in_phrase % steps_per_bar;
        let beat = steps_in_bar / steps_per_beat;
        let step = steps_in_bar % steps_per_beat;

        Self {
            step: step as u32,
            beat: beat as u32,
            bar: bar as u32,
            phrase,
            total_steps,
            total_time: total_steps as f64 * config.step_duration(),
        }
    }

    /// Recompose step/beat/bar/phrase fields into a global step count
    ///
    /// Inverse of [`TimePosition::decompose`] for in-range fields.
    pub fn compose(step: u32, beat: u32, bar: u32, phrase: u64, config: &TempoConfig) -> u64 {
        let steps_per_beat = config.steps_per_beat() as u64;
        let steps_per_bar = config.steps_per_bar() as u64;
        let steps_per_phrase = config.steps_per_phrase() as u64;

        phrase * steps_per_phrase + bar as u64 * steps_per_bar + beat as u64 * steps_per_beat
            + step as u64
    }

    /// True at the first step of a beat
    pub fn is_beat_boundary(&self) -> bool {
        self.step == 0
    }

    /// True at the first step of a bar
    pub fn is_bar_boundary(&self) -> bool {
        self.step == 0 && self.beat == 0
    }

    /// True at the first step of a phrase
    pub fn is_phrase_boundary(&self) -> bool {
        self.step == 0 && self.beat == 0 && self.bar == 0
    }
}

impl Default for TimePosition {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for TimePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.phrase, self.bar, self.beat, self.step)
    }
}

/// Partial position for seeking
///
/// Fields left `None` keep the current position's value; supplied fields
/// overwrite it. The resulting step counter is recomposed under the active
/// meter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeekTarget {
    pub step: Option<u32>,
    pub beat: Option<u32>,
    pub bar: Option<u32>,
    pub phrase: Option<u64>,
}

impl SeekTarget {
    /// Seek to the start of a bar in the current phrase
    pub fn bar(bar: u32) -> Self {
        Self {
            step: Some(0),
            beat: Some(0),
            bar: Some(bar),
            phrase: None,
        }
    }

    /// Resolve this target against the current position, producing the new
    /// global step count
    pub fn resolve(&self, current: &TimePosition, config: &TempoConfig) -> u64 {
        TimePosition::compose(
            self.step.unwrap_or(current.step),
            self.beat.unwrap_or(current.beat),
            self.bar.unwrap_or(current.bar),
            self.phrase.unwrap_or(current.phrase),
            config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_position() {
        let pos = TimePosition::zero();
        assert_eq!(pos.total_steps, 0);
        assert_eq!(pos.total_time, 0.0);
        assert!(pos.is_phrase_boundary());
    }

    #[test]
    fn test_decompose_known_values() {
        let config = TempoConfig::default(); // 4 steps/beat, 4 beats/bar, 4 bars/phrase

        let pos = TimePosition::decompose(0, &config);
        assert_eq!((pos.step, pos.beat, pos.bar, pos.phrase), (0, 0, 0, 0));

        let pos = TimePosition::decompose(5, &config);
        assert_eq!((pos.step, pos.beat, pos.bar, pos.phrase), (1, 1, 0, 0));

        // One full bar = 16 steps
        let pos = TimePosition::decompose(16, &config);
        assert_eq!((pos.step, pos.beat, pos.bar, pos.phrase), (0, 0, 1, 0));

        // One full phrase = 64 steps
        let pos = TimePosition::decompose(64, &config);
        assert_eq!((pos.step, pos.beat, pos.bar, pos.phrase), (0, 0, 0, 1));

        let pos = TimePosition::decompose(64 + 36, &config);
        assert_eq!((pos.step, pos.beat, pos.bar, pos.phrase), (0, 1, 2, 1));
    }

    #[test]
    fn test_decompose_compose_round_trip() {
        let config = TempoConfig::new(120.0, 3, 4, 2, 5);

        for total_steps in 0..500u64 {
            let pos = TimePosition::decompose(total_steps, &config);
            let recomposed =
                TimePosition::compose(pos.step, pos.beat, pos.bar, pos.phrase, &config);
            assert_eq!(recomposed, total_steps);
        }
    }

    #[test]
    fn test_total_time() {
        let config = TempoConfig::default(); // step = 0.125s at 120 BPM
        let pos = TimePosition::decompose(8, &config);
        assert_eq!(pos.total_time, 1.0);
    }

    #[test]
    fn test_boundaries() {
        let config = TempoConfig::default();

        let pos = TimePosition::decompose(16, &config);
        assert!(pos.is_beat_boundary());
        assert!(pos.is_bar_boundary());
        assert!(!pos.is_phrase_boundary());

        let pos = TimePosition::decompose(4, &config);
        assert!(pos.is_beat_boundary());
        assert!(!pos.is_bar_boundary());

        let pos = TimePosition::decompose(3, &config);
        assert!(!pos.is_beat_boundary());
    }

    #[test]
    fn test_seek_resolve_with_defaults() {
        let config = TempoConfig::default();
        let current = TimePosition::zero();

        // bar 2, beat 1 at 4x4 => 2*16 + 1*4 + 0 = 36
        let target = SeekTarget {
            bar: Some(2),
            beat: Some(1),
            ..Default::default()
        };
        assert_eq!(target.resolve(&current, &config), 36);

        let pos = TimePosition::decompose(36, &config);
        assert_eq!((pos.bar, pos.beat, pos.step), (2, 1, 0));
    }

    #[test]
    fn test_seek_keeps_unspecified_fields() {
        let config = TempoConfig::default();
        let current = TimePosition::decompose(21, &config); // 0:1:1:1

        let target = SeekTarget {
            bar: Some(3),
            ..Default::default()
        };
        // Keeps beat 1, step 1, phrase 0: 3*16 + 1*4 + 1 = 53
        assert_eq!(target.resolve(&current, &config), 53);
    }

    #[test]
    fn test_seek_bar_helper() {
        let config = TempoConfig::default();
        let current = TimePosition::decompose(21, &config);

        // bar() zeroes step and beat
        assert_eq!(SeekTarget::bar(2).resolve(&current, &config), 32);
    }

    #[test]
    fn test_display() {
        let config = TempoConfig::default();
        let pos = TimePosition::decompose(64 + 36, &config);
        assert_eq!(pos.to_string(), "1:2:1:0");
    }
}
