//! Metronome click synthesis
//!
//! Pre-renders two short click sounds (an accented downbeat and a regular
//! beat) so the audio callback only copies samples.

use std::f32::consts::PI;

/// Which click to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// First beat of a bar
    Accent,
    /// Any other beat
    Regular,
}

/// Pre-rendered click buffers
#[derive(Debug, Clone)]
pub struct ClickSound {
    accent: Vec<f32>,
    regular: Vec<f32>,
}

impl ClickSound {
    /// Click length in milliseconds
    const CLICK_DURATION_MS: f32 = 10.0;

    pub fn new(sample_rate: f32) -> Self {
        let num_samples = ((Self::CLICK_DURATION_MS / 1000.0) * sample_rate) as usize;
        Self {
            accent: Self::render(sample_rate, num_samples, 1200.0, 0.6),
            regular: Self::render(sample_rate, num_samples, 800.0, 0.4),
        }
    }

    /// Sine burst with an exponential decay envelope
    fn render(sample_rate: f32, num_samples: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / sample_rate;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / num_samples as f32;
                let envelope = (-t * 8.0).exp();
                (i as f32 * phase_increment).sin() * envelope * amplitude
            })
            .collect()
    }

    /// Samples for the given click kind
    pub fn samples(&self, kind: ClickKind) -> &[f32] {
        match kind {
            ClickKind::Accent => &self.accent,
            ClickKind::Regular => &self.regular,
        }
    }

    /// Click length in samples
    pub fn len(&self) -> usize {
        self.accent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_buffers_have_expected_length() {
        let sound = ClickSound::new(48000.0);
        // 10ms at 48kHz = 480 samples
        assert_eq!(sound.len(), 480);
        assert_eq!(sound.samples(ClickKind::Accent).len(), 480);
        assert_eq!(sound.samples(ClickKind::Regular).len(), 480);
    }

    #[test]
    fn test_accent_is_louder_than_regular() {
        let sound = ClickSound::new(44100.0);
        let peak = |samples: &[f32]| samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        assert!(peak(sound.samples(ClickKind::Accent)) > peak(sound.samples(ClickKind::Regular)));
    }

    #[test]
    fn test_click_decays_to_silence() {
        let sound = ClickSound::new(48000.0);
        let samples = sound.samples(ClickKind::Accent);

        let head_peak = samples[..100].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let tail_peak = samples[samples.len() - 50..]
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max);

        assert!(head_peak > tail_peak * 4.0);
    }
}
