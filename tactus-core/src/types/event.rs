//! Transport event types
//!
//! Pure data values describing what the transport fired and when. The
//! boundary events nest strictly: a beat event only ever accompanies a
//! step-0 firing, a bar event a beat-0 firing, a phrase event a bar-0
//! firing.

use crate::types::position::TimePosition;

/// An event fired by the transport
///
/// Timed variants carry the scheduled time of the underlying step in
/// clock-source seconds — the time downstream consumers should schedule
/// audio at, not the time the callback happens to run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportEvent {
    /// A step fired; `step` is the index within the current beat
    Step { step: u32, time: f64 },
    /// First step of a beat; `beat` is the index within the current bar
    Beat { beat: u32, time: f64 },
    /// First beat of a bar; `bar` is the index within the current phrase
    Bar { bar: u32, time: f64 },
    /// First bar of a phrase
    Phrase { phrase: u64, time: f64 },
    /// Playback started
    Started,
    /// Playback stopped, position reset
    Stopped,
    /// Playback paused, position preserved
    Paused,
}

impl TransportEvent {
    /// Expand a fired step into its boundary events, in firing order
    ///
    /// Always yields `Step`; adds `Beat`/`Bar`/`Phrase` under the strict
    /// nesting rule.
    pub fn at_position(position: &TimePosition, time: f64) -> Vec<TransportEvent> {
        let mut events = vec![TransportEvent::Step {
            step: position.step,
            time,
        }];
        if position.is_beat_boundary() {
            events.push(TransportEvent::Beat {
                beat: position.beat,
                time,
            });
        }
        if position.is_bar_boundary() {
            events.push(TransportEvent::Bar {
                bar: position.bar,
                time,
            });
        }
        if position.is_phrase_boundary() {
            events.push(TransportEvent::Phrase {
                phrase: position.phrase,
                time,
            });
        }
        events
    }
}
