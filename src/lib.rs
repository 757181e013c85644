//! # Tactus
//!
//! Tactus is a musical transport for Rust: a lookahead scheduler that turns
//! a live audio clock into discrete musical subdivisions (steps, beats,
//! bars, phrases) and fires subscriber events at sample-accurate times.
//! Tempo, meter, and swing are adjustable mid-stream, and the transport
//! tolerates arbitrarily late wake-ups by catching up rather than skipping
//! events.
//!
//! ## Modules
//!
//! - `transport`: The playback controller, clock sources, wake-up drivers,
//!   and event fan-out. The scheduling arithmetic itself lives in the
//!   `tactus-core` crate.
//! - `audio`: The cpal-backed audio clock (with metronome click rendering)
//!   and MIDI clock output.
//! - `commands` / `repl`: The interactive shell for driving a transport
//!   from a terminal.

pub mod audio;
pub mod commands;
pub mod repl;
pub mod transport;

// Re-export commonly used types and functions for convenience
pub use crate::transport::{
    ClockSource, ManualClock, ManualDriver, PlaybackState, SystemClock, ThreadDriver, Transport,
    WakeupDriver,
};
pub use tactus_core::{
    SeekTarget, StepEngine, TempoConfig, TempoUpdate, TimePosition, TransportEvent,
};
