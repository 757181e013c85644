pub mod click;
pub mod clock;
pub mod midi;

pub use click::{ClickKind, ClickSound};
pub use clock::AudioClock;
pub use midi::MidiClockOut;
