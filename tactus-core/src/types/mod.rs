pub mod event;
pub mod position;
pub mod tempo;

pub use event::TransportEvent;
pub use position::{SeekTarget, TimePosition};
pub use tempo::{TempoConfig, TempoUpdate, MAX_BPM, MIN_BPM};
