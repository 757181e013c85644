pub mod clock;
pub mod driver;
pub mod events;
pub mod transport;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use driver::{ManualDriver, ThreadDriver, WakeupDriver};
pub use transport::{PlaybackState, Transport};
