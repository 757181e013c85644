//! Clock sources for the transport
//!
//! The scheduler never reads a clock directly; it is handed a [`ClockSource`]
//! at construction. The production source is the audio-driven clock in
//! [`crate::audio`], whose time advances only while the audio engine renders.
//! [`SystemClock`] covers hosts without an audio device and [`ManualClock`]
//! makes scheduling fully deterministic under test.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// A monotonically non-decreasing time reference in seconds
pub trait ClockSource: Send + Sync {
    /// Current time in seconds since the clock's origin
    fn current_time(&self) -> f64;

    /// Whether scheduling may begin against this clock
    fn is_ready(&self) -> bool {
        true
    }
}

/// Manually advanced clock for deterministic tests and offline rendering
///
/// Time only moves when the owner calls [`ManualClock::advance`] or
/// [`ManualClock::set_time`].
pub struct ManualClock {
    // f64 seconds stored as bits for atomic access
    time_bits: AtomicU64,
    ready: AtomicBool,
}

impl ManualClock {
    /// Create a clock at time zero, ready for scheduling
    pub fn new() -> Self {
        Self {
            time_bits: AtomicU64::new(0f64.to_bits()),
            ready: AtomicBool::new(true),
        }
    }

    /// Move the clock forward by `secs`
    pub fn advance(&self, secs: f64) {
        let _ = self
            .time_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + secs).to_bits())
            });
    }

    /// Set the clock to an absolute time
    pub fn set_time(&self, secs: f64) {
        self.time_bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    /// Mark the clock ready or not ready
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for ManualClock {
    fn current_time(&self) -> f64 {
        f64::from_bits(self.time_bits.load(Ordering::Relaxed))
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

/// Wall-clock source backed by [`Instant`]
///
/// Fallback for hosts without an audio device. Unlike the audio clock it
/// keeps running while audio is suspended, so it should only drive
/// transports that have no audio downstream.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn current_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.current_time(), 0.0);
        assert!(clock.is_ready());
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.current_time(), 0.75);

        clock.set_time(10.0);
        assert_eq!(clock.current_time(), 10.0);
    }

    #[test]
    fn test_manual_clock_readiness() {
        let clock = ManualClock::new();
        clock.set_ready(false);
        assert!(!clock.is_ready());
        clock.set_ready(true);
        assert!(clock.is_ready());
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.current_time();
        let b = clock.current_time();
        assert!(b >= a);
        assert!(clock.is_ready());
    }
}
