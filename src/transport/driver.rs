//! Wake-up drivers for the transport
//!
//! The scheduler tolerates arbitrary delay between wake-ups, so the driver
//! only has to be roughly periodic — frame-rate granularity is enough. The
//! driver is injected into the transport, which keeps the scheduling loop
//! testable with [`ManualDriver`] instead of real timing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default wake-up interval, roughly one display frame
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Called on every wake-up; return `false` to stop the driver
pub type TickHandler = Box<dyn FnMut() -> bool + Send>;

/// A strategy for delivering repeated wake-ups to the scheduler
pub trait WakeupDriver: Send {
    /// Begin delivering wake-ups to `handler`; replaces any previous handler
    fn start(&mut self, handler: TickHandler);

    /// Stop delivering wake-ups
    ///
    /// After this returns, no new tick begins. Starting again is allowed.
    fn cancel(&mut self);
}

/// Production driver: a dedicated thread ticking at a fixed interval
pub struct ThreadDriver {
    interval: Duration,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadDriver {
    /// Create a driver ticking at [`FRAME_INTERVAL`]
    pub fn new() -> Self {
        Self::with_interval(FRAME_INTERVAL)
    }

    /// Create a driver with an explicit tick interval
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl Default for ThreadDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeupDriver for ThreadDriver {
    fn start(&mut self, mut handler: TickHandler) {
        self.cancel();

        let running = Arc::new(AtomicBool::new(true));
        self.running = running.clone();
        let interval = self.interval;

        self.thread = Some(thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                if !handler() {
                    running.store(false, Ordering::Relaxed);
                    break;
                }
                thread::sleep(interval);
            }
        }));
    }

    fn cancel(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            // Joining from the driver thread itself would deadlock; the
            // flag alone already ends the loop there.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for ThreadDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Test driver: ticks only when the owner calls [`ManualDriver::tick`]
///
/// Cloneable so a test can keep one handle while the transport owns the
/// other.
#[derive(Clone, Default)]
pub struct ManualDriver {
    handler: Arc<Mutex<Option<TickHandler>>>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one wake-up; returns `false` if no handler is installed or
    /// the handler asked to stop
    pub fn tick(&self) -> bool {
        // Take the handler out so it runs without the lock held
        let taken = self.handler.lock().unwrap().take();
        match taken {
            Some(mut handler) => {
                let keep = handler();
                if keep {
                    let mut slot = self.handler.lock().unwrap();
                    // Don't clobber a handler installed by a re-start
                    if slot.is_none() {
                        *slot = Some(handler);
                    }
                }
                keep
            }
            None => false,
        }
    }
}

impl WakeupDriver for ManualDriver {
    fn start(&mut self, handler: TickHandler) {
        *self.handler.lock().unwrap() = Some(handler);
    }

    fn cancel(&mut self) {
        *self.handler.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_manual_driver_ticks_installed_handler() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        let mut driver = ManualDriver::new();
        let handle = driver.clone();

        driver.start(Box::new(move || {
            count_clone.fetch_add(1, Ordering::Relaxed);
            true
        }));

        assert!(handle.tick());
        assert!(handle.tick());
        assert_eq!(count.load(Ordering::Relaxed), 2);

        driver.cancel();
        assert!(!handle.tick());
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_manual_driver_stops_when_handler_returns_false() {
        let mut driver = ManualDriver::new();
        let handle = driver.clone();

        driver.start(Box::new(|| false));

        assert!(!handle.tick());
        // Handler is gone after asking to stop
        assert!(!handle.tick());
    }

    #[test]
    fn test_thread_driver_ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        let mut driver = ThreadDriver::with_interval(Duration::from_millis(1));
        driver.start(Box::new(move || {
            count_clone.fetch_add(1, Ordering::Relaxed);
            true
        }));

        thread::sleep(Duration::from_millis(50));
        driver.cancel();

        let after_cancel = count.load(Ordering::Relaxed);
        assert!(after_cancel > 0);

        // No ticks arrive once cancel has returned
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::Relaxed), after_cancel);
    }

    #[test]
    fn test_thread_driver_honors_handler_stop() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        let mut driver = ThreadDriver::with_interval(Duration::from_millis(1));
        driver.start(Box::new(move || {
            count_clone.fetch_add(1, Ordering::Relaxed) < 2
        }));

        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }
}
