//! Transport — playback control over the lookahead engine
//!
//! Owns the state machine (stopped/playing/paused), the injected clock
//! source and wake-up driver, and the event fan-out. All scheduling state is
//! mutated only from the wake-up handler; control methods synchronously flip
//! the state machine and start/cancel the driver.

use crate::transport::clock::ClockSource;
use crate::transport::driver::{ThreadDriver, WakeupDriver};
use crate::transport::events::{EventBus, IndexCallback, LifecycleCallback, PhraseCallback};
use crossbeam_channel::Receiver;
use log::debug;
use std::sync::{Arc, Mutex};
use tactus_core::{SeekTarget, StepEngine, TempoConfig, TempoUpdate, TimePosition, TransportEvent};

/// Playback state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackState::Stopped)
    }
}

struct Shared {
    engine: StepEngine,
    state: PlaybackState,
}

/// Musical transport: play/stop/pause/seek over a lookahead step scheduler
///
/// Event callbacks run on the wake-up driver's thread; keep them short and
/// don't register further callbacks from inside one.
pub struct Transport {
    clock: Arc<dyn ClockSource>,
    driver: Mutex<Box<dyn WakeupDriver>>,
    shared: Arc<Mutex<Shared>>,
    events: Arc<Mutex<EventBus>>,
}

impl Transport {
    /// Create a transport on the default thread driver
    pub fn new(clock: Arc<dyn ClockSource>, config: TempoConfig) -> Self {
        Self::with_driver(clock, config, Box::new(ThreadDriver::new()))
    }

    /// Create a transport with an injected wake-up driver
    pub fn with_driver(
        clock: Arc<dyn ClockSource>,
        config: TempoConfig,
        driver: Box<dyn WakeupDriver>,
    ) -> Self {
        Self {
            clock,
            driver: Mutex::new(driver),
            shared: Arc::new(Mutex::new(Shared {
                engine: StepEngine::new(config),
                state: PlaybackState::Stopped,
            })),
            events: Arc::new(Mutex::new(EventBus::new())),
        }
    }

    /// Start playback
    ///
    /// No-op while already playing, and a silent no-op while the clock
    /// source is not ready. Resuming from a pause keeps the position but
    /// re-anchors the schedule at "now".
    pub fn play(&self) {
        if !self.clock.is_ready() {
            debug!("play ignored: clock source not ready");
            return;
        }

        {
            let mut shared = self.shared.lock().unwrap();
            if shared.state == PlaybackState::Playing {
                return;
            }
            shared.engine.prime(self.clock.current_time());
            shared.state = PlaybackState::Playing;
        }

        self.events.lock().unwrap().dispatch(TransportEvent::Started);

        let clock = Arc::clone(&self.clock);
        let shared = Arc::clone(&self.shared);
        let events = Arc::clone(&self.events);
        self.driver
            .lock()
            .unwrap()
            .start(Box::new(move || Self::wakeup(&clock, &shared, &events)));
    }

    /// Stop playback and reset the position to zero
    pub fn stop(&self) {
        {
            let mut shared = self.shared.lock().unwrap();
            if shared.state == PlaybackState::Stopped {
                return;
            }
            shared.state = PlaybackState::Stopped;
            shared.engine.reset();
        }
        self.driver.lock().unwrap().cancel();
        self.events.lock().unwrap().dispatch(TransportEvent::Stopped);
    }

    /// Halt playback, preserving the position for display
    ///
    /// There is no gapless resume: `play()` after a pause restarts the
    /// schedule at "now".
    pub fn pause(&self) {
        {
            let mut shared = self.shared.lock().unwrap();
            if shared.state != PlaybackState::Playing {
                return;
            }
            shared.state = PlaybackState::Paused;
        }
        self.driver.lock().unwrap().cancel();
        self.events.lock().unwrap().dispatch(TransportEvent::Paused);
    }

    /// Jump to a partial position; allowed in any state
    pub fn seek(&self, target: SeekTarget) {
        self.shared.lock().unwrap().engine.seek(target);
    }

    /// Set the tempo in BPM (clamped); steps already scheduled keep their
    /// times
    pub fn set_tempo(&self, bpm: f64) {
        self.shared.lock().unwrap().engine.set_tempo(bpm);
    }

    /// Merge a partial tempo/meter update; allowed in any state
    pub fn set_config(&self, update: TempoUpdate) {
        self.shared.lock().unwrap().engine.apply(update);
    }

    /// Snapshot of the current musical position
    pub fn position(&self) -> TimePosition {
        self.shared.lock().unwrap().engine.position()
    }

    /// Copy of the current tempo/meter configuration
    pub fn config(&self) -> TempoConfig {
        *self.shared.lock().unwrap().engine.config()
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.shared.lock().unwrap().state
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn bpm(&self) -> f64 {
        self.config().bpm()
    }

    pub fn step_duration(&self) -> f64 {
        self.config().step_duration()
    }

    pub fn beat_duration(&self) -> f64 {
        self.config().beat_duration()
    }

    pub fn bar_duration(&self) -> f64 {
        self.config().bar_duration()
    }

    pub fn phrase_duration(&self) -> f64 {
        self.config().phrase_duration()
    }

    /// Register a callback fired on every step: `(step, scheduled_time)`
    pub fn on_step<F: FnMut(u32, f64) + Send + 'static>(&self, callback: F) {
        self.events.lock().unwrap().on_step(Box::new(callback) as IndexCallback);
    }

    /// Register a callback fired on every beat boundary
    pub fn on_beat<F: FnMut(u32, f64) + Send + 'static>(&self, callback: F) {
        self.events.lock().unwrap().on_beat(Box::new(callback) as IndexCallback);
    }

    /// Register a callback fired on every bar boundary
    pub fn on_bar<F: FnMut(u32, f64) + Send + 'static>(&self, callback: F) {
        self.events.lock().unwrap().on_bar(Box::new(callback) as IndexCallback);
    }

    /// Register a callback fired on every phrase boundary
    pub fn on_phrase<F: FnMut(u64, f64) + Send + 'static>(&self, callback: F) {
        self.events
            .lock()
            .unwrap()
            .on_phrase(Box::new(callback) as PhraseCallback);
    }

    /// Register a callback fired when playback starts
    pub fn on_play<F: FnMut() + Send + 'static>(&self, callback: F) {
        self.events
            .lock()
            .unwrap()
            .on_play(Box::new(callback) as LifecycleCallback);
    }

    /// Register a callback fired when playback stops
    pub fn on_stop<F: FnMut() + Send + 'static>(&self, callback: F) {
        self.events
            .lock()
            .unwrap()
            .on_stop(Box::new(callback) as LifecycleCallback);
    }

    /// Register a callback fired when playback pauses
    pub fn on_pause<F: FnMut() + Send + 'static>(&self, callback: F) {
        self.events
            .lock()
            .unwrap()
            .on_pause(Box::new(callback) as LifecycleCallback);
    }

    /// Create a channel subscriber receiving every transport event
    pub fn subscribe(&self) -> Receiver<TransportEvent> {
        self.events.lock().unwrap().subscribe()
    }

    /// One scheduler pass: poll the engine, fan out whatever fired
    ///
    /// Runs on the driver thread. Returns `false` once the transport is no
    /// longer playing so the driver winds down; a tick racing a `stop()`
    /// re-checks the state under the lock and fires nothing.
    fn wakeup(
        clock: &Arc<dyn ClockSource>,
        shared: &Arc<Mutex<Shared>>,
        events: &Arc<Mutex<EventBus>>,
    ) -> bool {
        let firings = {
            let mut guard = shared.lock().unwrap();
            if guard.state != PlaybackState::Playing {
                return false;
            }
            guard.engine.poll(clock.current_time())
        };

        if firings.is_empty() {
            return true;
        }

        let mut bus = events.lock().unwrap();
        for firing in &firings {
            for event in TransportEvent::at_position(&firing.position, firing.time) {
                bus.dispatch(event);
            }
        }
        true
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.driver.lock().unwrap().cancel();
    }
}
