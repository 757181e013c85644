//! Event fan-out for the transport
//!
//! Two delivery surfaces, both fed from the scheduler's wake-up thread:
//! registered callbacks (invoked in-thread, each isolated from the others'
//! panics) and channel subscribers in the master-clock broadcast style.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tactus_core::TransportEvent;

/// Callback for step/beat/bar events: `(index, scheduled_time)`
pub type IndexCallback = Box<dyn FnMut(u32, f64) + Send>;

/// Callback for phrase events: `(phrase, scheduled_time)`
pub type PhraseCallback = Box<dyn FnMut(u64, f64) + Send>;

/// Callback for play/stop/pause lifecycle events
pub type LifecycleCallback = Box<dyn FnMut() + Send>;

/// Registered callbacks plus channel subscribers
///
/// Callbacks run on the scheduler's wake-up thread; keep them short. A
/// panicking callback is caught and logged so its siblings still fire and
/// the transport keeps running.
#[derive(Default)]
pub struct EventBus {
    on_step: Vec<IndexCallback>,
    on_beat: Vec<IndexCallback>,
    on_bar: Vec<IndexCallback>,
    on_phrase: Vec<PhraseCallback>,
    on_play: Vec<LifecycleCallback>,
    on_stop: Vec<LifecycleCallback>,
    on_pause: Vec<LifecycleCallback>,
    subscribers: Vec<Sender<TransportEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_step(&mut self, callback: IndexCallback) {
        self.on_step.push(callback);
    }

    pub fn on_beat(&mut self, callback: IndexCallback) {
        self.on_beat.push(callback);
    }

    pub fn on_bar(&mut self, callback: IndexCallback) {
        self.on_bar.push(callback);
    }

    pub fn on_phrase(&mut self, callback: PhraseCallback) {
        self.on_phrase.push(callback);
    }

    pub fn on_play(&mut self, callback: LifecycleCallback) {
        self.on_play.push(callback);
    }

    pub fn on_stop(&mut self, callback: LifecycleCallback) {
        self.on_stop.push(callback);
    }

    pub fn on_pause(&mut self, callback: LifecycleCallback) {
        self.on_pause.push(callback);
    }

    /// Create a channel subscriber that receives every event
    ///
    /// Disconnected receivers are pruned on the next dispatch.
    pub fn subscribe(&mut self) -> Receiver<TransportEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver one event to every matching callback and all subscribers
    pub fn dispatch(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Step { step, time } => fire_indexed(&mut self.on_step, step, time),
            TransportEvent::Beat { beat, time } => fire_indexed(&mut self.on_beat, beat, time),
            TransportEvent::Bar { bar, time } => fire_indexed(&mut self.on_bar, bar, time),
            TransportEvent::Phrase { phrase, time } => {
                for callback in self.on_phrase.iter_mut() {
                    if catch_unwind(AssertUnwindSafe(|| callback(phrase, time))).is_err() {
                        warn!("transport phrase callback panicked; continuing");
                    }
                }
            }
            TransportEvent::Started => fire_plain(&mut self.on_play),
            TransportEvent::Stopped => fire_plain(&mut self.on_stop),
            TransportEvent::Paused => fire_plain(&mut self.on_pause),
        }

        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

fn fire_indexed(callbacks: &mut [IndexCallback], index: u32, time: f64) {
    for callback in callbacks.iter_mut() {
        if catch_unwind(AssertUnwindSafe(|| callback(index, time))).is_err() {
            warn!("transport callback panicked; continuing");
        }
    }
}

fn fire_plain(callbacks: &mut [LifecycleCallback]) {
    for callback in callbacks.iter_mut() {
        if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
            warn!("transport lifecycle callback panicked; continuing");
        }
    }
}
