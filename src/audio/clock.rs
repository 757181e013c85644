//! Audio-driven clock source
//!
//! Builds a cpal output stream and counts the frames it renders; the frame
//! counter divided by the sample rate is the transport's clock. Time
//! advances only while the stream is actually rendering, which is exactly
//! the stall-while-suspended contract the scheduler expects.
//!
//! The same stream doubles as the metronome output: clicks scheduled at
//! absolute clock times are mixed in when the frame counter reaches them.
//! A time slightly in the past is fine — the click simply starts on the
//! next rendered frame.

use crate::audio::click::{ClickKind, ClickSound};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::transport::clock::ClockSource;

/// A click waiting to be rendered
struct PendingClick {
    start_frame: u64,
    kind: ClickKind,
    offset: usize,
}

enum AudioCommand {
    Shutdown,
}

/// Clock source backed by a cpal output stream
///
/// The stream lives on a dedicated thread (cpal streams are not `Send`);
/// this handle is freely shareable.
pub struct AudioClock {
    command_tx: Sender<AudioCommand>,
    frames: Arc<AtomicU64>,
    ready: Arc<AtomicBool>,
    click_enabled: Arc<AtomicBool>,
    pending: Arc<Mutex<Vec<PendingClick>>>,
    sample_rate: f64,
    _thread: JoinHandle<()>,
}

impl AudioClock {
    /// Open the default output device and start the clock stream
    pub fn new() -> Result<Self> {
        let (command_tx, command_rx) = bounded(16);
        let (setup_tx, setup_rx) = bounded(1);

        let frames = Arc::new(AtomicU64::new(0));
        let ready = Arc::new(AtomicBool::new(false));
        let click_enabled = Arc::new(AtomicBool::new(true));
        let pending: Arc<Mutex<Vec<PendingClick>>> = Arc::new(Mutex::new(Vec::new()));

        let frames_clone = frames.clone();
        let ready_clone = ready.clone();
        let click_enabled_clone = click_enabled.clone();
        let pending_clone = pending.clone();

        let thread = thread::spawn(move || {
            let stream =
                match Self::open_stream(frames_clone, click_enabled_clone, pending_clone) {
                    Ok((stream, sample_rate)) => {
                        let _ = setup_tx.send(Ok(sample_rate));
                        stream
                    }
                    Err(e) => {
                        let _ = setup_tx.send(Err(e));
                        return;
                    }
                };

            if let Err(e) = stream.play() {
                eprintln!("failed to start audio clock stream: {}", e);
                return;
            }
            ready_clone.store(true, Ordering::Relaxed);

            // Keep the stream alive until shutdown
            while let Ok(cmd) = command_rx.recv() {
                match cmd {
                    AudioCommand::Shutdown => break,
                }
            }
        });

        let sample_rate = setup_rx
            .recv()
            .map_err(|_| anyhow!("audio clock thread exited during setup"))??;

        Ok(Self {
            command_tx,
            frames,
            ready,
            click_enabled,
            pending,
            sample_rate,
            _thread: thread,
        })
    }

    fn open_stream(
        frames: Arc<AtomicU64>,
        click_enabled: Arc<AtomicBool>,
        pending: Arc<Mutex<Vec<PendingClick>>>,
    ) -> Result<(Stream, f64)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let config = device.default_output_config()?;

        let sample_format = config.sample_format();
        let config: StreamConfig = config.into();
        let sample_rate = config.sample_rate.0 as f64;

        let sound = ClickSound::new(sample_rate as f32);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, frames, click_enabled, pending, sound)?
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, frames, click_enabled, pending, sound)?
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, frames, click_enabled, pending, sound)?
            }
            _ => return Err(anyhow!("Unsupported sample format: {:?}", sample_format)),
        };

        Ok((stream, sample_rate))
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        frames: Arc<AtomicU64>,
        click_enabled: Arc<AtomicBool>,
        pending: Arc<Mutex<Vec<PendingClick>>>,
        sound: ClickSound,
    ) -> Result<Stream>
    where
        T: Sample + SizedSample + Send + 'static + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;

        let err_fn = |err| eprintln!("an error occurred on the clock output stream: {:?}", err);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // try_lock keeps the callback from blocking on the
                    // scheduling thread; a missed buffer just delays click
                    // starts by one period
                    let mut clicks = pending.try_lock().ok();
                    let enabled = click_enabled.load(Ordering::Relaxed);

                    for frame in data.chunks_mut(channels) {
                        let frame_index = frames.fetch_add(1, Ordering::Relaxed);

                        let mut value = 0.0f32;
                        if let Some(clicks) = clicks.as_mut() {
                            clicks.retain_mut(|click| {
                                if frame_index < click.start_frame {
                                    return true;
                                }
                                let samples = sound.samples(click.kind);
                                if enabled {
                                    value += samples[click.offset];
                                }
                                click.offset += 1;
                                click.offset < samples.len()
                            });
                        }

                        let out: T = cpal::Sample::from_sample(value);
                        for sample in frame.iter_mut() {
                            *sample = out;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

        Ok(stream)
    }

    /// Schedule a click at an absolute clock time in seconds
    ///
    /// Times already passed start playing on the next rendered frame.
    pub fn schedule_click(&self, time: f64, kind: ClickKind) {
        let start_frame = (time.max(0.0) * self.sample_rate) as u64;
        self.pending.lock().unwrap().push(PendingClick {
            start_frame,
            kind,
            offset: 0,
        });
    }

    /// Enable or disable click rendering (scheduling is unaffected)
    pub fn set_click_enabled(&self, enabled: bool) {
        self.click_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn click_enabled(&self) -> bool {
        self.click_enabled.load(Ordering::Relaxed)
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl ClockSource for AudioClock {
    fn current_time(&self) -> f64 {
        self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

impl Drop for AudioClock {
    fn drop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_audio_clock_advances_while_rendering() {
        // Needs a real output device; skip quietly otherwise (CI)
        match AudioClock::new() {
            Ok(clock) => {
                assert!(clock.sample_rate() > 0.0);
                let a = clock.current_time();
                thread::sleep(Duration::from_millis(100));
                let b = clock.current_time();
                assert!(b >= a);
            }
            Err(_) => {
                println!("Skipping audio clock test - no audio device");
            }
        }
    }

    #[test]
    fn test_click_scheduling_does_not_panic() {
        match AudioClock::new() {
            Ok(clock) => {
                clock.schedule_click(0.0, ClickKind::Accent);
                clock.schedule_click(clock.current_time() + 0.5, ClickKind::Regular);
                clock.set_click_enabled(false);
                assert!(!clock.click_enabled());
            }
            Err(_) => {
                println!("Skipping click scheduling test - no audio device");
            }
        }
    }
}
