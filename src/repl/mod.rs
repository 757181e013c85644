//! REPL for driving the transport interactively
//!
//! Owns the transport plus its audio/MIDI collaborators and wires transport
//! events to the metronome click, the MIDI clock output, and a small event
//! printer.

use crate::audio::click::ClickKind;
use crate::audio::clock::AudioClock;
use crate::audio::midi::{pulses_per_step, MidiClockOut};
use crate::commands::{create_registry, CommandContext, CommandResult};
use crate::transport::clock::{ClockSource, SystemClock};
use crate::transport::transport::Transport;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::sync::{Arc, Weak};
use std::thread;
use tactus_core::{TempoConfig, TransportEvent};

/// Interactive shell around a [`Transport`]
pub struct Repl {
    editor: DefaultEditor,
    ctx: CommandContext,
}

impl Repl {
    /// Create a REPL with an audio-driven clock, falling back to the system
    /// clock when no output device is available
    pub fn new() -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;

        let (clock, audio): (Arc<dyn ClockSource>, Option<Arc<AudioClock>>) =
            match AudioClock::new() {
                Ok(audio) => {
                    let audio = Arc::new(audio);
                    (audio.clone() as Arc<dyn ClockSource>, Some(audio))
                }
                Err(e) => {
                    eprintln!(
                        "{} {} - falling back to the system clock",
                        "No audio device:".yellow(),
                        e
                    );
                    (Arc::new(SystemClock::new()), None)
                }
            };

        let transport = Arc::new(Transport::new(clock, TempoConfig::default()));

        // MIDI output is optional; the transport runs fine without it
        let midi = MidiClockOut::new().ok().map(Arc::new);

        if let Some(audio) = audio.as_ref() {
            Self::wire_click(&transport, audio);
        }
        if let Some(midi) = midi.as_ref() {
            Self::wire_midi_sync(&transport, midi);
        }
        Self::spawn_event_printer(&transport);

        let mut ctx = CommandContext::new(transport);
        if let Some(audio) = audio {
            ctx = ctx.with_audio(audio);
        }
        if let Some(midi) = midi {
            ctx = ctx.with_midi(midi);
        }

        Ok(Repl { editor, ctx })
    }

    /// Schedule metronome clicks at the exact beat times the scheduler
    /// hands back — not at callback time
    fn wire_click(transport: &Arc<Transport>, audio: &Arc<AudioClock>) {
        let audio = audio.clone();
        transport.on_beat(move |beat, time| {
            let kind = if beat == 0 {
                ClickKind::Accent
            } else {
                ClickKind::Regular
            };
            audio.schedule_click(time, kind);
        });
    }

    /// Derive 24-PPQN MIDI clock from transport events
    fn wire_midi_sync(transport: &Arc<Transport>, midi: &Arc<MidiClockOut>) {
        // Weak references: the callbacks live inside the transport, so a
        // strong handle here would keep it alive forever
        let weak: Weak<Transport> = Arc::downgrade(transport);

        let m = midi.clone();
        let w = weak.clone();
        transport.on_step(move |_, _| {
            let pulses = w
                .upgrade()
                .map(|t| pulses_per_step(t.config().steps_per_beat()))
                .unwrap_or(0);
            for _ in 0..pulses {
                m.tick();
            }
        });

        let m = midi.clone();
        let w = weak.clone();
        transport.on_play(move || {
            let position = match w.upgrade() {
                Some(t) => t.position(),
                None => return,
            };
            if position.total_steps == 0 {
                m.start();
            } else {
                let config = match w.upgrade() {
                    Some(t) => t.config(),
                    None => return,
                };
                // Song position counts sixteenth notes
                let sixteenths =
                    position.total_steps * 4 / config.steps_per_beat().max(1) as u64;
                m.song_position(sixteenths.min(u16::MAX as u64) as u16);
                m.resume();
            }
        });

        let m = midi.clone();
        transport.on_stop(move || m.stop());
        let m = midi.clone();
        transport.on_pause(move || m.stop());
    }

    /// Print bar and phrase boundaries as they fire
    fn spawn_event_printer(transport: &Arc<Transport>) {
        let rx = transport.subscribe();
        thread::spawn(move || {
            while let Ok(event) = rx.recv() {
                match event {
                    TransportEvent::Bar { bar, .. } => {
                        println!("{}", format!("  | bar {}", bar).dimmed());
                    }
                    TransportEvent::Phrase { phrase, .. } => {
                        println!("{}", format!("  ¶ phrase {}", phrase).bright_blue());
                    }
                    _ => {}
                }
            }
        });
    }

    /// Run the readline loop until quit/EOF
    pub fn run(&mut self) -> RustylineResult<()> {
        println!("{}", "🎵 Tactus — musical transport".bold());
        println!("Type {} for commands, {} to leave.", "help".cyan(), "quit".cyan());
        println!();

        let registry = create_registry();

        loop {
            match self.editor.readline("tactus> ") {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(input);

                    match registry.execute(input, &mut self.ctx) {
                        CommandResult::Success => {}
                        CommandResult::Message(msg) => println!("{}", msg),
                        CommandResult::Error(e) => println!("{} {}", "Error:".red(), e),
                        CommandResult::NotACommand => {
                            println!(
                                "Unknown command '{}'. Type {} for a list.",
                                input,
                                "help".cyan()
                            );
                        }
                        CommandResult::Exit => break,
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e),
            }
        }

        self.ctx.transport.stop();
        Ok(())
    }
}
