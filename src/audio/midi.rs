//! MIDI clock output
//!
//! Sends MIDI realtime sync (clock tick, start, continue, stop, song
//! position) to an external port, driven by transport events. Uses midir
//! with a channel-based architecture: a dedicated thread owns the
//! connection, the handle is freely shareable.

use anyhow::{anyhow, Result};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::mpsc::{channel, Sender};
use std::sync::RwLock;
use std::thread::{self, JoinHandle};

/// MIDI realtime status bytes
const MIDI_CLOCK: u8 = 0xF8;
const MIDI_START: u8 = 0xFA;
const MIDI_CONTINUE: u8 = 0xFB;
const MIDI_STOP: u8 = 0xFC;
const MIDI_SONG_POSITION: u8 = 0xF2;

/// MIDI clock runs at 24 pulses per quarter note
pub const MIDI_PPQN: u32 = 24;

/// Clock pulses to send per transport step
///
/// Exact for subdivisions that divide 24; clamps to one pulse per step for
/// finer grids.
pub fn pulses_per_step(steps_per_beat: u32) -> u32 {
    (MIDI_PPQN / steps_per_beat.max(1)).max(1)
}

/// Commands handled by the MIDI output thread
#[derive(Debug, Clone)]
enum MidiSyncCommand {
    Connect { port_name: String },
    Tick,
    Start,
    Continue,
    Stop,
    SongPosition(u16),
    Disconnect,
    Shutdown,
}

/// Internal handler that owns the connection
struct MidiSyncInternal {
    connection: Option<MidiOutputConnection>,
    command_rx: std::sync::mpsc::Receiver<MidiSyncCommand>,
}

impl MidiSyncInternal {
    fn new(command_rx: std::sync::mpsc::Receiver<MidiSyncCommand>) -> Self {
        Self {
            connection: None,
            command_rx,
        }
    }

    fn connect(&mut self, port_name: &str) -> Result<()> {
        let midi_out = MidiOutput::new("Tactus").map_err(|e| anyhow!("{e}"))?;
        let ports = midi_out.ports();

        let port = ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|name| name.contains(port_name))
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow!("MIDI port '{}' not found", port_name))?;

        let connection = midi_out
            .connect(port, "tactus-sync")
            .map_err(|e| anyhow!("{e}"))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn run(&mut self) {
        while let Ok(cmd) = self.command_rx.recv() {
            match cmd {
                MidiSyncCommand::Connect { port_name } => {
                    if let Err(e) = self.connect(&port_name) {
                        eprintln!("MIDI connect error: {}", e);
                    }
                }
                MidiSyncCommand::Tick => {
                    if let Some(conn) = &mut self.connection {
                        let _ = conn.send(&[MIDI_CLOCK]);
                    }
                }
                MidiSyncCommand::Start => {
                    if let Some(conn) = &mut self.connection {
                        let _ = conn.send(&[MIDI_START]);
                    }
                }
                MidiSyncCommand::Continue => {
                    if let Some(conn) = &mut self.connection {
                        let _ = conn.send(&[MIDI_CONTINUE]);
                    }
                }
                MidiSyncCommand::Stop => {
                    if let Some(conn) = &mut self.connection {
                        let _ = conn.send(&[MIDI_STOP]);
                    }
                }
                MidiSyncCommand::SongPosition(beats) => {
                    if let Some(conn) = &mut self.connection {
                        // 14-bit value, LSB first
                        let _ = conn.send(&[
                            MIDI_SONG_POSITION,
                            (beats & 0x7F) as u8,
                            ((beats >> 7) & 0x7F) as u8,
                        ]);
                    }
                }
                MidiSyncCommand::Disconnect => {
                    self.connection = None;
                }
                MidiSyncCommand::Shutdown => {
                    if let Some(conn) = &mut self.connection {
                        let _ = conn.send(&[MIDI_STOP]);
                    }
                    break;
                }
            }
        }
    }
}

/// Thread-safe handle to the MIDI sync output
pub struct MidiClockOut {
    command_tx: Sender<MidiSyncCommand>,
    _thread: JoinHandle<()>,
    connected: RwLock<bool>,
    port_name: RwLock<Option<String>>,
}

impl MidiClockOut {
    /// Create a new MIDI sync handle (not connected to any port yet)
    pub fn new() -> Result<Self> {
        let (tx, rx) = channel();

        let thread = thread::spawn(move || {
            let mut internal = MidiSyncInternal::new(rx);
            internal.run();
        });

        Ok(Self {
            command_tx: tx,
            _thread: thread,
            connected: RwLock::new(false),
            port_name: RwLock::new(None),
        })
    }

    /// List available MIDI output ports
    ///
    /// Creates a temporary MIDI client, which can sometimes fail on macOS;
    /// retries up to 3 times with a small delay.
    pub fn list_ports() -> Result<Vec<String>> {
        let mut last_err = None;
        for attempt in 0..3 {
            if attempt > 0 {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            match MidiOutput::new("Tactus") {
                Ok(midi_out) => {
                    let ports = midi_out.ports();
                    let names: Vec<String> = ports
                        .iter()
                        .filter_map(|p| midi_out.port_name(p).ok())
                        .collect();
                    return Ok(names);
                }
                Err(e) => {
                    last_err = Some(e);
                }
            }
        }
        Err(anyhow!(
            "MIDI initialization failed after 3 attempts: {:?}",
            last_err
        ))
    }

    /// Connect to a MIDI output port by name (partial match supported)
    pub fn connect(&self, port_name: &str) -> Result<()> {
        // Validate the port exists before sending the command
        let midi_out = MidiOutput::new("Tactus").map_err(|e| anyhow!("{e}"))?;
        let ports = midi_out.ports();

        let port = ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|name| name.contains(port_name))
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow!("MIDI port '{}' not found", port_name))?;

        let actual_name = midi_out.port_name(port)?;

        self.command_tx
            .send(MidiSyncCommand::Connect {
                port_name: port_name.to_string(),
            })
            .map_err(|e| anyhow!("Failed to send connect command: {}", e))?;

        *self.connected.write().unwrap() = true;
        *self.port_name.write().unwrap() = Some(actual_name);

        Ok(())
    }

    /// Disconnect from the current MIDI port
    pub fn disconnect(&self) -> Result<()> {
        self.command_tx
            .send(MidiSyncCommand::Disconnect)
            .map_err(|e| anyhow!("Failed to send disconnect: {}", e))?;

        *self.connected.write().unwrap() = false;
        *self.port_name.write().unwrap() = None;

        Ok(())
    }

    /// Check if connected to a MIDI port
    pub fn is_connected(&self) -> bool {
        *self.connected.read().unwrap()
    }

    /// Name of the connected port
    pub fn connected_port(&self) -> Option<String> {
        self.port_name.read().unwrap().clone()
    }

    /// Send one clock pulse (0xF8)
    pub fn tick(&self) {
        let _ = self.command_tx.send(MidiSyncCommand::Tick);
    }

    /// Send Start (0xFA)
    pub fn start(&self) {
        let _ = self.command_tx.send(MidiSyncCommand::Start);
    }

    /// Send Continue (0xFB)
    pub fn resume(&self) {
        let _ = self.command_tx.send(MidiSyncCommand::Continue);
    }

    /// Send Stop (0xFC)
    pub fn stop(&self) {
        let _ = self.command_tx.send(MidiSyncCommand::Stop);
    }

    /// Send Song Position Pointer, in MIDI beats (sixteenth notes)
    pub fn song_position(&self, sixteenths: u16) {
        let _ = self
            .command_tx
            .send(MidiSyncCommand::SongPosition(sixteenths));
    }
}

impl Drop for MidiClockOut {
    fn drop(&mut self) {
        let _ = self.command_tx.send(MidiSyncCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulses_per_step() {
        assert_eq!(pulses_per_step(4), 6); // sixteenths
        assert_eq!(pulses_per_step(2), 12); // eighths
        assert_eq!(pulses_per_step(1), 24); // quarters
        assert_eq!(pulses_per_step(24), 1);
        // Finer than MIDI clock resolves: clamp to one pulse per step
        assert_eq!(pulses_per_step(48), 1);
        // Division-by-zero guard
        assert_eq!(pulses_per_step(0), 24);
    }

    #[test]
    fn test_sync_commands_without_connection() {
        // Port-less environments (CI) still construct the handle; sends
        // are no-ops until connected
        match MidiClockOut::new() {
            Ok(midi) => {
                assert!(!midi.is_connected());
                midi.start();
                midi.tick();
                midi.song_position(16);
                midi.stop();
            }
            Err(_) => {
                println!("Skipping MIDI sync test - MIDI unavailable");
            }
        }
    }

    #[test]
    fn test_list_ports_does_not_panic() {
        // Actual ports depend on the system; just exercise the call
        let _ = MidiClockOut::list_ports();
    }
}
