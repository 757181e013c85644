//! MIDI sync REPL commands

use crate::audio::midi::MidiClockOut;
use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `midi devices` command
pub fn cmd_midi_devices(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    match MidiClockOut::list_ports() {
        Ok(ports) if ports.is_empty() => {
            CommandResult::Message("No MIDI output ports available".to_string())
        }
        Ok(ports) => {
            let mut output = String::from("MIDI output ports:\n");
            for (i, name) in ports.iter().enumerate() {
                output.push_str(&format!("  {}: {}\n", i, name));
            }
            CommandResult::Message(output)
        }
        Err(e) => CommandResult::Error(format!("MIDI error: {}", e)),
    }
}

/// Handle `midi connect <port>` command
pub fn cmd_midi_connect(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: midi connect <port name>".to_string());
    }

    let midi = match &ctx.midi {
        Some(midi) => midi,
        None => return CommandResult::Error("MIDI output unavailable".to_string()),
    };

    match midi.connect(args) {
        Ok(()) => CommandResult::Message(
            format!(
                "🎹 Sending MIDI clock to '{}'",
                midi.connected_port().unwrap_or_else(|| args.to_string())
            )
            .bright_green()
            .to_string(),
        ),
        Err(e) => CommandResult::Error(format!("MIDI connect failed: {}", e)),
    }
}

/// Handle `midi disconnect` command
pub fn cmd_midi_disconnect(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let midi = match &ctx.midi {
        Some(midi) => midi,
        None => return CommandResult::Error("MIDI output unavailable".to_string()),
    };

    match midi.disconnect() {
        Ok(()) => CommandResult::Message("MIDI sync disconnected".to_string()),
        Err(e) => CommandResult::Error(format!("MIDI disconnect failed: {}", e)),
    }
}

/// Handle `midi status` command
pub fn cmd_midi_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match &ctx.midi {
        Some(midi) if midi.is_connected() => CommandResult::Message(format!(
            "MIDI sync: connected to '{}'",
            midi.connected_port().unwrap_or_default()
        )),
        Some(_) => CommandResult::Message("MIDI sync: not connected".to_string()),
        None => CommandResult::Message("MIDI output unavailable".to_string()),
    }
}
