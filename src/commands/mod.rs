//! Command registry for REPL commands
//!
//! Provides a clean, extensible pattern for handling REPL commands.

pub mod general;
pub mod midi;
pub mod transport;

use crate::audio::clock::AudioClock;
use crate::audio::midi::MidiClockOut;
use crate::transport::transport::Transport;
use std::sync::Arc;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command
    NotACommand,
    /// Error occurred
    Error(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub transport: Arc<Transport>,
    pub audio: Option<Arc<AudioClock>>,
    pub midi: Option<Arc<MidiClockOut>>,
}

impl CommandContext {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            audio: None,
            midi: None,
        }
    }

    /// Attach the audio clock (enables click commands)
    pub fn with_audio(mut self, audio: Arc<AudioClock>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Attach MIDI sync output (enables midi commands)
    pub fn with_midi(mut self, midi: Arc<MidiClockOut>) -> Self {
        self.midi = Some(midi);
        self
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Commands indexed by their prefix, sorted by prefix length descending
    /// for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = if input.len() > prefix.len() {
                    input[prefix.len()..].trim()
                } else {
                    ""
                };
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register("play", transport::cmd_play);
    registry.register("stop", transport::cmd_stop);
    registry.register("pause", transport::cmd_pause);
    registry.register("tempo", transport::cmd_tempo);
    registry.register("swing", transport::cmd_swing);
    registry.register("seek", transport::cmd_seek);
    registry.register("meter", transport::cmd_meter);
    registry.register("status", transport::cmd_status);

    registry.register("midi devices", midi::cmd_midi_devices);
    registry.register("midi connect", midi::cmd_midi_connect);
    registry.register("midi disconnect", midi::cmd_midi_disconnect);
    registry.register("midi status", midi::cmd_midi_status);

    registry.register("click", general::cmd_click);
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::clock::ManualClock;
    use crate::transport::driver::ManualDriver;
    use tactus_core::TempoConfig;

    fn test_context() -> CommandContext {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(Transport::with_driver(
            clock,
            TempoConfig::default(),
            Box::new(ManualDriver::new()),
        ));
        CommandContext::new(transport)
    }

    #[test]
    fn test_registry_longest_prefix_wins() {
        let registry = create_registry();
        let mut ctx = test_context();

        // "midi devices" must match before a hypothetical shorter "midi"
        let result = registry.execute("midi devices", &mut ctx);
        assert!(!matches!(result, CommandResult::NotACommand));
    }

    #[test]
    fn test_unknown_input_is_not_a_command() {
        let registry = create_registry();
        let mut ctx = test_context();

        assert!(matches!(
            registry.execute("flimflam", &mut ctx),
            CommandResult::NotACommand
        ));
    }

    #[test]
    fn test_play_and_stop_commands_drive_transport() {
        let registry = create_registry();
        let mut ctx = test_context();

        registry.execute("play", &mut ctx);
        assert!(ctx.transport.is_playing());

        registry.execute("stop", &mut ctx);
        assert!(!ctx.transport.is_playing());
    }

    #[test]
    fn test_tempo_command_sets_clamped_bpm() {
        let registry = create_registry();
        let mut ctx = test_context();

        registry.execute("tempo 90", &mut ctx);
        assert_eq!(ctx.transport.bpm(), 90.0);

        registry.execute("tempo 1000", &mut ctx);
        assert_eq!(ctx.transport.bpm(), 300.0);
    }

    #[test]
    fn test_seek_command_parses_bar_beat_step() {
        let registry = create_registry();
        let mut ctx = test_context();

        registry.execute("seek 2 1", &mut ctx);
        assert_eq!(ctx.transport.position().total_steps, 36);
    }
}
