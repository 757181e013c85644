//! General REPL commands (help, quit, click)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `click [on|off]` command
pub fn cmd_click(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let audio = match &ctx.audio {
        Some(audio) => audio,
        None => return CommandResult::Error("No audio device - click unavailable".to_string()),
    };

    match args {
        "" => CommandResult::Message(format!(
            "Click: {}",
            if audio.click_enabled() { "on" } else { "off" }
        )),
        "on" => {
            audio.set_click_enabled(true);
            CommandResult::Message("Click on".bright_green().to_string())
        }
        "off" => {
            audio.set_click_enabled(false);
            CommandResult::Message("Click off".to_string())
        }
        _ => CommandResult::Error("Usage: click [on|off]".to_string()),
    }
}

/// Print help information
fn print_help() {
    println!("{}", "🎵 Tactus Transport Help".bold());
    println!("{}", "========================".bold());
    println!();
    println!("{}", "Playback:".green());
    println!("  {}               - Start the transport", "play".cyan());
    println!("  {}               - Stop and reset to zero", "stop".cyan());
    println!(
        "  {}              - Halt, keeping the position",
        "pause".cyan()
    );
    println!();
    println!("{}", "Tempo & Meter:".green());
    println!("  {}              - Show current tempo", "tempo".cyan());
    println!("  {}        - Set tempo (20-300)", "tempo <bpm>".cyan());
    println!(
        "  {} - Set swing feel",
        "swing <0-1> [subdiv]".cyan()
    );
    println!(
        "  {} - Change the grid",
        "meter <b/bar> <s/beat> [bars]".cyan()
    );
    println!();
    println!("{}", "Position:".green());
    println!(
        "  {} - Jump to a position",
        "seek <bar> [beat] [step]".cyan()
    );
    println!("  {}             - Show transport state", "status".cyan());
    println!();
    println!("{}", "Metronome & Sync:".green());
    println!("  {}    - Toggle the metronome", "click [on|off]".cyan());
    println!("  {}       - List MIDI output ports", "midi devices".cyan());
    println!(
        "  {} - Send MIDI clock to a port",
        "midi connect <port>".cyan()
    );
    println!("  {}    - Stop sending MIDI clock", "midi disconnect".cyan());
    println!("  {}        - Show MIDI sync status", "midi status".cyan());
    println!();
    println!("{}", "Other:".green());
    println!("  {}              - Show this help", "help".bright_green());
    println!("  {}              - Exit the REPL", "quit".bright_red());
}
