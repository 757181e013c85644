//! Transport REPL commands (play, stop, tempo, swing, seek, meter, status)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use tactus_core::types::{MAX_BPM, MIN_BPM};
use tactus_core::{SeekTarget, TempoUpdate};

/// Handle `play` command
pub fn cmd_play(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.transport.play();
    if ctx.transport.is_playing() {
        CommandResult::Message("▶ playing".bright_green().to_string())
    } else {
        CommandResult::Error("Cannot start: clock source not ready".to_string())
    }
}

/// Handle `stop` command
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.transport.stop();
    CommandResult::Message("■ stopped".bright_red().to_string())
}

/// Handle `pause` command
pub fn cmd_pause(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !ctx.transport.is_playing() {
        return CommandResult::Message("Not playing".to_string());
    }
    ctx.transport.pause();
    CommandResult::Message(format!("⏸ paused at {}", ctx.transport.position()))
}

/// Handle `tempo [bpm]` command
pub fn cmd_tempo(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Message(format!("Current tempo: {:.1} BPM", ctx.transport.bpm()));
    }

    match args.parse::<f64>() {
        Ok(bpm) if bpm > 0.0 => {
            ctx.transport.set_tempo(bpm);
            // Out-of-range values clamp rather than fail
            CommandResult::Message(
                format!("🎵 Tempo set to {:.1} BPM", ctx.transport.bpm())
                    .bright_green()
                    .to_string(),
            )
        }
        _ => CommandResult::Error(format!(
            "Invalid tempo. Use a value between {:.0}-{:.0} BPM",
            MIN_BPM, MAX_BPM
        )),
    }
}

/// Handle `swing [amount] [subdivision]` command
pub fn cmd_swing(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let config = ctx.transport.config();
    if args.is_empty() {
        return CommandResult::Message(format!(
            "Swing: {:.2} (every {} steps)",
            config.swing(),
            config.swing_subdivision()
        ));
    }

    let mut parts = args.split_whitespace();
    let amount = match parts.next().map(str::parse::<f64>) {
        Some(Ok(amount)) if (0.0..=1.0).contains(&amount) => amount,
        _ => return CommandResult::Error("Usage: swing <0.0-1.0> [subdivision]".to_string()),
    };
    let subdivision = match parts.next() {
        Some(s) => match s.parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => return CommandResult::Error("Subdivision must be a positive integer".to_string()),
        },
        None => None,
    };

    ctx.transport.set_config(TempoUpdate {
        swing: Some(amount),
        swing_subdivision: subdivision,
        ..Default::default()
    });

    CommandResult::Message(
        format!("Swing set to {:.2}", amount)
            .bright_green()
            .to_string(),
    )
}

/// Handle `seek <bar> [beat] [step]` command
pub fn cmd_seek(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut parts = args.split_whitespace();
    let bar = match parts.next().map(str::parse::<u32>) {
        Some(Ok(bar)) => bar,
        _ => return CommandResult::Error("Usage: seek <bar> [beat] [step]".to_string()),
    };
    let beat = parts.next().and_then(|s| s.parse::<u32>().ok());
    let step = parts.next().and_then(|s| s.parse::<u32>().ok());

    ctx.transport.seek(SeekTarget {
        bar: Some(bar),
        beat: Some(beat.unwrap_or(0)),
        step: Some(step.unwrap_or(0)),
        phrase: None,
    });

    CommandResult::Message(format!("Position: {}", ctx.transport.position()))
}

/// Handle `meter <beats/bar> <steps/beat> [bars/phrase]` command
pub fn cmd_meter(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let config = ctx.transport.config();
    if args.is_empty() {
        return CommandResult::Message(config.to_string());
    }

    let values: Vec<u32> = args
        .split_whitespace()
        .filter_map(|s| s.parse::<u32>().ok())
        .collect();

    match values.as_slice() {
        [beats_per_bar, steps_per_beat] | [beats_per_bar, steps_per_beat, _] => {
            ctx.transport.set_config(TempoUpdate {
                beats_per_bar: Some(*beats_per_bar),
                steps_per_beat: Some(*steps_per_beat),
                bars_per_phrase: values.get(2).copied(),
                ..Default::default()
            });
            CommandResult::Message(ctx.transport.config().to_string())
        }
        _ => CommandResult::Error("Usage: meter <beats/bar> <steps/beat> [bars/phrase]".to_string()),
    }
}

/// Handle `status` command
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let config = ctx.transport.config();
    let position = ctx.transport.position();

    let state = if ctx.transport.is_playing() {
        "▶ playing".bright_green().to_string()
    } else {
        format!("{:?}", ctx.transport.state()).dimmed().to_string()
    };

    CommandResult::Message(format!(
        "{}\n  position  {} (step {} of piece, {:.3}s)\n  tempo     {}\n  durations step {:.4}s · beat {:.4}s · bar {:.4}s · phrase {:.4}s",
        state,
        position,
        position.total_steps,
        position.total_time,
        config,
        config.step_duration(),
        config.beat_duration(),
        config.bar_duration(),
        config.phrase_duration(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::clock::ManualClock;
    use crate::transport::driver::ManualDriver;
    use crate::transport::transport::Transport;
    use std::sync::Arc;
    use tactus_core::TempoConfig;

    fn ctx() -> CommandContext {
        let clock = Arc::new(ManualClock::new());
        let transport = Arc::new(Transport::with_driver(
            clock,
            TempoConfig::default(),
            Box::new(ManualDriver::new()),
        ));
        CommandContext::new(transport)
    }

    #[test]
    fn test_tempo_query_and_set() {
        let mut ctx = ctx();

        match cmd_tempo("", &mut ctx) {
            CommandResult::Message(msg) => assert!(msg.contains("120.0")),
            other => panic!("unexpected result: {:?}", other),
        }

        cmd_tempo("140", &mut ctx);
        assert_eq!(ctx.transport.bpm(), 140.0);
    }

    #[test]
    fn test_tempo_rejects_garbage() {
        let mut ctx = ctx();
        assert!(matches!(
            cmd_tempo("fast", &mut ctx),
            CommandResult::Error(_)
        ));
    }

    #[test]
    fn test_swing_requires_range() {
        let mut ctx = ctx();

        assert!(matches!(cmd_swing("2.0", &mut ctx), CommandResult::Error(_)));

        cmd_swing("0.5 2", &mut ctx);
        let config = ctx.transport.config();
        assert_eq!(config.swing(), 0.5);
        assert_eq!(config.swing_subdivision(), 2);
    }

    #[test]
    fn test_seek_defaults_beat_and_step_to_zero() {
        let mut ctx = ctx();

        cmd_seek("3", &mut ctx);
        let pos = ctx.transport.position();
        assert_eq!((pos.bar, pos.beat, pos.step), (3, 0, 0));
    }

    #[test]
    fn test_meter_updates_subdivisions() {
        let mut ctx = ctx();

        cmd_meter("3 2 8", &mut ctx);
        let config = ctx.transport.config();
        assert_eq!(config.beats_per_bar(), 3);
        assert_eq!(config.steps_per_beat(), 2);
        assert_eq!(config.bars_per_phrase(), 8);
    }

    #[test]
    fn test_pause_when_stopped_is_informative() {
        let mut ctx = ctx();
        assert!(matches!(
            cmd_pause("", &mut ctx),
            CommandResult::Message(_)
        ));
    }
}
