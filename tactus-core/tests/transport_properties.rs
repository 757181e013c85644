//! End-to-end properties of the step engine and position arithmetic

use tactus_core::types::{SeekTarget, TempoConfig, TimePosition, TransportEvent};
use tactus_core::StepEngine;

#[test]
fn decompose_round_trips_for_many_meters() {
    let meters = [
        TempoConfig::new(120.0, 4, 4, 4, 4),
        TempoConfig::new(90.0, 3, 4, 8, 2),
        TempoConfig::new(200.0, 7, 8, 2, 6),
        TempoConfig::new(20.0, 1, 1, 1, 1),
    ];

    for config in &meters {
        for total_steps in (0..10_000u64).step_by(37) {
            let pos = TimePosition::decompose(total_steps, config);
            assert_eq!(
                TimePosition::compose(pos.step, pos.beat, pos.bar, pos.phrase, config),
                total_steps,
                "round trip failed at {} under {}",
                total_steps,
                config
            );
            assert!(pos.step < config.steps_per_beat());
            assert!(pos.beat < config.beats_per_bar());
            assert!(pos.bar < config.bars_per_phrase());
        }
    }
}

#[test]
fn sixty_four_steps_nest_into_16_beats_4_bars_1_phrase() {
    let mut engine = StepEngine::with_lookahead(TempoConfig::default(), 0.01);
    engine.prime(0.0);

    let mut steps = 0;
    let mut beats = 0;
    let mut bars = 0;
    let mut phrases = 0;

    let mut now = 0.0;
    while steps < 64 {
        for firing in engine.poll(now) {
            for event in TransportEvent::at_position(&firing.position, firing.time) {
                match event {
                    TransportEvent::Step { .. } => steps += 1,
                    TransportEvent::Beat { .. } => beats += 1,
                    TransportEvent::Bar { .. } => bars += 1,
                    TransportEvent::Phrase { .. } => phrases += 1,
                    _ => {}
                }
            }
        }
        now += 0.05;
    }

    assert_eq!(steps, 64);
    assert_eq!(beats, 16);
    assert_eq!(bars, 4);
    assert_eq!(phrases, 1);
}

#[test]
fn beats_fire_only_with_step_zero() {
    let mut engine = StepEngine::with_lookahead(TempoConfig::default(), 0.01);
    engine.prime(0.0);

    let mut now = 0.0;
    let mut seen = 0;
    while seen < 40 {
        for firing in engine.poll(now) {
            seen += 1;
            let events = TransportEvent::at_position(&firing.position, firing.time);
            let has_beat = events
                .iter()
                .any(|e| matches!(e, TransportEvent::Beat { .. }));
            assert_eq!(has_beat, firing.position.step == 0);
        }
        now += 0.05;
    }
}

#[test]
fn swung_schedule_stays_monotonic() {
    let mut config = TempoConfig::new(140.0, 4, 4, 4, 4);
    config.set_swing(0.7);
    config.set_swing_subdivision(2);

    let mut engine = StepEngine::with_lookahead(config, 0.02);
    engine.prime(0.0);

    let mut last = f64::NEG_INFINITY;
    let mut now = 0.0;
    for _ in 0..200 {
        for firing in engine.poll(now) {
            assert!(firing.time > last);
            last = firing.time;
        }
        now += 0.016;
    }
}

#[test]
fn seek_mid_playback_relocates_the_grid() {
    let mut engine = StepEngine::with_lookahead(TempoConfig::default(), 0.01);
    engine.prime(0.0);
    engine.poll(0.0);

    engine.seek(SeekTarget {
        phrase: Some(2),
        bar: Some(0),
        beat: Some(0),
        step: Some(0),
    });

    let fired = engine.poll(0.125);
    assert_eq!(fired[0].position.phrase, 2);
    assert!(fired[0].position.is_phrase_boundary());
    // The schedule itself is unaffected by the position jump
    assert_eq!(fired[0].time, 0.125);
}
