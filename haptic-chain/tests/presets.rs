//! Tests for the ready-made patterns in `presets`

use std::time::Duration;

use haptic_chain::presets;
use haptic_chain::testing::{ManualDispatcher, RecordingBackend, Trigger, VirtualClock};
use haptic_chain::{EffectChain, EffectKind, Haptics};

type TestChain = EffectChain<VirtualClock, ManualDispatcher, RecordingBackend>;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn run(preset: fn(TestChain)) -> Vec<Trigger> {
    let clock = VirtualClock::new();
    let dispatcher = ManualDispatcher::new(clock.clone());
    let haptics = Haptics::new(clock.clone(), dispatcher.clone(), RecordingBackend::new(clock));

    preset(haptics.chain());
    dispatcher.run_all();
    haptics.backend().triggers()
}

#[test]
fn test_triple_tick() {
    let triggers = run(presets::triple_tick);
    let offsets: Vec<_> = triggers.iter().map(|t| t.at).collect();
    assert_eq!(offsets, vec![ms(0), ms(200), ms(400)]);
    assert!(triggers.iter().all(|t| t.kind == EffectKind::SelectionChanged));
}

#[test]
fn test_ticking_replay() {
    let triggers = run(presets::ticking_replay);
    let offsets: Vec<_> = triggers.iter().map(|t| t.at).collect();
    assert_eq!(offsets, vec![ms(0), ms(200), ms(400)]);
}

#[test]
fn test_tap_then_success() {
    let triggers = run(presets::tap_then_success);
    let timeline: Vec<_> = triggers.iter().map(|t| (t.kind, t.at)).collect();
    assert_eq!(
        timeline,
        vec![
            (EffectKind::SelectionChanged, ms(0)),
            (EffectKind::SelectionChanged, ms(300)),
            (EffectKind::LightImpact, ms(450)),
            (EffectKind::NotificationSuccess, ms(1450)),
        ]
    );
}
