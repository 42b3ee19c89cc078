//! Ready-made feedback patterns
//!
//! Each preset takes a fresh chain and finishes it, so they can be started
//! from anywhere a chain can:
//!
//! ```ignore
//! presets::tap_then_success(haptics.chain());
//! ```

use std::time::Duration;

use crate::backend::EffectBackend;
use crate::chain::EffectChain;
use crate::clock::Clock;
use crate::dispatch::Dispatcher;
use crate::effect::{ImpactStyle, NotificationType};

const TICK_SPACING: Duration = Duration::from_millis(200);

/// Three selection ticks, 200ms apart.
pub fn triple_tick<C, D, B>(chain: EffectChain<C, D, B>)
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    chain
        .selection_changed()
        .then(TICK_SPACING)
        .selection_changed()
        .then(TICK_SPACING)
        .selection_changed()
        .then(TICK_SPACING)
        .play();
}

/// A selection tick replayed to three ticks on a 200ms cadence.
pub fn ticking_replay<C, D, B>(chain: EffectChain<C, D, B>)
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    chain.selection_changed().then(TICK_SPACING).replay(3);
}

/// Two quick ticks, a light tap, then a success notification a second later.
pub fn tap_then_success<C, D, B>(chain: EffectChain<C, D, B>)
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    chain
        .selection_changed()
        .replay_with_interval(2, Duration::from_millis(300))
        .then(Duration::from_millis(150))
        .impact_occurred(ImpactStyle::Light)
        .then(Duration::from_secs(1))
        .notification_occurred(NotificationType::Success)
        .play();
}
