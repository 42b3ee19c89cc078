//! Fluent effect chains
//!
//! An [`EffectChain`] turns a sequence of "effect, then delay" calls into
//! absolute-time triggers. Each effect call hands a closure to the
//! [`Dispatcher`] at the chain's accumulated time and returns immediately;
//! nothing is played on the caller's thread.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use haptic_chain::prelude::*;
//!
//! let haptics = Haptics::new(TokioClock, TokioDispatcher::spawn(), TracingBackend);
//!
//! // Three ticks, 200ms apart
//! haptics
//!     .chain()
//!     .selection_changed()
//!     .then(Duration::from_millis(200))
//!     .selection_changed()
//!     .then(Duration::from_millis(200))
//!     .selection_changed()
//!     .play();
//!
//! // A tick followed by two replays on the same cadence
//! haptics
//!     .chain()
//!     .selection_changed()
//!     .then(Duration::from_millis(200))
//!     .replay(3);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::backend::EffectBackend;
use crate::clock::Clock;
use crate::dispatch::Dispatcher;
use crate::effect::{EffectKind, ImpactStyle, NotificationType};

/// A chain of scheduled effects sharing one virtual clock.
///
/// Builder methods take the chain by value and return it, so a whole
/// sequence reads as one expression. The terminal calls ([`play`] and
/// [`replay`]) borrow mutably instead, which keeps a bound chain usable
/// for another sequence afterwards.
///
/// [`play`]: EffectChain::play
/// [`replay`]: EffectChain::replay
pub struct EffectChain<C, D, B>
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    clock: C,
    dispatcher: D,
    backend: Arc<B>,
    accumulated_time: C::Instant,
    last_effect: EffectKind,
    last_interval: Duration,
}

impl<C, D, B> EffectChain<C, D, B>
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    /// Start a chain at the clock's current time.
    pub fn new(clock: C, dispatcher: D, backend: Arc<B>) -> Self {
        let accumulated_time = clock.now();
        Self {
            clock,
            dispatcher,
            backend,
            accumulated_time,
            last_effect: EffectKind::None,
            last_interval: Duration::ZERO,
        }
    }

    /// Start a chain `delay` after the clock's current time.
    ///
    /// The initial delay is not recorded as the chain's last interval.
    pub fn after(clock: C, dispatcher: D, backend: Arc<B>, delay: Duration) -> Self {
        let mut chain = Self::new(clock, dispatcher, backend);
        chain.accumulated_time = chain.clock.add(chain.accumulated_time, delay);
        chain
    }

    /// Time point at which the next effect would be scheduled.
    #[inline]
    pub fn accumulated_time(&self) -> C::Instant {
        self.accumulated_time
    }

    /// The effect most recently added to this chain.
    #[inline]
    pub fn last_effect(&self) -> EffectKind {
        self.last_effect
    }

    /// The delay most recently passed to [`then`](Self::then).
    #[inline]
    pub fn last_interval(&self) -> Duration {
        self.last_interval
    }

    /// Schedule a selection tick at the current accumulated time.
    ///
    /// Does not advance time: calling this twice in a row schedules two
    /// ticks at the same instant.
    pub fn selection_changed(self) -> Self {
        self.record(EffectKind::SelectionChanged)
    }

    /// Schedule an impact at the current accumulated time.
    pub fn impact_occurred(self, style: ImpactStyle) -> Self {
        self.record(EffectKind::from(style))
    }

    /// Schedule a notification at the current accumulated time.
    pub fn notification_occurred(self, kind: NotificationType) -> Self {
        self.record(EffectKind::from(kind))
    }

    /// Advance the chain's time by `delay` and remember it as the cadence
    /// for [`replay`](Self::replay).
    pub fn then(mut self, delay: Duration) -> Self {
        self.advance(delay);
        self.last_interval = delay;
        trace!(delay = ?delay, "Chain advanced");
        self
    }

    /// Connective with no effect on time, for readability between steps.
    #[inline]
    pub fn and(self) -> Self {
        self
    }

    /// Finish the chain.
    ///
    /// Everything already scheduled stays scheduled. Only the accumulated
    /// time is reset to now; the last effect and interval are kept.
    pub fn play(&mut self) {
        self.accumulated_time = self.clock.now();
    }

    /// Repeat the last effect until it has played `times` times in total,
    /// on the cadence of the last [`then`](Self::then) delay, then finish
    /// the chain with [`play`](Self::play).
    ///
    /// The occurrence scheduled before this call counts as one. Each of the
    /// remaining `times - 1` occurrences is scheduled at the current
    /// accumulated time and the time advanced afterwards. `replay(0)` does
    /// nothing at all, including the reset.
    pub fn replay(&mut self, times: u32) {
        if times == 0 {
            return;
        }

        debug!(
            effect = %self.last_effect,
            times,
            interval = ?self.last_interval,
            "Replaying last effect"
        );

        for _ in 1..times {
            self.schedule(self.last_effect);
            self.advance(self.last_interval);
        }

        self.play();
    }

    /// Repeat the last effect `times - 1` more times, `interval` apart,
    /// and keep the chain open for further steps.
    ///
    /// Each repetition advances time by `interval` before scheduling. The
    /// chain's own last interval is left as it was and no reset happens.
    pub fn replay_with_interval(mut self, times: u32, interval: Duration) -> Self {
        if times == 0 {
            return self;
        }

        debug!(
            effect = %self.last_effect,
            times,
            interval = ?interval,
            "Replaying last effect with interval"
        );

        for _ in 1..times {
            self.advance(interval);
            self.schedule(self.last_effect);
        }

        self
    }

    fn record(mut self, effect: EffectKind) -> Self {
        self.last_effect = effect;
        self.schedule(effect);
        self
    }

    fn advance(&mut self, delay: Duration) {
        self.accumulated_time = self.clock.add(self.accumulated_time, delay);
    }

    fn schedule(&self, effect: EffectKind) {
        if effect.is_none() {
            return;
        }

        // Prepare on every occurrence, not just the first, to keep the shared
        // generator warm.
        self.backend.prepare(effect);
        trace!(effect = %effect, "Prepared generator");

        let backend = Arc::clone(&self.backend);
        self.dispatcher
            .schedule_at(self.accumulated_time, Box::new(move || backend.trigger(effect)));

        debug!(effect = %effect, at = ?self.accumulated_time, "Scheduled effect");
    }
}

impl<C, D, B> fmt::Debug for EffectChain<C, D, B>
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectChain")
            .field("accumulated_time", &self.accumulated_time)
            .field("last_effect", &self.last_effect)
            .field("last_interval", &self.last_interval)
            .finish_non_exhaustive()
    }
}

/// A clock, dispatcher and backend bundled for building chains.
///
/// Cloning is cheap; every chain created from the same `Haptics` shares the
/// one backend.
pub struct Haptics<C, D, B> {
    clock: C,
    dispatcher: D,
    backend: Arc<B>,
}

impl<C, D, B> Haptics<C, D, B>
where
    C: Clock,
    D: Dispatcher<C::Instant>,
    B: EffectBackend,
{
    /// Bundle a clock, dispatcher and backend.
    pub fn new(clock: C, dispatcher: D, backend: B) -> Self {
        Self::with_shared_backend(clock, dispatcher, Arc::new(backend))
    }

    /// Bundle with a backend that is already shared elsewhere.
    pub fn with_shared_backend(clock: C, dispatcher: D, backend: Arc<B>) -> Self {
        Self {
            clock,
            dispatcher,
            backend,
        }
    }

    /// Start a new chain at the current time.
    pub fn chain(&self) -> EffectChain<C, D, B> {
        EffectChain::new(
            self.clock.clone(),
            self.dispatcher.clone(),
            Arc::clone(&self.backend),
        )
    }

    /// Start a new chain `delay` from now.
    pub fn chain_after(&self, delay: Duration) -> EffectChain<C, D, B> {
        EffectChain::after(
            self.clock.clone(),
            self.dispatcher.clone(),
            Arc::clone(&self.backend),
            delay,
        )
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get a reference to the dispatcher.
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Get a reference to the shared backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

impl<C: Clone, D: Clone, B> Clone for Haptics<C, D, B> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            dispatcher: self.dispatcher.clone(),
            backend: Arc::clone(&self.backend),
        }
    }
}
