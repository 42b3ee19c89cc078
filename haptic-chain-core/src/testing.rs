//! Test utilities for haptic-chain
//!
//! Deterministic stand-ins for the three collaborators a chain needs:
//!
//! - [`VirtualClock`]: a manually advanced clock measured from zero
//! - [`ManualDispatcher`]: queues actions and runs them on demand, moving the
//!   virtual clock to each deadline first
//! - [`RecordingBackend`]: records every trigger with the virtual time it
//!   fired at
//! - Assertion macros for verifying recorded triggers
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use haptic_chain_core::testing::{ManualDispatcher, RecordingBackend, VirtualClock};
//! use haptic_chain_core::{EffectKind, Haptics};
//!
//! let clock = VirtualClock::new();
//! let dispatcher = ManualDispatcher::new(clock.clone());
//! let haptics = Haptics::new(clock.clone(), dispatcher.clone(), RecordingBackend::new(clock));
//!
//! haptics
//!     .chain()
//!     .selection_changed()
//!     .then(Duration::from_millis(200))
//!     .selection_changed()
//!     .play();
//!
//! dispatcher.run_all();
//!
//! let offsets = haptics.backend().offsets_of(EffectKind::SelectionChanged);
//! assert_eq!(offsets, vec![Duration::ZERO, Duration::from_millis(200)]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use crate::backend::EffectBackend;
use crate::clock::Clock;
use crate::dispatch::{Dispatcher, ScheduledAction};
use crate::effect::{EffectKind, ImpactStyle, NotificationType};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clock whose instants are offsets from a virtual zero.
///
/// Clones share the same time, so a clock handed to a chain and one kept by
/// the test always agree.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Arc<Mutex<Duration>>,
}

impl VirtualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = lock(&self.now);
        *now = now.saturating_add(delta);
    }

    /// Move the clock forward to `at`. Earlier instants are ignored; the
    /// clock never runs backwards.
    pub fn advance_to(&self, at: Duration) {
        let mut now = lock(&self.now);
        if at > *now {
            *now = at;
        }
    }
}

impl Clock for VirtualClock {
    type Instant = Duration;

    fn now(&self) -> Duration {
        *lock(&self.now)
    }

    fn add(&self, at: Duration, delay: Duration) -> Duration {
        at.saturating_add(delay)
    }
}

struct Pending {
    deadline: Duration,
    seq: u64,
    action: ScheduledAction,
}

#[derive(Default)]
struct ManualQueue {
    pending: Vec<Pending>,
    history: Vec<Duration>,
    next_seq: u64,
}

impl ManualQueue {
    /// Remove the earliest entry due at or before `limit`, ties broken by
    /// submission order.
    fn pop_due(&mut self, limit: Option<Duration>) -> Option<Pending> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| limit.is_none_or(|limit| p.deadline <= limit))
            .min_by_key(|(_, p)| (p.deadline, p.seq))
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(idx))
    }
}

/// Dispatcher that only runs actions when told to.
///
/// Every call to `schedule_at` is recorded, so tests can check the exact
/// deadlines a chain produced without running anything.
#[derive(Clone)]
pub struct ManualDispatcher {
    clock: VirtualClock,
    queue: Arc<Mutex<ManualQueue>>,
}

impl ManualDispatcher {
    /// Create a dispatcher that drives `clock` as it runs actions.
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(ManualQueue::default())),
        }
    }

    /// Deadlines of every action ever scheduled, in call order.
    pub fn deadlines(&self) -> Vec<Duration> {
        lock(&self.queue).history.clone()
    }

    /// Number of actions scheduled but not yet run.
    pub fn pending(&self) -> usize {
        lock(&self.queue).pending.len()
    }

    /// Run every action due at or before `at`, then leave the clock at `at`.
    ///
    /// Returns the number of actions run.
    pub fn run_until(&self, at: Duration) -> usize {
        let ran = self.drain(Some(at));
        self.clock.advance_to(at);
        ran
    }

    /// Run every pending action in deadline order.
    ///
    /// Returns the number of actions run.
    pub fn run_all(&self) -> usize {
        self.drain(None)
    }

    fn drain(&self, limit: Option<Duration>) -> usize {
        let mut ran = 0;
        loop {
            // Release the lock before running so actions may schedule more work.
            let Some(next) = lock(&self.queue).pop_due(limit) else {
                break;
            };
            self.clock.advance_to(next.deadline);
            (next.action)();
            ran += 1;
        }
        ran
    }
}

impl Dispatcher<Duration> for ManualDispatcher {
    fn schedule_at(&self, deadline: Duration, action: ScheduledAction) {
        let mut queue = lock(&self.queue);
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.history.push(deadline);
        queue.pending.push(Pending {
            deadline,
            seq,
            action,
        });
    }
}

/// One effect played by a [`RecordingBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trigger {
    /// The effect that fired.
    pub kind: EffectKind,
    /// Virtual time at which it fired.
    pub at: Duration,
}

/// Backend that records triggers instead of producing feedback.
#[derive(Debug)]
pub struct RecordingBackend {
    clock: VirtualClock,
    triggers: Mutex<Vec<Trigger>>,
    prepares: AtomicUsize,
}

impl RecordingBackend {
    /// Create a backend that timestamps triggers with `clock`.
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            triggers: Mutex::new(Vec::new()),
            prepares: AtomicUsize::new(0),
        }
    }

    /// All triggers so far, in firing order.
    pub fn triggers(&self) -> Vec<Trigger> {
        lock(&self.triggers).clone()
    }

    /// Take all triggers so far, leaving the record empty.
    pub fn drain_triggers(&self) -> Vec<Trigger> {
        std::mem::take(&mut *lock(&self.triggers))
    }

    /// Kinds of all triggers so far, in firing order.
    pub fn kinds(&self) -> Vec<EffectKind> {
        lock(&self.triggers).iter().map(|t| t.kind).collect()
    }

    /// Firing times of every trigger of `kind`.
    pub fn offsets_of(&self, kind: EffectKind) -> Vec<Duration> {
        lock(&self.triggers)
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.at)
            .collect()
    }

    /// Number of prepare hints received.
    pub fn prepare_count(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }

    fn record(&self, kind: EffectKind) {
        let at = self.clock.now();
        lock(&self.triggers).push(Trigger { kind, at });
    }
}

impl EffectBackend for RecordingBackend {
    fn prepare_selection(&self) {
        self.prepares.fetch_add(1, Ordering::SeqCst);
    }

    fn prepare_impact(&self, _style: ImpactStyle) {
        self.prepares.fetch_add(1, Ordering::SeqCst);
    }

    fn prepare_notification(&self) {
        self.prepares.fetch_add(1, Ordering::SeqCst);
    }

    fn selection_changed(&self) {
        self.record(EffectKind::SelectionChanged);
    }

    fn impact_occurred(&self, style: ImpactStyle) {
        self.record(EffectKind::from(style));
    }

    fn notification_occurred(&self, kind: NotificationType) {
        self.record(EffectKind::from(kind));
    }
}

/// Assert that a trigger matching a pattern was recorded.
///
/// # Example
///
/// ```ignore
/// use haptic_chain::testing::{assert_triggered, Trigger};
///
/// let triggers = backend.triggers();
/// assert_triggered!(triggers, Trigger { kind: EffectKind::LightImpact, .. });
/// ```
#[macro_export]
macro_rules! assert_triggered {
    ($triggers:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $triggers.iter().any(|t| matches!(t, $pattern $(if $guard)?)),
            "Expected trigger matching `{}`, but got: {:?}",
            stringify!($pattern),
            $triggers
        );
    };
}

/// Assert that no trigger matching a pattern was recorded.
#[macro_export]
macro_rules! assert_not_triggered {
    ($triggers:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$triggers.iter().any(|t| matches!(t, $pattern $(if $guard)?)),
            "Expected NO trigger matching `{}`, but it was: {:?}",
            stringify!($pattern),
            $triggers
        );
    };
}

/// Count how many recorded triggers match a pattern.
#[macro_export]
macro_rules! count_triggered {
    ($triggers:expr, $pattern:pat $(if $guard:expr)?) => {
        $triggers.iter().filter(|t| matches!(t, $pattern $(if $guard)?)).count()
    };
}

/// Pause tokio time for the current runtime.
///
/// Chains built on [`TokioClock`](crate::clock::TokioClock) then only move
/// forward through [`advance_time`].
#[cfg(feature = "testing-time")]
pub fn pause_time() {
    tokio::time::pause();
}

/// Resume tokio time after [`pause_time`].
#[cfg(feature = "testing-time")]
pub fn resume_time() {
    tokio::time::resume();
}

/// Advance paused tokio time by `duration`, letting due timers fire.
#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: Duration) {
    tokio::time::advance(duration).await;
}
