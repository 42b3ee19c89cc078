//! Tokio-backed dispatcher
//!
//! [`TokioDispatcher`] runs every scheduled action on a single worker task,
//! which gives chains the serial, order-preserving queue they expect: jobs
//! are kept in a heap keyed by (deadline, submission order) and the worker
//! sleeps until the earliest one is due.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use haptic_chain::prelude::*;
//!
//! let dispatcher = TokioDispatcher::spawn();
//! let haptics = Haptics::new(TokioClock, dispatcher.clone(), TracingBackend);
//!
//! haptics
//!     .chain()
//!     .impact_occurred(ImpactStyle::Light)
//!     .then(Duration::from_secs(1))
//!     .notification_occurred(NotificationType::Success)
//!     .play();
//!
//! // Drop anything still pending (e.g., on shutdown)
//! dispatcher.shutdown();
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{self, AtomicUsize};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dispatch::{Dispatcher, ScheduledAction};

/// Configuration for the dispatcher worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// How late an action may run before a warning is logged.
    pub late_threshold_ms: u64,
    /// Initial capacity of the pending job heap.
    pub queue_capacity_hint: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            late_threshold_ms: 20,
            queue_capacity_hint: 64,
        }
    }
}

impl DispatcherConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Example
    /// ```
    /// use haptic_chain_core::runtime::DispatcherConfig;
    ///
    /// let config = DispatcherConfig::from_json(r#"{ "late_threshold_ms": 5 }"#).unwrap();
    /// assert_eq!(config.late_threshold_ms, 5);
    /// assert_eq!(config.queue_capacity_hint, 64);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The lateness threshold as a `Duration`.
    pub fn late_threshold(&self) -> Duration {
        Duration::from_millis(self.late_threshold_ms)
    }
}

struct Submission {
    deadline: Instant,
    action: ScheduledAction,
}

struct Job {
    deadline: Instant,
    seq: u64,
    action: ScheduledAction,
}

impl Job {
    fn key(&self) -> (Instant, u64) {
        (self.deadline, self.seq)
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    // Reversed so the max-heap pops the earliest job first
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Dispatcher that runs actions on a dedicated tokio task.
///
/// Clones share the same worker. The worker keeps running pending actions
/// after every handle is dropped and exits once the queue is empty; call
/// [`shutdown`](Self::shutdown) to drop pending actions instead.
#[derive(Clone)]
pub struct TokioDispatcher {
    tx: mpsc::UnboundedSender<Submission>,
    pending: Arc<AtomicUsize>,
    cancel: CancellationToken,
}

impl TokioDispatcher {
    /// Spawn a worker on the current runtime with the default config.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn() -> Self {
        Self::spawn_with_config(DispatcherConfig::default())
    }

    /// Spawn a worker on the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn_with_config(config: DispatcherConfig) -> Self {
        Self::spawn_on(&Handle::current(), config)
    }

    /// Spawn a worker on the given runtime.
    pub fn spawn_on(handle: &Handle, config: DispatcherConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        handle.spawn(run_worker(rx, Arc::clone(&pending), cancel.clone(), config));

        Self {
            tx,
            pending,
            cancel,
        }
    }

    /// Stop the worker and drop every action that has not run yet.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of actions scheduled but not yet run.
    pub fn pending(&self) -> usize {
        self.pending.load(atomic::Ordering::SeqCst)
    }
}

impl Dispatcher<Instant> for TokioDispatcher {
    fn schedule_at(&self, deadline: Instant, action: ScheduledAction) {
        if self.is_shutdown() {
            warn!("Dispatcher is shut down, dropping scheduled action");
            return;
        }

        self.pending.fetch_add(1, atomic::Ordering::SeqCst);
        self.send_counted(Submission { deadline, action });
    }
}

impl TokioDispatcher {
    /// Hand a submission already counted in `pending` to the worker,
    /// releasing the count if the worker is gone.
    fn send_counted(&self, submission: Submission) {
        if self.tx.send(submission).is_err() {
            self.pending.fetch_sub(1, atomic::Ordering::SeqCst);
            warn!("Dispatcher worker has exited, dropping scheduled action");
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Submission>,
    pending: Arc<AtomicUsize>,
    cancel: CancellationToken,
    config: DispatcherConfig,
) {
    let late_threshold = config.late_threshold();
    let mut heap: BinaryHeap<Job> = BinaryHeap::with_capacity(config.queue_capacity_hint);
    let mut next_seq: u64 = 0;
    let mut open = true;

    debug!("Dispatcher worker started");

    loop {
        if !open && heap.is_empty() {
            debug!("All dispatcher handles dropped and queue drained, stopping worker");
            break;
        }

        let next_deadline = heap.peek().map(|job| job.deadline);
        let sleep = tokio::time::sleep_until(next_deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(dropped = heap.len(), "Dispatcher cancelled");
                break;
            }

            submission = rx.recv(), if open => match submission {
                Some(Submission { deadline, action }) => {
                    heap.push(Job { deadline, seq: next_seq, action });
                    next_seq += 1;
                }
                None => open = false,
            },

            _ = sleep, if next_deadline.is_some() => {
                let now = Instant::now();
                while heap.peek().is_some_and(|job| job.deadline <= now) {
                    let Some(job) = heap.pop() else { break };

                    let lateness = now.saturating_duration_since(job.deadline);
                    if lateness > late_threshold {
                        warn!(late = ?lateness, "Scheduled action ran late");
                    }

                    (job.action)();
                    pending.fetch_sub(1, atomic::Ordering::SeqCst);
                }
            }
        }
    }

    // Release only the jobs dropped here. Senders that lose the race with
    // `close` release their own count when the send fails.
    let mut dropped = heap.len();
    drop(heap);
    rx.close();
    while rx.try_recv().is_ok() {
        dropped += 1;
    }
    pending.fetch_sub(dropped, atomic::Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EffectBackend;
    use crate::chain::Haptics;
    use crate::clock::TokioClock;
    use crate::effect::{EffectKind, ImpactStyle, NotificationType};

    struct ChannelBackend(mpsc::UnboundedSender<(EffectKind, Instant)>);

    impl ChannelBackend {
        fn send(&self, kind: EffectKind) {
            let _ = self.0.send((kind, Instant::now()));
        }
    }

    impl EffectBackend for ChannelBackend {
        fn selection_changed(&self) {
            self.send(EffectKind::SelectionChanged);
        }
        fn impact_occurred(&self, style: ImpactStyle) {
            self.send(EffectKind::from(style));
        }
        fn notification_occurred(&self, kind: NotificationType) {
            self.send(EffectKind::from(kind));
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + ms(5),
            "expected ~{:?}, got {:?}",
            expected,
            actual
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_fires_at_offsets() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let haptics = Haptics::new(TokioClock, TokioDispatcher::spawn(), ChannelBackend(tx));
        let start = Instant::now();

        haptics
            .chain()
            .impact_occurred(ImpactStyle::Light)
            .then(Duration::from_secs(1))
            .notification_occurred(NotificationType::Success)
            .play();

        let (kind, at) = rx.recv().await.expect("channel closed");
        assert_eq!(kind, EffectKind::LightImpact);
        assert_near(at - start, ms(0));

        let (kind, at) = rx.recv().await.expect("channel closed");
        assert_eq!(kind, EffectKind::NotificationSuccess);
        assert_near(at - start, ms(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_deadlines_run_in_submission_order() {
        let dispatcher = TokioDispatcher::spawn();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let deadline = Instant::now() + ms(50);

        for i in 0..5 {
            let tx = tx.clone();
            dispatcher.schedule_at(
                deadline,
                Box::new(move || {
                    let _ = tx.send(i);
                }),
            );
        }
        assert_eq!(dispatcher.pending(), 5);

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(rx.recv().await.expect("channel closed"));
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_deadline_submitted_later_runs_first() {
        let dispatcher = TokioDispatcher::spawn();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let now = Instant::now();

        for (label, offset) in [("late", 300), ("early", 100)] {
            let tx = tx.clone();
            dispatcher.schedule_at(
                now + ms(offset),
                Box::new(move || {
                    let _ = tx.send(label);
                }),
            );
        }

        assert_eq!(rx.recv().await, Some("early"));
        assert_eq!(rx.recv().await, Some("late"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending() {
        let dispatcher = TokioDispatcher::spawn();
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let tx2 = tx.clone();
        dispatcher.schedule_at(
            Instant::now() + Duration::from_secs(1),
            Box::new(move || {
                let _ = tx2.send(());
            }),
        );
        drop(tx);

        dispatcher.shutdown();
        assert!(dispatcher.is_shutdown());

        // The dropped action releases its sender, closing the channel.
        let result = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(matches!(result, Ok(None)));
        assert_eq!(dispatcher.pending(), 0);

        dispatcher.schedule_at(Instant::now(), Box::new(|| {}));
        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_queued_and_received_jobs() {
        let dispatcher = TokioDispatcher::spawn();
        let later = Instant::now() + Duration::from_secs(1);

        dispatcher.schedule_at(later, Box::new(|| {}));
        dispatcher.schedule_at(later, Box::new(|| {}));
        // let the worker move both into its heap
        tokio::time::sleep(ms(1)).await;
        dispatcher.schedule_at(later, Box::new(|| {}));
        assert_eq!(dispatcher.pending(), 3);

        dispatcher.shutdown();
        dispatcher.tx.closed().await;

        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_racing_shutdown_does_not_wrap_pending() {
        let dispatcher = TokioDispatcher::spawn();

        // A caller that passed the shutdown check and counted its job...
        dispatcher.pending.fetch_add(1, atomic::Ordering::SeqCst);

        // ...while the worker shuts down underneath it.
        dispatcher.shutdown();
        dispatcher.tx.closed().await;

        dispatcher.send_counted(Submission {
            deadline: Instant::now(),
            action: Box::new(|| {}),
        });

        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_run_after_handles_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let haptics = Haptics::new(TokioClock, TokioDispatcher::spawn(), ChannelBackend(tx));
            haptics
                .chain_after(ms(200))
                .selection_changed()
                .play();
        }

        let (kind, _) = rx.recv().await.expect("channel closed");
        assert_eq!(kind, EffectKind::SelectionChanged);
    }

    #[test]
    fn test_config_defaults_and_json() {
        let config = DispatcherConfig::default();
        assert_eq!(config.late_threshold(), ms(20));

        let config = DispatcherConfig::from_json(r#"{ "queue_capacity_hint": 8 }"#).unwrap();
        assert_eq!(config.queue_capacity_hint, 8);
        assert_eq!(config.late_threshold_ms, 20);

        assert!(DispatcherConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_job_heap_pops_earliest_first() {
        let base = Instant::now();
        let mut heap = BinaryHeap::new();
        for (seq, offset) in [(0, 30), (1, 10), (2, 10), (3, 20)] {
            heap.push(Job {
                deadline: base + ms(offset),
                seq,
                action: Box::new(|| {}),
            });
        }

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|job| job.seq)).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }
}
