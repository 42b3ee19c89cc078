//! Time sources for effect chains

use std::fmt::Debug;
use std::time::Duration;

// Roughly 30 years, the same horizon tokio clamps far-off sleeps to.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Produces "now" and adds durations to time points.
///
/// The instant type is left to the implementation so that the same chain
/// logic runs against a real monotonic clock or a virtual one in tests.
pub trait Clock: Clone + Send + 'static {
    /// A point in time on this clock.
    type Instant: Copy + Ord + Debug + Send + 'static;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// `at + delay`, saturating at the latest instant the clock can
    /// represent instead of overflowing. Must be pure.
    fn add(&self, at: Self::Instant, delay: Duration) -> Self::Instant;
}

/// Monotonic clock backed by [`tokio::time::Instant`].
///
/// Honors paused time (`tokio::time::pause`), so chains built against it can
/// be tested with the `testing-time` helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    type Instant = tokio::time::Instant;

    #[inline]
    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn add(&self, at: Self::Instant, delay: Duration) -> Self::Instant {
        at.checked_add(delay)
            .or_else(|| at.checked_add(FAR_FUTURE))
            .unwrap_or(at)
    }
}
