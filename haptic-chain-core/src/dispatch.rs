//! Deferred execution of scheduled effects

/// A zero-argument action handed to a [`Dispatcher`].
pub type ScheduledAction = Box<dyn FnOnce() + Send + 'static>;

/// Runs actions no earlier than a given time point.
///
/// Implementations must be non-blocking and fire-and-forget: `schedule_at`
/// returns immediately and gives the caller no handle to the pending work.
/// Actions with equal or ascending deadlines that were scheduled in call
/// order must run in that same order.
pub trait Dispatcher<T>: Clone + Send + 'static {
    /// Queue `action` to run at or after `deadline`.
    fn schedule_at(&self, deadline: T, action: ScheduledAction);
}
