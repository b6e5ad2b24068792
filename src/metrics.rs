//! Observability surface: metric sinks and breaker introspection.

use std::time::Duration;

use crate::state::State;

/// Trait for sinks that receive breaker events.
///
/// The breaker emits events from the calling thread, outside its lock.
/// Implementations fan out to whatever telemetry system the application
/// uses; the default [`NullMetricSink`] discards everything.
pub trait MetricSink: Send + Sync + 'static {
    /// Records a classification change driven by an observation or a reset.
    fn record_transition(&self, from: State, to: State);

    /// Records a completed transport call and its duration.
    fn record_call(&self, success: bool, duration: Duration);

    /// Records a call rejected without touching the transport.
    fn record_rejection(&self);

    /// Records a half-open trial decision: `admitted` is false when the
    /// single-trial gate turned the caller away.
    fn record_trial(&self, admitted: bool);
}

/// A metric sink that discards all events.
pub struct NullMetricSink;

impl MetricSink for NullMetricSink {
    fn record_transition(&self, _from: State, _to: State) {}
    fn record_call(&self, _success: bool, _duration: Duration) {}
    fn record_rejection(&self) {}
    fn record_trial(&self, _admitted: bool) {}
}

/// A point-in-time view of a breaker's derived state and counters.
///
/// Returned by [`CircuitBreaker::snapshot`](crate::CircuitBreaker::snapshot);
/// purely observational, reading it mutates nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    /// Classification at the moment the snapshot was taken.
    pub state: State,

    /// Failures recorded since the last reset.
    pub error_count: u32,

    /// Time since the most recent recorded failure, if any.
    pub since_last_failure: Option<Duration>,

    /// Time remaining until an open breaker becomes eligible for a trial
    /// call. `None` unless the breaker is open.
    pub retry_in: Option<Duration>,
}
