//! The breaker core: admission, dispatch, and failure accounting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{BreakerBuilder, Settings};
use crate::error::{BreakerError, BreakerResult};
use crate::metrics::BreakerSnapshot;
use crate::state::{classify, State};
use crate::transport::{Operation, Response, Transport};

/// The mutable counter pair, plus the half-open trial gate.
///
/// One lock guards all three: classification reads the pair, admission may
/// set the gate, and outcome recording writes the pair. The transport call
/// itself happens with the lock released.
#[derive(Debug, Default)]
struct Counters {
    error_count: u32,
    last_failure: Option<Instant>,
    trial_in_flight: bool,
}

struct BreakerInner<T, C>
where
    T: Transport,
    C: Clock,
{
    transport: T,
    settings: Settings<C>,
    counters: Mutex<Counters>,
}

/// A circuit breaker guarding calls to a single logical dependency.
///
/// The breaker stores no state tag; every inquiry reclassifies from the
/// failure count, the last failure time, and the clock. Cloning is cheap and
/// yields a handle to the same breaker, so one instance can guard a
/// dependency across threads.
pub struct CircuitBreaker<T, C = SystemClock>
where
    T: Transport,
    C: Clock,
{
    inner: Arc<BreakerInner<T, C>>,
}

impl<T> CircuitBreaker<T, SystemClock>
where
    T: Transport,
{
    /// Creates a breaker with the given threshold and cooldown window and
    /// default settings otherwise.
    pub fn new(transport: T, error_threshold: u32, time_window: Duration) -> Self {
        BreakerBuilder::new()
            .error_threshold(error_threshold)
            .time_window(time_window)
            .build(transport)
    }

    /// Creates a builder for customizing a breaker.
    pub fn builder() -> BreakerBuilder<SystemClock> {
        BreakerBuilder::new()
    }
}

impl<T, C> CircuitBreaker<T, C>
where
    T: Transport,
    C: Clock,
{
    pub(crate) fn from_settings(transport: T, settings: Settings<C>) -> Self {
        Self {
            inner: Arc::new(BreakerInner {
                transport,
                settings,
                counters: Mutex::new(Counters::default()),
            }),
        }
    }

    /// Issues a guarded call, absorbing dependency failures.
    ///
    /// Returns `Ok(Some(response))` on success, the sentinel `Ok(None)` when
    /// the transport failed or returned a non-success status (the failure is
    /// recorded against the breaker, not propagated), and an error only when
    /// the breaker itself refused the call. Callers that need the failure
    /// cause use [`try_call`](Self::try_call) instead.
    pub fn call(
        &self,
        op: Operation,
        target: &str,
    ) -> BreakerResult<Option<T::Response>, T::Error> {
        match self.try_call(op, target) {
            Ok(response) => Ok(Some(response)),
            Err(BreakerError::Transport(_)) | Err(BreakerError::Status(_)) => Ok(None),
            Err(rejected) => Err(rejected),
        }
    }

    /// Issues a guarded call, surfacing the failure cause.
    ///
    /// State accounting is identical to [`call`](Self::call); the difference
    /// is purely in what the caller sees. A failed transport call yields
    /// [`BreakerError::Transport`], a completed call with a non-success
    /// status yields [`BreakerError::Status`], and both are recorded as
    /// breaker failures before returning.
    pub fn try_call(&self, op: Operation, target: &str) -> BreakerResult<T::Response, T::Error> {
        if !self.inner.settings.operations.contains(&op) {
            return Err(BreakerError::Unsupported {
                requested: op,
                supported: self.inner.settings.operations.to_vec(),
            });
        }

        let trial = self.admit(op)?;
        let _gate = trial.then(|| TrialGuard {
            counters: &self.inner.counters,
        });

        let started = Instant::now();
        let outcome = match op {
            Operation::Get => self.inner.transport.get(target),
            Operation::Post => self.inner.transport.post(target),
        };
        let elapsed = started.elapsed();

        match outcome {
            Ok(response) if (self.inner.settings.success)(response.status()) => {
                self.record_outcome(true);
                self.inner.settings.metric_sink.record_call(true, elapsed);
                Ok(response)
            }
            Ok(response) => {
                self.record_outcome(false);
                self.inner.settings.metric_sink.record_call(false, elapsed);
                Err(BreakerError::Status(response.status()))
            }
            Err(cause) => {
                self.record_outcome(false);
                self.inner.settings.metric_sink.record_call(false, elapsed);
                Err(BreakerError::Transport(cause))
            }
        }
    }

    /// Admission check: one critical section over the counter pair.
    ///
    /// Returns whether the admitted call is a half-open trial. Hooks and
    /// metrics fire after the lock is released.
    fn admit(&self, op: Operation) -> Result<bool, BreakerError<T::Error>> {
        let settings = &self.inner.settings;
        let now = settings.clock.now();

        let mut counters = self.inner.counters.lock();
        let state = classify(
            counters.error_count,
            settings.error_threshold,
            counters.last_failure,
            settings.time_window,
            now,
        );

        match state {
            State::Closed => Ok(false),
            State::Open => {
                drop(counters);
                debug!(op = %op, "call rejected while open");
                settings.metric_sink.record_rejection();
                Err(BreakerError::Open)
            }
            State::HalfOpen => {
                if settings.single_trial && counters.trial_in_flight {
                    drop(counters);
                    debug!(op = %op, "trial already in flight, rejecting");
                    settings.metric_sink.record_trial(false);
                    settings.metric_sink.record_rejection();
                    return Err(BreakerError::Open);
                }
                counters.trial_in_flight = true;
                drop(counters);
                debug!(op = %op, "half-open, admitting trial call");
                settings.metric_sink.record_trial(true);
                settings.hooks.fire_transition(State::HalfOpen);
                Ok(true)
            }
        }
    }

    /// Records a call outcome: the second critical section.
    ///
    /// A success zeroes both counters (full recovery, not decay); a failure
    /// bumps the count and stamps the failure time. Transition hooks and
    /// metrics fire when the outcome changed the classification.
    fn record_outcome(&self, success: bool) {
        let settings = &self.inner.settings;
        let now = settings.clock.now();

        let mut counters = self.inner.counters.lock();
        let before = classify(
            counters.error_count,
            settings.error_threshold,
            counters.last_failure,
            settings.time_window,
            now,
        );

        if success {
            counters.error_count = 0;
            counters.last_failure = None;
        } else {
            counters.error_count = counters.error_count.saturating_add(1);
            counters.last_failure = Some(now);
        }

        let after = classify(
            counters.error_count,
            settings.error_threshold,
            counters.last_failure,
            settings.time_window,
            now,
        );
        let error_count = counters.error_count;
        drop(counters);

        if success {
            settings.hooks.fire_success();
            if before != State::Closed && after == State::Closed {
                info!(from = %before, "breaker closed after successful call");
                settings.hooks.fire_transition(State::Closed);
                settings.metric_sink.record_transition(before, State::Closed);
            }
        } else {
            settings.hooks.fire_failure();
            if before != State::Open && after == State::Open {
                warn!(error_count, from = %before, "breaker tripped open");
                settings.hooks.fire_transition(State::Open);
                settings.metric_sink.record_transition(before, State::Open);
            }
        }
    }

    /// Forces the breaker closed by zeroing all failure accounting.
    ///
    /// Never fails. Fires close-side hooks and metrics when the breaker was
    /// not already closed.
    pub fn reset(&self) {
        let settings = &self.inner.settings;
        let now = settings.clock.now();

        let mut counters = self.inner.counters.lock();
        let before = classify(
            counters.error_count,
            settings.error_threshold,
            counters.last_failure,
            settings.time_window,
            now,
        );
        counters.error_count = 0;
        counters.last_failure = None;
        counters.trial_in_flight = false;
        drop(counters);

        if before != State::Closed {
            info!(from = %before, "breaker reset to closed");
            settings.hooks.fire_transition(State::Closed);
            settings.metric_sink.record_transition(before, State::Closed);
        }
    }

    /// Returns the current classification. No side effects.
    pub fn current_state(&self) -> State {
        let settings = &self.inner.settings;
        let now = settings.clock.now();
        let counters = self.inner.counters.lock();
        classify(
            counters.error_count,
            settings.error_threshold,
            counters.last_failure,
            settings.time_window,
            now,
        )
    }

    /// Returns the number of failures recorded since the last reset.
    pub fn error_count(&self) -> u32 {
        self.inner.counters.lock().error_count
    }

    /// Returns a point-in-time view of the breaker's derived state.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let settings = &self.inner.settings;
        let now = settings.clock.now();
        let counters = self.inner.counters.lock();

        let state = classify(
            counters.error_count,
            settings.error_threshold,
            counters.last_failure,
            settings.time_window,
            now,
        );
        let since_last_failure = counters
            .last_failure
            .map(|at| now.saturating_duration_since(at));
        let retry_in = match (state, since_last_failure) {
            (State::Open, Some(elapsed)) => Some(settings.time_window - elapsed),
            _ => None,
        };

        BreakerSnapshot {
            state,
            error_count: counters.error_count,
            since_last_failure,
            retry_in,
        }
    }
}

// Cloning shares the breaker: all clones see one counter pair.
impl<T, C> Clone for CircuitBreaker<T, C>
where
    T: Transport,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the half-open trial gate when the trial resolves, including by
/// unwind, so a panicking transport cannot wedge a single-trial breaker.
struct TrialGuard<'a> {
    counters: &'a Mutex<Counters>,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        self.counters.lock().trial_in_flight = false;
    }
}
