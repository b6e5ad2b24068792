//! Builder-style configuration for breakers.

use std::sync::Arc;
use std::time::Duration;

use smallvec::SmallVec;

use crate::breaker::CircuitBreaker;
use crate::clock::{Clock, SystemClock};
use crate::hook::HookRegistry;
use crate::metrics::{MetricSink, NullMetricSink};
use crate::transport::{Operation, Transport};

pub(crate) type SuccessPredicate = dyn Fn(u16) -> bool + Send + Sync;

/// Everything a breaker is configured with, minus the transport.
pub(crate) struct Settings<C> {
    pub error_threshold: u32,
    pub time_window: Duration,
    pub operations: SmallVec<[Operation; 2]>,
    pub success: Arc<SuccessPredicate>,
    pub single_trial: bool,
    pub clock: C,
    pub metric_sink: Arc<dyn MetricSink>,
    pub hooks: Arc<HookRegistry>,
}

/// Builder for breakers with custom configuration.
///
/// Defaults: threshold 5, cooldown 30 seconds, all operation kinds enabled,
/// success meaning status 200, no half-open trial gating, the system clock,
/// and no metric sink or hooks.
pub struct BreakerBuilder<C = SystemClock>
where
    C: Clock,
{
    settings: Settings<C>,
}

impl Default for BreakerBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerBuilder<SystemClock> {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            settings: Settings {
                error_threshold: 5,
                time_window: Duration::from_secs(30),
                operations: SmallVec::from_slice(&Operation::ALL),
                success: Arc::new(|status| status == 200),
                single_trial: false,
                clock: SystemClock,
                metric_sink: Arc::new(NullMetricSink),
                hooks: Arc::new(HookRegistry::new()),
            },
        }
    }
}

impl<C> BreakerBuilder<C>
where
    C: Clock,
{
    /// Sets the number of accumulated failures that trips the breaker.
    pub fn error_threshold(mut self, threshold: u32) -> Self {
        self.settings.error_threshold = threshold;
        self
    }

    /// Sets the cooldown after which a tripped breaker admits a trial call.
    pub fn time_window(mut self, window: Duration) -> Self {
        self.settings.time_window = window;
        self
    }

    /// Restricts the breaker to the given operation kinds.
    ///
    /// Calls with a kind outside this set are rejected with
    /// [`BreakerError::Unsupported`](crate::BreakerError::Unsupported)
    /// before any state is touched.
    pub fn operations(mut self, kinds: impl IntoIterator<Item = Operation>) -> Self {
        self.settings.operations = kinds.into_iter().collect();
        self
    }

    /// Sets the single status code that counts as success.
    pub fn success_status(self, code: u16) -> Self {
        self.success_when(move |status| status == code)
    }

    /// Sets an arbitrary predicate over the response status.
    ///
    /// Statuses failing the predicate are recorded as breaker failures even
    /// though the transport call completed.
    pub fn success_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.settings.success = Arc::new(predicate);
        self
    }

    /// Gates the half-open state to one trial call in flight at a time.
    ///
    /// Off by default: without gating, every caller arriving after the
    /// cooldown window is admitted, which can herd onto a dependency that is
    /// still recovering.
    pub fn single_trial(mut self, gated: bool) -> Self {
        self.settings.single_trial = gated;
        self
    }

    /// Replaces the time source used for window arithmetic.
    pub fn clock<D: Clock>(self, clock: D) -> BreakerBuilder<D> {
        BreakerBuilder {
            settings: Settings {
                error_threshold: self.settings.error_threshold,
                time_window: self.settings.time_window,
                operations: self.settings.operations,
                success: self.settings.success,
                single_trial: self.settings.single_trial,
                clock,
                metric_sink: self.settings.metric_sink,
                hooks: self.settings.hooks,
            },
        }
    }

    /// Sets a metric sink receiving breaker events.
    pub fn metric_sink<M: MetricSink>(mut self, sink: M) -> Self {
        self.settings.metric_sink = Arc::new(sink);
        self
    }

    /// Sets the hook registry fired on breaker events.
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.settings.hooks = Arc::new(hooks);
        self
    }

    /// Builds a breaker guarding the given transport.
    pub fn build<T: Transport>(self, transport: T) -> CircuitBreaker<T, C> {
        CircuitBreaker::from_settings(transport, self.settings)
    }
}
