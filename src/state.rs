//! Breaker state classification.

use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant};

/// Represents the possible states of a circuit breaker.
///
/// The state is never stored; it is recomputed from the failure counters and
/// the clock on every inquiry, so there is no stored-state/wall-clock drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Circuit is closed and calls pass through to the transport.
    Closed,

    /// Circuit is open and calls are rejected without touching the transport.
    Open,

    /// Cooldown has elapsed; the next call is a trial to probe recovery.
    HalfOpen,
}

impl State {
    /// Returns `true` if the breaker is rejecting calls.
    pub fn is_open(self) -> bool {
        self == State::Open
    }

    /// Returns `true` if the breaker is eligible to admit a trial call.
    pub fn is_half_open(self) -> bool {
        self == State::HalfOpen
    }

    /// Returns `true` if calls flow through normally.
    pub fn is_closed(self) -> bool {
        self == State::Closed
    }

    /// Stable label for metric sinks and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::Open => "open",
            State::HalfOpen => "half-open",
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies breaker state from the counter pair and the current time.
///
/// Exactly one classification holds for any input: below the threshold the
/// breaker is Closed regardless of timing; at or above it, the breaker is
/// Open inside the cooldown window and Half-Open once the window has
/// elapsed. An unset `last_failure` counts as infinitely long ago, so a
/// breaker at threshold with no recorded failure classifies Half-Open.
pub(crate) fn classify(
    error_count: u32,
    error_threshold: u32,
    last_failure: Option<Instant>,
    time_window: Duration,
    now: Instant,
) -> State {
    if error_count < error_threshold {
        return State::Closed;
    }

    match last_failure {
        Some(at) if now.saturating_duration_since(at) < time_window => State::Open,
        _ => State::HalfOpen,
    }
}
