//! Property checks over the breaker's state arithmetic.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tripswitch::{
    BreakerBuilder, BreakerError, CircuitBreaker, ManualClock, Operation, Response, State,
    Transport,
};

#[derive(Debug)]
struct Reply(u16);

impl Response for Reply {
    fn status(&self) -> u16 {
        self.0
    }
}

#[derive(Debug)]
struct StubError;

impl fmt::Display for StubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stub transport error")
    }
}

impl Error for StubError {}

struct ScriptedTransport {
    status: AtomicU16,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn returning(status: u16) -> Self {
        Self {
            status: AtomicU16::new(status),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Transport for ScriptedTransport {
    type Response = Reply;
    type Error = StubError;

    fn get(&self, _target: &str) -> Result<Reply, StubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Reply(self.status.load(Ordering::SeqCst)))
    }

    fn post(&self, target: &str) -> Result<Reply, StubError> {
        self.get(target)
    }
}

fn breaker_with(
    threshold: u32,
    window: Duration,
    status: u16,
) -> (CircuitBreaker<Arc<ScriptedTransport>, ManualClock>, ManualClock, Arc<ScriptedTransport>) {
    let clock = ManualClock::new();
    let transport = Arc::new(ScriptedTransport::returning(status));
    let breaker = BreakerBuilder::new()
        .error_threshold(threshold)
        .time_window(window)
        .clock(clock.clone())
        .build(Arc::clone(&transport));
    (breaker, clock, transport)
}

proptest! {
    // Any number of successes leaves the breaker closed with a zero count.
    #[test]
    fn successes_never_accumulate(count in 0usize..200, threshold in 1u32..50) {
        let (breaker, _, _) = breaker_with(threshold, Duration::from_secs(4), 200);
        for _ in 0..count {
            prop_assert!(breaker.call(Operation::Get, "svc://dep").unwrap().is_some());
        }
        prop_assert_eq!(breaker.error_count(), 0);
        prop_assert_eq!(breaker.current_state(), State::Closed);
    }

    // Fewer failures than the threshold never trip the breaker.
    #[test]
    fn failures_below_threshold_never_trip(threshold in 1u32..50) {
        let (breaker, _, _) = breaker_with(threshold, Duration::from_secs(4), 500);
        for _ in 0..threshold - 1 {
            prop_assert!(breaker.call(Operation::Get, "svc://dep").unwrap().is_none());
            prop_assert_eq!(breaker.current_state(), State::Closed);
        }
        prop_assert_eq!(breaker.error_count(), threshold - 1);
    }

    // At the threshold the breaker opens, and stays open for any elapsed
    // time short of the window; rejected calls never reach the transport.
    #[test]
    fn open_holds_until_the_window(
        threshold in 1u32..20,
        window_ms in 2u64..10_000,
        elapsed_fraction in 0.0f64..1.0,
    ) {
        let window = Duration::from_millis(window_ms);
        let (breaker, clock, transport) = breaker_with(threshold, window, 500);
        for _ in 0..threshold {
            let _ = breaker.call(Operation::Get, "svc://dep");
        }
        prop_assert_eq!(breaker.current_state(), State::Open);

        let short = Duration::from_millis((window_ms as f64 * elapsed_fraction) as u64);
        if short < window {
            clock.advance(short);
            let calls_before = transport.calls.load(Ordering::SeqCst);
            let err = breaker.call(Operation::Get, "svc://dep").unwrap_err();
            prop_assert!(matches!(err, BreakerError::Open));
            prop_assert_eq!(transport.calls.load(Ordering::SeqCst), calls_before);
            prop_assert_eq!(breaker.current_state(), State::Open);
        }
    }

    // Once the window has fully elapsed the breaker is half-open, never
    // still open, whatever the failure history was.
    #[test]
    fn window_elapse_always_half_opens(threshold in 1u32..20, extra_failures in 0u32..20) {
        let window = Duration::from_secs(4);
        let (breaker, clock, _) = breaker_with(threshold, window, 500);
        for _ in 0..threshold + extra_failures {
            let _ = breaker.call(Operation::Get, "svc://dep");
            clock.advance(window);
        }
        prop_assert_eq!(breaker.current_state(), State::HalfOpen);
    }

    // A single success erases any prior failure history.
    #[test]
    fn one_success_restores_closed(threshold in 1u32..20, failures in 0u32..40) {
        let window = Duration::from_secs(4);
        let (breaker, clock, transport) = breaker_with(threshold, window, 500);
        for _ in 0..failures {
            let _ = breaker.call(Operation::Get, "svc://dep");
            // Step past the window so the next call is always admitted.
            clock.advance(window);
        }

        transport.status.store(200, Ordering::SeqCst);
        prop_assert!(breaker.call(Operation::Get, "svc://dep").unwrap().is_some());
        prop_assert_eq!(breaker.error_count(), 0);
        prop_assert_eq!(breaker.current_state(), State::Closed);
    }

    // Unsupported kinds are rejected purely, whatever state the breaker is in.
    #[test]
    fn unsupported_kind_never_mutates(failures in 0u32..10) {
        let clock = ManualClock::new();
        let transport = Arc::new(ScriptedTransport::returning(500));
        let breaker = BreakerBuilder::new()
            .error_threshold(5)
            .time_window(Duration::from_secs(4))
            .operations([Operation::Get])
            .clock(clock.clone())
            .build(Arc::clone(&transport));

        for _ in 0..failures {
            let _ = breaker.call(Operation::Get, "svc://dep");
        }
        let count_before = breaker.error_count();
        let state_before = breaker.current_state();
        let calls_before = transport.calls.load(Ordering::SeqCst);

        let err = breaker.call(Operation::Post, "svc://dep").unwrap_err();
        let is_unsupported = matches!(err, BreakerError::Unsupported { .. });
        prop_assert!(is_unsupported);
        prop_assert_eq!(breaker.error_count(), count_before);
        prop_assert_eq!(breaker.current_state(), state_before);
        prop_assert_eq!(transport.calls.load(Ordering::SeqCst), calls_before);
    }
}
