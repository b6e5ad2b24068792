//! Hook wiring and detailed failure causes.
//!
//! Demonstrates:
//! 1. Registering hooks for breaker events
//! 2. Driving the cooldown window with a manual clock instead of sleeping
//! 3. Surfacing failure causes with `try_call`
//! 4. Gating the half-open state to a single trial call

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tripswitch::{
    BreakerBuilder, BreakerError, HookRegistry, ManualClock, Operation, Response, Transport,
};

struct Reply(u16);

impl Response for Reply {
    fn status(&self) -> u16 {
        self.0
    }
}

#[derive(Debug)]
struct ServiceError(&'static str);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service error: {}", self.0)
    }
}

impl Error for ServiceError {}

/// A transport whose next status is set by the demo script; 0 means the
/// call itself fails.
struct ScriptedService {
    status: AtomicU16,
}

impl Transport for ScriptedService {
    type Response = Reply;
    type Error = ServiceError;

    fn get(&self, _target: &str) -> Result<Reply, ServiceError> {
        match self.status.load(Ordering::SeqCst) {
            0 => Err(ServiceError("connection refused")),
            status => Ok(Reply(status)),
        }
    }

    fn post(&self, target: &str) -> Result<Reply, ServiceError> {
        self.get(target)
    }
}

fn report(result: Result<Reply, BreakerError<ServiceError>>) {
    match result {
        Ok(reply) => println!("  -> success, status {}", reply.status()),
        Err(BreakerError::Open) => println!("  -> breaker open, call not attempted"),
        Err(BreakerError::Status(code)) => println!("  -> dependency answered {}", code),
        Err(BreakerError::Transport(cause)) => println!("  -> dependency failed: {}", cause),
        Err(err) => println!("  -> {}", err),
    }
}

fn main() {
    let hooks = HookRegistry::new();
    hooks.set_on_open(|| println!("[hook] breaker OPENED"));
    hooks.set_on_close(|| println!("[hook] breaker CLOSED"));
    hooks.set_on_half_open(|| println!("[hook] trial call admitted"));
    hooks.set_on_success(|| println!("[hook] call succeeded"));
    hooks.set_on_failure(|| println!("[hook] call failed"));

    let clock = ManualClock::new();
    let service = Arc::new(ScriptedService {
        status: AtomicU16::new(200),
    });
    let breaker = BreakerBuilder::new()
        .error_threshold(3)
        .time_window(Duration::from_secs(2))
        .single_trial(true)
        .hooks(hooks)
        .clock(clock.clone())
        .build(Arc::clone(&service));

    println!("initial state: {}\n", breaker.current_state());

    println!("two healthy calls:");
    for _ in 0..2 {
        report(breaker.try_call(Operation::Get, "svc://billing"));
    }

    println!("\nthe dependency starts answering 503:");
    service.status.store(503, Ordering::SeqCst);
    for _ in 0..2 {
        report(breaker.try_call(Operation::Get, "svc://billing"));
    }

    println!("\nthen stops answering at all:");
    service.status.store(0, Ordering::SeqCst);
    report(breaker.try_call(Operation::Get, "svc://billing"));

    println!("\nthe breaker is now {}; further calls are shed:", breaker.current_state());
    report(breaker.try_call(Operation::Get, "svc://billing"));

    println!("\nadvancing the clock past the cooldown window...");
    clock.advance(Duration::from_secs(2));
    println!("state is now {}", breaker.current_state());

    println!("\nthe dependency has recovered; the trial call closes the breaker:");
    service.status.store(200, Ordering::SeqCst);
    report(breaker.try_call(Operation::Get, "svc://billing"));

    let snap = breaker.snapshot();
    println!(
        "\nfinal snapshot: state={} errors={} since_last_failure={:?}",
        snap.state, snap.error_count, snap.since_last_failure
    );
}
