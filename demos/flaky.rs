//! Scripted outage and recovery against a flaky stub transport.
//!
//! Walks a full outage cycle: three successes, five failures that trip the
//! breaker, one rejected call, the cooldown window, and free-flowing
//! traffic after recovery. Run with `RUST_LOG=debug` to see the breaker's
//! own transition events.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripswitch::{CircuitBreaker, Operation, Response, Transport};

struct Reply(u16);

impl Response for Reply {
    fn status(&self) -> u16 {
        self.0
    }
}

#[derive(Debug)]
struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request timed out")
    }
}

impl Error for TimedOut {}

// Mode switch for the stub: random outcomes, always fail, always succeed.
const RANDOM: u8 = 0;
const FAIL: u8 = 1;
const SUCCEED: u8 = 2;

struct FlakyTransport {
    mode: AtomicU8,
}

impl FlakyTransport {
    fn new() -> Self {
        Self {
            mode: AtomicU8::new(RANDOM),
        }
    }

    fn set_mode(&self, mode: u8) {
        self.mode.store(mode, Ordering::SeqCst);
    }

    fn respond(&self) -> Result<Reply, TimedOut> {
        println!("sending request");
        let mut rng = rand::thread_rng();
        let roll = match self.mode.load(Ordering::SeqCst) {
            RANDOM => rng.gen_range(0..3),
            FAIL => rng.gen_range(1..3),
            _ => 0,
        };
        match roll {
            0 => Ok(Reply(200)),
            1 => Ok(Reply(404)),
            _ => Err(TimedOut),
        }
    }
}

impl Transport for FlakyTransport {
    type Response = Reply;
    type Error = TimedOut;

    fn get(&self, _target: &str) -> Result<Reply, TimedOut> {
        self.respond()
    }

    fn post(&self, _target: &str) -> Result<Reply, TimedOut> {
        self.respond()
    }
}

fn exercise(
    breaker: &CircuitBreaker<Arc<FlakyTransport>>,
    target: &str,
) -> Result<(), Box<dyn Error>> {
    let op = if rand::thread_rng().gen_bool(0.5) {
        Operation::Get
    } else {
        Operation::Post
    };

    match breaker.call(op, target)? {
        Some(reply) => println!("{} {} -> {}", op, target, reply.status()),
        None => println!("{} {} -> no data (failure absorbed)", op, target),
    }

    let snap = breaker.snapshot();
    println!(
        "breaker: state={} errors={} since_last_failure={:?}\n",
        snap.state, snap.error_count, snap.since_last_failure
    );
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let target = "https://example.com/orders";
    let window = Duration::from_secs(4);
    let transport = Arc::new(FlakyTransport::new());
    let breaker = CircuitBreaker::new(Arc::clone(&transport), 5, window);

    // Three successful requests.
    transport.set_mode(SUCCEED);
    for _ in 0..3 {
        let _ = exercise(&breaker, target);
    }

    // Five failures trip the breaker.
    transport.set_mode(FAIL);
    for _ in 0..5 {
        let _ = exercise(&breaker, target);
    }

    // The next call is rejected without touching the transport.
    if let Err(err) = exercise(&breaker, target) {
        println!("call refused: {}\n", err);
    }

    println!("waiting {:?} for the cooldown window", window);
    thread::sleep(window);
    let snap = breaker.snapshot();
    println!(
        "open: {}, half-open: {}, closed: {}\n",
        snap.state.is_open(),
        snap.state.is_half_open(),
        snap.state.is_closed()
    );

    // A success closes the breaker; traffic flows freely afterwards.
    transport.set_mode(SUCCEED);
    for _ in 0..10 {
        if let Err(err) = exercise(&breaker, target) {
            println!("call refused: {}\n", err);
        }
        transport.set_mode(RANDOM);
    }
}
