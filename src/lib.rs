//! # tripswitch
//!
//! A circuit breaker that guards calls to an unreliable remote dependency:
//! it counts recent failures and, once a threshold is crossed, rejects new
//! calls for a cooldown window — failing fast for the caller and shedding
//! load from the dependency.
//!
//! ## States
//!
//! - **Closed**: normal operation, calls pass through to the transport.
//! - **Open**: the threshold was crossed inside the window; calls are
//!   rejected without touching the transport.
//! - **Half-Open**: the cooldown has elapsed; the next call is a trial that
//!   probes whether the dependency has recovered.
//!
//! The state is never stored. It is derived on every inquiry from the
//! failure count, the last failure time, and an injectable clock, so a
//! breaker can never drift out of sync with the wall clock.
//!
//! ## Basic Usage
//!
//! The breaker consumes a [`Transport`] capability — one method per
//! [`Operation`] kind, returning a [`Response`] with an inspectable status:
//!
//! ```rust
//! use std::time::Duration;
//! use tripswitch::{CircuitBreaker, Operation, Response, Transport};
//!
//! struct Reply(u16);
//!
//! impl Response for Reply {
//!     fn status(&self) -> u16 {
//!         self.0
//!     }
//! }
//!
//! struct Client;
//!
//! impl Transport for Client {
//!     type Response = Reply;
//!     type Error = std::io::Error;
//!
//!     fn get(&self, _target: &str) -> Result<Reply, Self::Error> {
//!         Ok(Reply(200))
//!     }
//!
//!     fn post(&self, _target: &str) -> Result<Reply, Self::Error> {
//!         Ok(Reply(200))
//!     }
//! }
//!
//! let breaker = CircuitBreaker::new(Client, 5, Duration::from_secs(4));
//!
//! match breaker.call(Operation::Get, "https://example.com/health") {
//!     Ok(Some(reply)) => println!("status {}", reply.status()),
//!     Ok(None) => println!("dependency failed, failure recorded"),
//!     Err(err) => println!("call refused: {}", err),
//! }
//! ```
//!
//! `call` absorbs dependency failures into the sentinel `Ok(None)`,
//! mirroring callers that only care whether data came back. Callers that
//! need the cause use [`CircuitBreaker::try_call`], which surfaces
//! [`BreakerError::Transport`] and [`BreakerError::Status`] instead.
//!
//! ## Configuration
//!
//! [`BreakerBuilder`] configures the threshold, the cooldown window, the
//! enabled operation kinds, the success predicate (default: status 200),
//! optional single-trial gating of the half-open state, an injectable
//! [`Clock`], and observability via [`HookRegistry`] and [`MetricSink`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod breaker;
mod clock;
mod config;
mod error;
mod hook;
mod metrics;
pub mod prelude;
mod state;
mod transport;

pub use breaker::CircuitBreaker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BreakerBuilder;
pub use error::{BreakerError, BreakerResult};
pub use hook::HookRegistry;
pub use metrics::{BreakerSnapshot, MetricSink, NullMetricSink};
pub use state::State;
pub use transport::{Operation, Response, Transport, UnknownOperation};
