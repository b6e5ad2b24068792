//! Re-exports the working set for convenient glob import.
//!
//! # Example
//! ```rust,no_run
//! use tripswitch::prelude::*;
//! ```

pub use crate::breaker::CircuitBreaker;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::BreakerBuilder;
pub use crate::error::{BreakerError, BreakerResult};
pub use crate::hook::HookRegistry;
pub use crate::metrics::{BreakerSnapshot, MetricSink, NullMetricSink};
pub use crate::state::State;
pub use crate::transport::{Operation, Response, Transport};
