//! Error types for guarded calls.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::transport::Operation;

/// Result type for guarded calls, generic over the transport's error type.
pub type BreakerResult<V, E> = Result<V, BreakerError<E>>;

/// Errors a guarded call can surface to the caller.
///
/// Only `Open` and `Unsupported` cross the breaker boundary from
/// [`CircuitBreaker::call`](crate::CircuitBreaker::call); dependency-level
/// failures are absorbed into the sentinel `Ok(None)` there. The
/// `Transport` and `Status` variants carry the absorbed cause and are
/// produced by [`try_call`](crate::CircuitBreaker::try_call) only.
#[derive(Debug)]
pub enum BreakerError<E> {
    /// The breaker is open; the call was rejected without touching the
    /// transport.
    Open,

    /// The requested operation kind is not enabled on this breaker. Raised
    /// before any state inspection; never counted as a failure.
    Unsupported {
        /// The kind the caller asked for.
        requested: Operation,
        /// The kinds this breaker accepts.
        supported: Vec<Operation>,
    },

    /// The transport call itself failed.
    Transport(E),

    /// The transport returned a response whose status failed the success
    /// predicate.
    Status(u16),
}

impl<E> Display for BreakerError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BreakerError::Open => write!(f, "circuit breaker is open"),
            BreakerError::Unsupported {
                requested,
                supported,
            } => {
                write!(f, "unsupported operation \"{}\"; enabled:", requested)?;
                for op in supported {
                    write!(f, " {}", op)?;
                }
                Ok(())
            }
            BreakerError::Transport(e) => write!(f, "transport call failed: {}", e),
            BreakerError::Status(code) => {
                write!(f, "transport returned non-success status {}", code)
            }
        }
    }
}

impl<E: Error + 'static> Error for BreakerError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BreakerError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
