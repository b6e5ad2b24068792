//! The transport capability consumed by the breaker.
//!
//! The breaker never performs network I/O itself. It dispatches to a
//! [`Transport`] implementation, one method per [`Operation`] kind, and
//! inspects the returned [`Response`] status to decide success or failure.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// The kinds of calls a breaker can forward to its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A read-style call against the dependency.
    Get,

    /// A write-style call against the dependency.
    Post,
}

impl Operation {
    /// Every operation kind, in declaration order.
    pub const ALL: [Operation; 2] = [Operation::Get, Operation::Post];

    /// Lowercase wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Post => "post",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    /// Parses an operation name case-insensitively: `"GET"`, `"get"`, and
    /// `"Get"` all resolve to [`Operation::Get`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| s.eq_ignore_ascii_case(op.as_str()))
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

/// Error returned when parsing an operation name nobody recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(String);

impl Display for UnknownOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation \"{}\"; expected one of:", self.0)?;
        for op in Operation::ALL {
            write!(f, " {}", op)?;
        }
        Ok(())
    }
}

impl Error for UnknownOperation {}

/// A response from the protected dependency.
///
/// The status must be readable without further I/O; the breaker consults it
/// once per call to apply the success predicate.
pub trait Response {
    /// The status code of the response.
    fn status(&self) -> u16;
}

/// The capability that performs the actual call to the protected dependency.
///
/// Implementations are shared across every clone of the breaker, so they must
/// be `Send + Sync`. Timeouts belong here, not in the breaker: a transport
/// that hangs forever will hold up its caller, while one that errors out on
/// its own deadline surfaces as an ordinary failure observation.
pub trait Transport: Send + Sync + 'static {
    /// Response type returned by a completed call.
    type Response: Response;

    /// Error type raised when a call cannot complete.
    type Error: Error + Send + Sync + 'static;

    /// Performs a read-style call against `target`.
    fn get(&self, target: &str) -> Result<Self::Response, Self::Error>;

    /// Performs a write-style call against `target`.
    fn post(&self, target: &str) -> Result<Self::Response, Self::Error>;
}

impl<T: Transport> Transport for Arc<T> {
    type Response = T::Response;
    type Error = T::Error;

    fn get(&self, target: &str) -> Result<Self::Response, Self::Error> {
        (**self).get(target)
    }

    fn post(&self, target: &str) -> Result<Self::Response, Self::Error> {
        (**self).post(target)
    }
}
