//! Fault injection errors
//!
//! Configuration errors are only ever produced while building a [`Fault`] or
//! an injector. Request-time outcomes that end a request without a response
//! are reported through [`FaultError`].
//!
//! [`Fault`]: crate::Fault

use chrono::TimeDelta;
use thiserror::Error;

/// Boxed error type used by the fault middleware and its continuations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Invalid fault or injector configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No injector was configured
    #[error("No injector configured")]
    MissingInjector,

    /// Percent of requests outside [0, 100]
    #[error("Percent of requests must be within [0, 100], got {0}")]
    InvalidPercent(f64),

    /// Status code without a standard meaning
    #[error("Invalid HTTP status code: {0}")]
    InvalidStatusCode(u16),

    /// Negative slow-down delay
    #[error("Delay must not be negative, got {0}")]
    NegativeDelay(TimeDelta),

    /// Chain without any injectors
    #[error("Chain must contain at least one injector")]
    EmptyChain,
}

/// Request-time outcomes that leave the request without a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultError {
    /// The request was rejected and no response will be written
    #[error("Request rejected by fault injection")]
    Rejected,

    /// The request was cancelled while an injected delay was pending
    #[error("Request cancelled during injected delay")]
    Cancelled,
}

impl FaultError {
    /// Find a fault error inside a boxed service error
    pub fn from_boxed(err: &BoxError) -> Option<Self> {
        err.downcast_ref::<Self>().copied()
    }
}
