//! Error types for the reduction engine

use std::fmt;

/// Why a [`CancellationToken`](crate::CancellationToken) was triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelCause {
    /// Plain `cancel()` with no further explanation
    Requested,
    /// Caller-supplied reason passed to `cancel_with`
    Reason(String),
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Requested => f.write_str("cancellation requested"),
            CancelCause::Reason(reason) => f.write_str(reason),
        }
    }
}

/// The only failure a reduction can report.
///
/// Partitioning and wrapping summation are total, so cancellation is the sole
/// way a call can end without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReduceError {
    #[error("reduction cancelled: {0}")]
    Cancelled(CancelCause),
}

impl ReduceError {
    /// The cause carried by the cancellation signal
    pub fn cause(&self) -> &CancelCause {
        match self {
            ReduceError::Cancelled(cause) => cause,
        }
    }
}
