//! Error type shared by every aggregator.
//!
//! Aggregation failures are local to the key being processed. They are
//! returned to the caller, which decides whether to retry the batch, fail
//! the key, or fail the job.

use thiserror::Error;

/// Errors raised by `combine`, `merge`, `finalize`, and the partial-state codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggError {
    /// The group has no values and the statistic is undefined for it.
    #[error("empty group: statistic is undefined without at least one value")]
    EmptyGroup,

    /// Vector-sum inputs of different lengths were seen for the same key.
    #[error("arity mismatch: expected tuples of length {expected}, found length {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// A selection comparison key was missing or could not be ordered.
    #[error("invalid comparison: {0}")]
    InvalidComparison(String),

    /// A raw value the statistic cannot absorb, such as `NaN` or an infinity.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An aggregator or runner parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A partial state could not be encoded or decoded.
    #[error("partial state codec error: {0}")]
    Codec(String),
}

/// Result alias used throughout the aggregation algebra.
pub type Result<T> = std::result::Result<T, AggError>;
