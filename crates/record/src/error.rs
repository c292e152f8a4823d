//! Error types for the authoritative record

use thiserror::Error;

/// Rejection reasons surfaced by the record. Every failed call leaves the
/// record untouched; a rejection is an outcome, not unchecked control flow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Caller does not hold the role the operation requires
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    /// Proposed price failed validation (must be strictly positive)
    #[error("proposed price must be positive")]
    InvalidPrice,

    /// Proposal arrived before the minimum update interval elapsed.
    /// Expected under bounded-rate operation during volatility spikes;
    /// a circuit breaker, not a malfunction.
    #[error("minimum update interval has not elapsed since the last accepted update")]
    RateLimited,

    /// Proposed change exceeds the configured magnitude bound, forcing
    /// convergence toward a new true price over several updates
    #[error("price change exceeds the configured maximum change rate")]
    ChangeExceedsBound,

    /// Change-rate configuration outside (0, 10000] basis points
    #[error("max change rate must be between 1 and 10000 basis points, got {0}")]
    InvalidChangeRate(u32),
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;
