//! # Core Error Types
//!
//! Errors raised by the signal-processing layer. Estimation itself never
//! fails (insufficient history falls back to defaults); errors here are
//! limited to invalid parameterization.

use thiserror::Error;

/// Core signal-processor errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid weight bounds for {asset}: {reason}")]
    InvalidWeightBounds { asset: &'static str, reason: String },

    #[error("weight bounds are infeasible: sum of minimums {min_sum} and maximums {max_sum} must bracket 1.0")]
    InfeasibleWeightBounds { min_sum: f64, max_sum: f64 },

    #[error("history capacity must be greater than zero")]
    ZeroCapacity,
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
