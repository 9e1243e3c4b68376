//! Error types for ranker configuration.

use thiserror::Error;

/// Errors raised while building a [`RankerConfig`](crate::RankerConfig).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RankerConfigError {
    /// The reference maximum was zero, negative or not finite.
    #[error("reference maximum must be finite and greater than zero, got {value}")]
    InvalidReferenceMax {
        /// Rejected value.
        value: f64,
    },
    /// The ranking size was zero.
    #[error("top-N must be at least 1")]
    ZeroTopN,
}
