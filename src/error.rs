//! Error types for vecsim.

use thiserror::Error;

/// Errors that can occur during index construction, insertion, or search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VecSimError {
    /// Vector length differs from the index dimensionality.
    #[error("dimension mismatch: index expects {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The external id already has a live vector bound to it.
    #[error("id {0} already has an active vector")]
    DuplicateActiveId(u64),

    /// Storage could not grow to hold `requested` vectors.
    #[error("out of capacity: could not grow storage to {requested} vectors")]
    OutOfCapacity { requested: usize },

    /// Invalid construction or runtime parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, VecSimError>;
