// Copyright (C) 2026 The etalu developers

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from invalid arguments and configuration.
///
/// Numerical outcomes of updates are not errors; they are reported as
/// [`Status`](crate::Status).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration value is outside its valid range. The previous value
    /// is kept.
    #[error("invalid value {value} for parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
        /// Valid range
        reason: &'static str,
    },

    /// Dimensions of an argument do not fit the factorization.
    #[error("dimension mismatch for '{arg}': expected {expected}, got {got}")]
    DimensionMismatch {
        /// Argument name
        arg: &'static str,
        /// Required dimension
        expected: usize,
        /// Actual dimension
        got: usize,
    },

    /// The basis matrix is numerically singular. `position` is the basis
    /// column found to be dependent on the columns factorized before it.
    #[error("basis is singular: column {position} is dependent")]
    SingularBasis {
        /// Basis position of the dependent column
        position: usize,
    },

    /// A row passed to a maintenance operation does not qualify.
    #[error("row {row} cannot be modified: {reason}")]
    InvalidRow {
        /// Pivot row
        row: usize,
        /// Why the row was rejected
        reason: &'static str,
    },

    /// The operation requires a factorization.
    #[error("no factorization available")]
    NotFactorized,
}
