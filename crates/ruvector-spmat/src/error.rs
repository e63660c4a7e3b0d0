//! Error types for the sparse-matrix crate.
//!
//! Every fallible operation reports one of the variants below synchronously,
//! at the call that detects the problem. All errors implement
//! `std::error::Error` via `thiserror`.
//!
//! Solver non-convergence is not an error: an iterative solve that
//! runs out of iterations still returns its best estimate (see
//! [`SolveReport`](crate::types::SolveReport)).

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpMatError>;

/// Which axis an out-of-range index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row index.
    Row,
    /// Column index.
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Primary error type for sparse-matrix operations.
#[derive(Debug, thiserror::Error)]
pub enum SpMatError {
    /// Operand shapes are incompatible (binary operations, solves against
    /// non-square matrices or wrongly sized vectors).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A row or column index lies outside the matrix.
    #[error("{axis} index {index} out of bounds for size {size}")]
    IndexOutOfBounds {
        /// Offending index (0-based).
        index: usize,
        /// Extent of the axis.
        size: usize,
        /// Axis the index refers to.
        axis: Axis,
    },

    /// Malformed compressed-column arrays or persisted text input.
    #[error("format error: {0}")]
    Format(String),

    /// A diagonal preconditioner was requested for a matrix with an exactly
    /// zero diagonal element.
    #[error("cannot precondition singular matrix: zero diagonal at index {index}")]
    SingularPreconditioner {
        /// Position of the first zero on the diagonal.
        index: usize,
    },

    /// A solver parameter is outside its valid range.
    #[error("parameter out of range: {name} = {value} (expected {expected})")]
    ParameterOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The invalid value, rendered as text.
        value: String,
        /// Human-readable description of the valid range.
        expected: String,
    },

    /// Reading or writing a persisted matrix failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpMatError {
    /// Shorthand for a row index error.
    pub(crate) fn row(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds {
            index,
            size,
            axis: Axis::Row,
        }
    }

    /// Shorthand for a column index error.
    pub(crate) fn column(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds {
            index,
            size,
            axis: Axis::Column,
        }
    }
}
