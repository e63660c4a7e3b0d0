//! Operator and preconditioner seams for the iterative solvers.
//!
//! [`cg`](crate::cg::cg) and [`bicg`](crate::bicg::bicg) only talk to these
//! traits, so external solver code can drive them with any operator, not just
//! a [`SpMat`].

use crate::error::{Result, SpMatError};
use crate::types::Element;
use crate::SpMat;

/// A linear map `A` with products by `A` and `Aᵀ`.
pub trait LinearOperator: Send + Sync {
    /// Length of `A * x`.
    fn nrows(&self) -> usize;

    /// Length of `x` in `A * x`.
    fn ncols(&self) -> usize;

    /// `A * x`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `x.len() != ncols()`.
    fn apply(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// `Aᵀ * x`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `x.len() != nrows()`.
    fn apply_transpose(&self, x: &[f64]) -> Result<Vec<f64>>;
}

impl<T: Element> LinearOperator for SpMat<T> {
    fn nrows(&self) -> usize {
        self.rows()
    }

    fn ncols(&self) -> usize {
        self.cols()
    }

    fn apply(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.mul_vec(x)
    }

    fn apply_transpose(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.trans_mult(x)
    }
}

/// Approximate inverse `M⁻¹` of a square matrix, bound at construction.
///
/// Implementations hold no mutable state; changing the source matrix after
/// construction silently invalidates them.
pub trait Preconditioner: Send + Sync {
    /// Dimension of the (square) system.
    fn dim(&self) -> usize;

    /// `M⁻¹ * x`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `x.len() != dim()`.
    fn solve(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// `M⁻ᵀ * x`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `x.len() != dim()`.
    fn trans_solve(&self, x: &[f64]) -> Result<Vec<f64>>;
}

/// Shared length check for preconditioner inputs.
pub(crate) fn check_len(x: &[f64], dim: usize) -> Result<()> {
    if x.len() != dim {
        return Err(SpMatError::DimensionMismatch(format!(
            "preconditioner of dimension {dim} applied to vector of length {}",
            x.len(),
        )));
    }
    Ok(())
}
