//! Preconditioners.

use crate::error::{Result, SpMatError};
use crate::traits::{check_len, Preconditioner};
use crate::types::Element;
use crate::validation::validate_square;
use crate::SpMat;

/// Diagonal (Jacobi) preconditioner `M = diag(A)`.
///
/// Since a diagonal matrix is its own transpose, `solve` and `trans_solve`
/// are the same element-wise division.
///
/// # Example
///
/// ```
/// use ruvector_spmat::{precond::DiagPrecond, traits::Preconditioner, SpMat};
///
/// let a = SpMat::<f64>::identity(3).scaled(2.0);
/// let m = DiagPrecond::new(&a).unwrap();
/// assert_eq!(m.solve(&[2.0, 4.0, 6.0]).unwrap(), vec![1.0, 2.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiagPrecond {
    diag: Vec<f64>,
}

impl DiagPrecond {
    /// Capture the diagonal of `a`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `a` is not square,
    /// [`SpMatError::SingularPreconditioner`] at the first diagonal element
    /// that is exactly zero or not stored.
    pub fn new<T: Element>(a: &SpMat<T>) -> Result<Self> {
        validate_square(a.rows(), a.cols(), "diagonal preconditioner")?;
        let diag = (0..a.rows())
            .map(|i| {
                let d = a.peek(i, i)?.to_f64();
                if d == 0.0 {
                    Err(SpMatError::SingularPreconditioner { index: i })
                } else {
                    Ok(d)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { diag })
    }

    /// The captured diagonal.
    pub fn diagonal(&self) -> &[f64] {
        &self.diag
    }
}

impl Preconditioner for DiagPrecond {
    fn dim(&self) -> usize {
        self.diag.len()
    }

    fn solve(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_len(x, self.diag.len())?;
        Ok(x.iter().zip(&self.diag).map(|(&v, &d)| v / d).collect())
    }

    fn trans_solve(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.solve(x)
    }
}

/// `M = I`; leaves vectors unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPrecond {
    dim: usize,
}

impl IdentityPrecond {
    /// Identity of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Preconditioner for IdentityPrecond {
    fn dim(&self) -> usize {
        self.dim
    }

    fn solve(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_len(x, self.dim)?;
        Ok(x.to_vec())
    }

    fn trans_solve(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.solve(x)
    }
}
