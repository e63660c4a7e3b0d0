//! Core value types shared across the crate.
//!
//! Provides the [`Element`] trait for matrix scalars, the [`MatrixType`] tag
//! that drives solver selection, and the option/report types for iterative
//! solves.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpMatError;

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// Scalar type stored in a [`SpMat`](crate::SpMat).
///
/// Implemented for `f32` and `f64`. Dense vectors and matrices crossing the
/// public API are always `f64`; the conversions below are used at that
/// boundary.
pub trait Element:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + fmt::LowerExp
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + FromStr
{
    /// Additive identity.
    const ZERO: Self;

    /// Convert from `f64`, rounding when the target is narrower.
    fn from_f64(v: f64) -> Self;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;
}

macro_rules! impl_element {
    ($t:ty) => {
        impl Element for $t {
            const ZERO: Self = 0.0;

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_element!(f32);
impl_element!(f64);

// ---------------------------------------------------------------------------
// MatrixType
// ---------------------------------------------------------------------------

/// Declared structure of a coefficient matrix, used to pick the iterative
/// method in [`SpMat::solve`](crate::SpMat::solve).
///
/// `Unknown` is not probed for symmetry or definiteness; it is treated like
/// the general case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatrixType {
    /// No structural knowledge.
    #[default]
    Unknown,
    /// General (asymmetric) matrix.
    Asym,
    /// Symmetric, possibly indefinite.
    Sym,
    /// Symmetric positive-definite.
    SymPosdef,
}

impl MatrixType {
    /// Algorithm used to solve systems of this type.
    pub fn algorithm(self) -> Algorithm {
        match self {
            MatrixType::SymPosdef => Algorithm::ConjugateGradient,
            MatrixType::Sym | MatrixType::Asym | MatrixType::Unknown => {
                Algorithm::BiConjugateGradient
            }
        }
    }
}

impl fmt::Display for MatrixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixType::Unknown => write!(f, "UNKNOWN"),
            MatrixType::Asym => write!(f, "ASYM"),
            MatrixType::Sym => write!(f, "SYM"),
            MatrixType::SymPosdef => write!(f, "SYM_POSDEF"),
        }
    }
}

impl FromStr for MatrixType {
    type Err = SpMatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNKNOWN" => Ok(MatrixType::Unknown),
            "ASYM" => Ok(MatrixType::Asym),
            "SYM" => Ok(MatrixType::Sym),
            "SYM_POSDEF" => Ok(MatrixType::SymPosdef),
            other => Err(SpMatError::ParameterOutOfRange {
                name: "matrix_type".into(),
                value: other.into(),
                expected: "one of UNKNOWN, ASYM, SYM, SYM_POSDEF".into(),
            }),
        }
    }
}

/// Iterative method identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Preconditioned Conjugate Gradient (symmetric positive-definite).
    ConjugateGradient,
    /// Preconditioned BiConjugate Gradient (general square systems).
    BiConjugateGradient,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::ConjugateGradient => write!(f, "cg"),
            Algorithm::BiConjugateGradient => write!(f, "bicg"),
        }
    }
}

// ---------------------------------------------------------------------------
// Solve options and reports
// ---------------------------------------------------------------------------

/// Parameters for [`SpMat::solve`](crate::SpMat::solve).
///
/// # Example
///
/// ```rust
/// use ruvector_spmat::types::{MatrixType, SolveOptions};
///
/// let opts = SolveOptions {
///     matrix_type: MatrixType::SymPosdef,
///     ..Default::default()
/// };
/// assert_eq!(opts.max_iterations, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Declared matrix structure; selects CG or BiCG.
    ///
    /// Default: [`MatrixType::Unknown`].
    pub matrix_type: MatrixType,

    /// Target relative residual `||b - Ax|| / ||b||`.
    ///
    /// Default: `1e-4`.
    pub tolerance: f64,

    /// Iteration cap.
    ///
    /// Default: `200`.
    pub max_iterations: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            matrix_type: MatrixType::Unknown,
            tolerance: 1e-4,
            max_iterations: 200,
        }
    }
}

/// Why an iterative method stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Relative residual reached the requested tolerance.
    Converged,
    /// Iteration cap reached before the tolerance.
    MaxIterations,
    /// A recurrence denominator vanished (`rho = 0` or `p.Ap = 0`).
    Breakdown,
}

impl Termination {
    /// `true` only for [`Termination::Converged`].
    #[inline]
    pub fn is_converged(self) -> bool {
        matches!(self, Termination::Converged)
    }
}

/// Per-iteration convergence snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceInfo {
    /// Iteration index (1-based, matching the iteration count).
    pub iteration: usize,
    /// Relative residual `||r|| / ||b||` after this iteration.
    pub relative_residual: f64,
}

/// Outcome of an iterative kernel run; the solution is updated in place.
#[derive(Debug, Clone)]
pub struct IterativeOutcome {
    /// Iterations performed.
    pub iterations: usize,
    /// Achieved relative residual.
    pub relative_residual: f64,
    /// Stop reason.
    pub termination: Termination,
    /// Relative residual after every iteration.
    pub history: Vec<ConvergenceInfo>,
}

/// Result of [`SpMat::solve`](crate::SpMat::solve).
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Solution estimate. Present even when the method did not converge.
    pub solution: Vec<f64>,
    /// Method that produced the estimate.
    pub algorithm: Algorithm,
    /// Tolerance that was requested.
    pub requested_tolerance: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Achieved relative residual.
    pub achieved_tolerance: f64,
    /// Stop reason.
    pub termination: Termination,
    /// Relative residual after every iteration.
    pub history: Vec<ConvergenceInfo>,
}

impl SolveReport {
    /// `true` when the requested tolerance was reached.
    #[inline]
    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }
}
