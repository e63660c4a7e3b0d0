//! Preconditioned Conjugate Gradient for symmetric positive-definite systems.
//!
//! # Algorithm
//!
//! ```text
//! r = b - A*x
//! for i in 1..=max_iterations:
//!     z   = M^{-1} * r
//!     rho = r . z
//!     p   = z                      (i == 1)
//!     p   = z + (rho / rho_1) * p  (i > 1)
//!     q   = A * p
//!     alpha = rho / (p . q)
//!     x  += alpha * p
//!     r  -= alpha * q
//!     if ||r|| / ||b|| <= tol: converged
//!     rho_1 = rho
//! ```
//!
//! `||b||` is replaced by 1 when `b` is zero. If the initial guess already
//! satisfies the tolerance no iteration runs.
//!
//! # Numerical precision
//!
//! All vectors and inner products are `f64` regardless of the matrix element
//! type.

use tracing::{debug, trace};

use crate::error::{Result, SpMatError};
use crate::traits::{LinearOperator, Preconditioner};
use crate::types::{ConvergenceInfo, IterativeOutcome, Termination};

// ═══════════════════════════════════════════════════════════════════════════
// f64 primitives
// ═══════════════════════════════════════════════════════════════════════════

/// Dot product with 4-wide accumulation.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
#[inline]
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "dot: length mismatch");

    let n = a.len();
    let chunks = n / 4;

    let mut acc0 = 0.0f64;
    let mut acc1 = 0.0f64;
    let mut acc2 = 0.0f64;
    let mut acc3 = 0.0f64;

    for i in 0..chunks {
        let j = i * 4;
        acc0 += a[j] * b[j];
        acc1 += a[j + 1] * b[j + 1];
        acc2 += a[j + 2] * b[j + 2];
        acc3 += a[j + 3] * b[j + 3];
    }
    for i in chunks * 4..n {
        acc0 += a[i] * b[i];
    }

    (acc0 + acc1) + (acc2 + acc3)
}

/// `y += alpha * x`.
#[inline]
pub(crate) fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    assert_eq!(x.len(), y.len(), "axpy: length mismatch");
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// `p = z + beta * p`.
#[inline]
pub(crate) fn xpby(z: &[f64], beta: f64, p: &mut [f64]) {
    assert_eq!(z.len(), p.len(), "xpby: length mismatch");
    for (pi, &zi) in p.iter_mut().zip(z) {
        *pi = zi + beta * *pi;
    }
}

/// Euclidean norm.
#[inline]
pub(crate) fn norm2(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// Shape checks shared by the Krylov kernels.
pub(crate) fn check_system<A, M>(a: &A, b: &[f64], x: &[f64], m: &M, method: &str) -> Result<()>
where
    A: LinearOperator + ?Sized,
    M: Preconditioner + ?Sized,
{
    if a.nrows() != a.ncols() {
        return Err(SpMatError::DimensionMismatch(format!(
            "{method} requires a square operator but got {}x{}",
            a.nrows(),
            a.ncols(),
        )));
    }
    let n = a.nrows();
    if b.len() != n || x.len() != n || m.dim() != n {
        return Err(SpMatError::DimensionMismatch(format!(
            "{method}: operator is {n}x{n} but b has length {}, x has length {} \
             and the preconditioner has dimension {}",
            b.len(),
            x.len(),
            m.dim(),
        )));
    }
    Ok(())
}

/// `r = b - A * x` and the normalisation `||b||` (1 for a zero `b`).
pub(crate) fn initial_residual<A>(a: &A, b: &[f64], x: &[f64]) -> Result<(Vec<f64>, f64)>
where
    A: LinearOperator + ?Sized,
{
    let ax = a.apply(x)?;
    let r: Vec<f64> = b.iter().zip(&ax).map(|(&bi, &ai)| bi - ai).collect();
    let normb = match norm2(b) {
        n if n == 0.0 => 1.0,
        n => n,
    };
    Ok((r, normb))
}

// ═══════════════════════════════════════════════════════════════════════════
// Conjugate Gradient
// ═══════════════════════════════════════════════════════════════════════════

/// Run preconditioned CG on `A x = b`, updating `x` in place.
///
/// Stops when `||r|| / ||b|| <= tolerance`, after `max_iterations`, or on
/// breakdown (`p . Ap == 0`). Running out of iterations is reported through
/// [`Termination`], not as an error; `x` holds the last iterate either way.
///
/// # Errors
///
/// [`SpMatError::DimensionMismatch`] if the operator is not square or the
/// vector/preconditioner sizes disagree with it, plus any error raised by
/// the operator or preconditioner.
pub fn cg<A, M>(
    a: &A,
    b: &[f64],
    x: &mut [f64],
    m: &M,
    tolerance: f64,
    max_iterations: usize,
) -> Result<IterativeOutcome>
where
    A: LinearOperator + ?Sized,
    M: Preconditioner + ?Sized,
{
    check_system(a, b, x, m, "CG")?;

    let (mut r, normb) = initial_residual(a, b, x)?;
    let mut resid = norm2(&r) / normb;
    let mut history = Vec::with_capacity(max_iterations.min(256));

    if resid <= tolerance {
        debug!(resid, "CG: initial guess within tolerance");
        return Ok(IterativeOutcome {
            iterations: 0,
            relative_residual: resid,
            termination: Termination::Converged,
            history,
        });
    }

    let mut p: Vec<f64> = Vec::new();
    let mut rho_1 = 0.0f64;

    for i in 1..=max_iterations {
        let z = m.solve(&r)?;
        let rho = dot(&r, &z);

        if i == 1 {
            p = z;
        } else {
            xpby(&z, rho / rho_1, &mut p);
        }

        let q = a.apply(&p)?;
        let pq = dot(&p, &q);
        if pq == 0.0 {
            debug!(iteration = i, "CG: breakdown, p.Ap = 0");
            return Ok(IterativeOutcome {
                iterations: i,
                relative_residual: resid,
                termination: Termination::Breakdown,
                history,
            });
        }

        let alpha = rho / pq;
        axpy(alpha, &p, x);
        axpy(-alpha, &q, &mut r);

        resid = norm2(&r) / normb;
        history.push(ConvergenceInfo {
            iteration: i,
            relative_residual: resid,
        });
        trace!("CG iter {i}: rel residual = {resid:.6e}");

        if resid <= tolerance {
            return Ok(IterativeOutcome {
                iterations: i,
                relative_residual: resid,
                termination: Termination::Converged,
                history,
            });
        }
        rho_1 = rho;
    }

    Ok(IterativeOutcome {
        iterations: max_iterations,
        relative_residual: resid,
        termination: Termination::MaxIterations,
        history,
    })
}
