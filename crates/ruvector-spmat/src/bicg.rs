//! Preconditioned BiConjugate Gradient for general square systems.
//!
//! Runs the CG recurrence on `A` and, in lockstep, a shadow recurrence on
//! `Aᵀ` seeded with `r̃ = r`. Needs products by both `A` and `Aᵀ` and both
//! `M⁻¹` and `M⁻ᵀ`.
//!
//! ```text
//! r = b - A*x;  r~ = r
//! for i in 1..=max_iterations:
//!     z  = M^{-1} r;   z~ = M^{-T} r~
//!     rho = z . r~                       (rho == 0: breakdown)
//!     p  = z  + (rho / rho_2) p
//!     p~ = z~ + (rho / rho_2) p~
//!     q  = A p;        q~ = A^T p~
//!     alpha = rho / (p~ . q)
//!     x += alpha p;  r -= alpha q;  r~ -= alpha q~
//!     if ||r|| / ||b|| < tol: converged
//!     rho_2 = rho
//! ```

use tracing::{debug, trace};

use crate::cg::{axpy, check_system, dot, initial_residual, norm2, xpby};
use crate::error::Result;
use crate::traits::{LinearOperator, Preconditioner};
use crate::types::{ConvergenceInfo, IterativeOutcome, Termination};

/// Run preconditioned BiCG on `A x = b`, updating `x` in place.
///
/// A vanishing `rho` (or `p̃ . Ap`) ends the run with
/// [`Termination::Breakdown`]; exhausting `max_iterations` ends it with
/// [`Termination::MaxIterations`]. Neither is an error.
///
/// # Errors
///
/// [`SpMatError::DimensionMismatch`](crate::SpMatError::DimensionMismatch)
/// if the operator is not square or the vector/preconditioner sizes disagree
/// with it, plus any error raised by the operator or preconditioner.
pub fn bicg<A, M>(
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
    check_system(a, b, x, m, "BiCG")?;

    let (mut r, normb) = initial_residual(a, b, x)?;
    let mut rtilde = r.clone();
    let mut resid = norm2(&r) / normb;
    let mut history = Vec::with_capacity(max_iterations.min(256));

    if resid <= tolerance {
        debug!(resid, "BiCG: initial guess within tolerance");
        return Ok(IterativeOutcome {
            iterations: 0,
            relative_residual: resid,
            termination: Termination::Converged,
            history,
        });
    }

    let mut p: Vec<f64> = Vec::new();
    let mut ptilde: Vec<f64> = Vec::new();
    let mut rho_2 = 0.0f64;

    let breakdown = |i: usize, resid: f64, history: Vec<ConvergenceInfo>, what: &str| {
        debug!(iteration = i, "BiCG: breakdown, {what} = 0");
        IterativeOutcome {
            iterations: i,
            relative_residual: resid,
            termination: Termination::Breakdown,
            history,
        }
    };

    for i in 1..=max_iterations {
        let z = m.solve(&r)?;
        let ztilde = m.trans_solve(&rtilde)?;
        let rho = dot(&z, &rtilde);
        if rho == 0.0 {
            return Ok(breakdown(i, resid, history, "rho"));
        }

        if i == 1 {
            p = z;
            ptilde = ztilde;
        } else {
            let beta = rho / rho_2;
            xpby(&z, beta, &mut p);
            xpby(&ztilde, beta, &mut ptilde);
        }

        let q = a.apply(&p)?;
        let qtilde = a.apply_transpose(&ptilde)?;
        let pq = dot(&ptilde, &q);
        if pq == 0.0 {
            return Ok(breakdown(i, resid, history, "p~.Ap"));
        }

        let alpha = rho / pq;
        axpy(alpha, &p, x);
        axpy(-alpha, &q, &mut r);
        axpy(-alpha, &qtilde, &mut rtilde);
        rho_2 = rho;

        resid = norm2(&r) / normb;
        history.push(ConvergenceInfo {
            iteration: i,
            relative_residual: resid,
        });
        trace!("BiCG iter {i}: rel residual = {resid:.6e}");

        if resid < tolerance {
            return Ok(IterativeOutcome {
                iterations: i,
                relative_residual: resid,
                termination: Termination::Converged,
                history,
            });
        }
    }

    Ok(IterativeOutcome {
        iterations: max_iterations,
        relative_residual: resid,
        termination: Termination::MaxIterations,
        history,
    })
}
