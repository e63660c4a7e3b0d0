//! Iterative solve entry points on [`SpMat`].
//!
//! The declared [`MatrixType`](crate::types::MatrixType) picks the method:
//! `SYM_POSDEF` runs CG, everything else (including `UNKNOWN`, which is never
//! probed) runs BiCG. Failing to reach the tolerance is not an error: the
//! best iterate is returned and, when the matrix has warnings enabled, a
//! `warn!` advisory is emitted.

use tracing::{debug, warn};

use crate::bicg::bicg;
use crate::cg::cg;
use crate::error::{Result, SpMatError};
use crate::precond::DiagPrecond;
use crate::traits::Preconditioner;
use crate::types::{Algorithm, Element, SolveOptions, SolveReport};
use crate::validation::{
    validate_initial_guess, validate_rhs, validate_solve_options, validate_square,
};
use crate::SpMat;

impl<T: Element> SpMat<T> {
    /// Solve `A x = b` iteratively and report how it went.
    ///
    /// Without `precond` a [`DiagPrecond`] is built from `A`. Without
    /// `x_init` the iteration starts from zero.
    ///
    /// # Errors
    ///
    /// - [`SpMatError::DimensionMismatch`] if `A` is not square, or `b`,
    ///   `x_init` or the preconditioner do not match its size.
    /// - [`SpMatError::ParameterOutOfRange`] for a negative or non-finite
    ///   tolerance. A zero tolerance runs to the iteration cap, and a zero
    ///   cap returns the starting iterate.
    /// - [`SpMatError::SingularPreconditioner`] if the default preconditioner
    ///   meets a zero diagonal.
    ///
    /// # Example
    ///
    /// ```
    /// use ruvector_spmat::types::{MatrixType, SolveOptions};
    /// use ruvector_spmat::SpMat;
    ///
    /// let a = SpMat::<f64>::from_triplets(2, 2, vec![(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)]).unwrap();
    /// let opts = SolveOptions { matrix_type: MatrixType::SymPosdef, tolerance: 1e-10, ..Default::default() };
    /// let report = a.solve(&[1.0, 2.0], &opts, None, None).unwrap();
    /// assert!(report.converged());
    /// assert!((report.solution[0] - 1.0 / 11.0).abs() < 1e-8);
    /// ```
    pub fn solve(
        &self,
        b: &[f64],
        opts: &SolveOptions,
        precond: Option<&dyn Preconditioner>,
        x_init: Option<&[f64]>,
    ) -> Result<SolveReport> {
        validate_square(self.rows, self.cols, "solve")?;
        validate_rhs(b, self.rows)?;
        if let Some(x0) = x_init {
            validate_initial_guess(x0, self.cols)?;
        }
        validate_solve_options(opts)?;

        let default_precond;
        let m: &dyn Preconditioner = match precond {
            Some(m) => {
                if m.dim() != self.rows {
                    return Err(SpMatError::DimensionMismatch(format!(
                        "preconditioner of dimension {} for a {}x{} matrix",
                        m.dim(),
                        self.rows,
                        self.cols,
                    )));
                }
                m
            }
            None => {
                default_precond = DiagPrecond::new(self)?;
                &default_precond
            }
        };

        let mut x = match x_init {
            Some(x0) => x0.to_vec(),
            None => vec![0.0; self.cols],
        };
        let algorithm = opts.matrix_type.algorithm();

        debug!(
            n = self.rows,
            nnz = self.nnz,
            matrix_type = %opts.matrix_type,
            %algorithm,
            tol = opts.tolerance,
            max_iter = opts.max_iterations,
            "solve: start"
        );

        let outcome = match algorithm {
            Algorithm::ConjugateGradient => {
                cg(self, b, &mut x, m, opts.tolerance, opts.max_iterations)?
            }
            Algorithm::BiConjugateGradient => {
                bicg(self, b, &mut x, m, opts.tolerance, opts.max_iterations)?
            }
        };

        debug!(
            iterations = outcome.iterations,
            residual = outcome.relative_residual,
            termination = ?outcome.termination,
            "solve: finished"
        );
        if !outcome.termination.is_converged() && self.warnings {
            warn!(
                "{algorithm} did not converge: {:?} after {} iterations, \
                 requested tolerance {:e}, achieved {:e}",
                outcome.termination,
                outcome.iterations,
                opts.tolerance,
                outcome.relative_residual,
            );
        }

        Ok(SolveReport {
            solution: x,
            algorithm,
            requested_tolerance: opts.tolerance,
            iterations: outcome.iterations,
            achieved_tolerance: outcome.relative_residual,
            termination: outcome.termination,
            history: outcome.history,
        })
    }

    /// Solve `A x = b` and return only the solution.
    ///
    /// Same contract as [`solve`](Self::solve): an unconverged result is
    /// still returned, so callers needing a hard guarantee should use
    /// [`solve`](Self::solve) and inspect the report.
    ///
    /// # Errors
    ///
    /// As for [`solve`](Self::solve).
    pub fn solve_for_x(
        &self,
        b: &[f64],
        opts: &SolveOptions,
        precond: Option<&dyn Preconditioner>,
        x_init: Option<&[f64]>,
    ) -> Result<Vec<f64>> {
        Ok(self.solve(b, opts, precond, x_init)?.solution)
    }
}
