//! Eager input validation.
//!
//! Every check here runs before any storage is allocated or mutated, so a
//! rejected call leaves its receiver untouched. Failures are reported as
//! [`SpMatError`] variants naming the first violation found.

use crate::error::{Result, SpMatError};
use crate::types::SolveOptions;

// ---------------------------------------------------------------------------
// Compressed-column arrays
// ---------------------------------------------------------------------------

/// Validate compressed-column (CSC) arrays describing a `rows x cols` matrix.
///
/// Checks, in order:
///
/// 1. `col_ptrs.len() == cols + 1`.
/// 2. `col_ptrs[0] == 0`.
/// 3. `col_ptrs` is monotonically non-decreasing.
/// 4. `row_indices` and `values` both hold exactly `col_ptrs[cols]` entries,
///    i.e. the per-column lengths sum to the declared non-zero total.
/// 5. Every row index is `< rows`.
///
/// Row order inside a column is not checked here; the constructor restores
/// normal form itself.
///
/// # Errors
///
/// [`SpMatError::Format`] describing the first violation.
///
/// # Examples
///
/// ```
/// use ruvector_spmat::validation::validate_csc;
///
/// // 2x2 identity
/// assert!(validate_csc(2, 2, &[0, 1], &[0, 1, 2], &[1.0, 1.0]).is_ok());
/// // declares 3 entries, supplies 2
/// assert!(validate_csc(2, 2, &[0, 1], &[0, 1, 3], &[1.0, 1.0]).is_err());
/// ```
pub fn validate_csc(
    rows: usize,
    cols: usize,
    row_indices: &[usize],
    col_ptrs: &[usize],
    values: &[f64],
) -> Result<()> {
    let Some(expected_ptrs) = cols.checked_add(1) else {
        return Err(SpMatError::Format(format!(
            "column count {cols} is too large"
        )));
    };
    if col_ptrs.len() != expected_ptrs {
        return Err(SpMatError::Format(format!(
            "column pointer array has length {} (expected cols + 1 = {expected_ptrs})",
            col_ptrs.len(),
        )));
    }

    if col_ptrs[0] != 0 {
        return Err(SpMatError::Format(format!(
            "column pointer array starts at {} (expected 0)",
            col_ptrs[0],
        )));
    }

    for (c, w) in col_ptrs.windows(2).enumerate() {
        if w[1] < w[0] {
            return Err(SpMatError::Format(format!(
                "column pointers decrease at column {c} ({} -> {})",
                w[0], w[1],
            )));
        }
    }

    let nnz = col_ptrs[cols];
    if row_indices.len() != nnz || values.len() != nnz {
        return Err(SpMatError::Format(format!(
            "declared {} non-zeros but got {} row indices and {} values",
            nnz,
            row_indices.len(),
            values.len(),
        )));
    }

    for c in 0..cols {
        for &r in &row_indices[col_ptrs[c]..col_ptrs[c + 1]] {
            if r >= rows {
                return Err(SpMatError::Format(format!(
                    "row index {r} in column {c} out of range for {rows} rows",
                )));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Solve inputs
// ---------------------------------------------------------------------------

/// Require a square `rows x cols` shape for the operation named `what`.
///
/// # Errors
///
/// [`SpMatError::DimensionMismatch`] if `rows != cols`.
pub fn validate_square(rows: usize, cols: usize, what: &str) -> Result<()> {
    if rows != cols {
        return Err(SpMatError::DimensionMismatch(format!(
            "{what} requires a square matrix but got {rows}x{cols}",
        )));
    }
    Ok(())
}

/// Validate a right-hand side against the matrix row count.
///
/// An all-zero right-hand side is accepted (its solution is zero) and logged
/// at debug level.
///
/// # Errors
///
/// [`SpMatError::DimensionMismatch`] on a length mismatch.
pub fn validate_rhs(rhs: &[f64], expected_len: usize) -> Result<()> {
    if rhs.len() != expected_len {
        return Err(SpMatError::DimensionMismatch(format!(
            "rhs length {} does not match matrix rows {}",
            rhs.len(),
            expected_len,
        )));
    }
    if !rhs.is_empty() && rhs.iter().all(|&v| v == 0.0) {
        tracing::debug!("rhs vector is all zeros; solution will be zero");
    }
    Ok(())
}

/// Validate an initial guess against the matrix column count.
///
/// # Errors
///
/// [`SpMatError::DimensionMismatch`] on a length mismatch.
pub fn validate_initial_guess(x0: &[f64], expected_len: usize) -> Result<()> {
    if x0.len() != expected_len {
        return Err(SpMatError::DimensionMismatch(format!(
            "initial guess length {} does not match matrix columns {}",
            x0.len(),
            expected_len,
        )));
    }
    Ok(())
}

/// Validate iterative-solver parameters.
///
/// - `tolerance` must be finite and non-negative. Zero is accepted and
///   runs the solver to the iteration cap.
/// - `max_iterations` is unrestricted; zero leaves the initial guess as is.
///
/// # Errors
///
/// [`SpMatError::ParameterOutOfRange`] naming the offending parameter.
pub fn validate_solve_options(opts: &SolveOptions) -> Result<()> {
    if !opts.tolerance.is_finite() || opts.tolerance < 0.0 {
        return Err(SpMatError::ParameterOutOfRange {
            name: "tolerance".into(),
            value: format!("{:.2e}", opts.tolerance),
            expected: "non-negative finite value".into(),
        });
    }
    Ok(())
}
