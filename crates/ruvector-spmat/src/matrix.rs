//! The sparse matrix type: storage, construction and element access.
//!
//! [`SpMat`] stores one [`Column`] per matrix column. In normal form each
//! column's row indices are strictly increasing; every mutator in this crate
//! preserves that, and the bulk constructors restore it when their input is
//! unordered.
//!
//! `nnz()` counts *explicit* entries. A slot that was set to `0.0` still
//! counts, and two matrices with the same values but different explicit-zero
//! patterns compare unequal.

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::column::{Column, ColumnIter};
use crate::error::{Result, SpMatError};
use crate::types::Element;
use crate::validation::validate_csc;

/// Column-compressed sparse matrix over `f32` or `f64`.
///
/// # Example
///
/// ```
/// use ruvector_spmat::SpMat;
///
/// let mut a = SpMat::<f64>::new(3, 3);
/// a.set(0, 0, 2.0).unwrap();
/// a.add_to(0, 0, 1.0).unwrap();
/// a.set(2, 1, 0.0).unwrap();
/// assert_eq!(a.peek(0, 0).unwrap(), 3.0);
/// assert_eq!(a.peek(1, 1).unwrap(), 0.0);
/// assert_eq!(a.nnz(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SpMat<T> {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) nnz: usize,
    pub(crate) data: Vec<Column<T>>,
    pub(crate) threads: usize,
    pub(crate) warnings: bool,
}

impl<T: Element> Default for SpMat<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<T: Element> SpMat<T> {
    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Empty `rows x cols` matrix with no explicit entries.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            nnz: 0,
            data: vec![Column::default(); cols],
            threads: 1,
            warnings: false,
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for (c, col) in m.data.iter_mut().enumerate() {
            col.rows.push(c);
            col.vals.push(T::from_f64(1.0));
        }
        m.nnz = n;
        m
    }

    /// Build from compressed-column arrays.
    ///
    /// Column `c` owns `row_indices[col_ptrs[c]..col_ptrs[c + 1]]` and the
    /// matching `values`. Columns whose rows are not strictly increasing are
    /// re-sorted, with duplicate rows summed.
    ///
    /// # Errors
    ///
    /// [`SpMatError::Format`] if the arrays are inconsistent (see
    /// [`validate_csc`]), notably when the per-column lengths do not sum to
    /// the declared non-zero total.
    ///
    /// # Example
    ///
    /// ```
    /// use ruvector_spmat::SpMat;
    ///
    /// // [[1, 0], [2, 3]]
    /// let a = SpMat::<f64>::from_csc(2, 2, &[0, 1, 1], &[0, 2, 3], &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(a.peek(1, 0).unwrap(), 2.0);
    /// assert!(SpMat::<f64>::from_csc(2, 2, &[0, 1], &[0, 2, 3], &[1.0, 2.0]).is_err());
    /// ```
    pub fn from_csc(
        rows: usize,
        cols: usize,
        row_indices: &[usize],
        col_ptrs: &[usize],
        values: &[f64],
    ) -> Result<Self> {
        validate_csc(rows, cols, row_indices, col_ptrs, values)?;

        let mut m = Self::new(rows, cols);
        let mut acc: Option<Accumulator<T>> = None;
        let mut resorted = 0usize;

        for c in 0..cols {
            let range = col_ptrs[c]..col_ptrs[c + 1];
            let ri = &row_indices[range.clone()];
            let vals = &values[range];
            let col = &mut m.data[c];

            if ri.windows(2).all(|w| w[0] < w[1]) {
                col.rows.extend_from_slice(ri);
                col.vals.extend(vals.iter().map(|&v| T::from_f64(v)));
            } else {
                let acc = acc.get_or_insert_with(|| Accumulator::new(rows));
                acc.reset();
                for (&r, &v) in ri.iter().zip(vals) {
                    *acc.entry(r) += T::from_f64(v);
                }
                acc.drain_into(col);
                resorted += 1;
            }
            m.nnz += col.len();
        }

        if resorted > 0 {
            debug!(
                columns = resorted,
                nnz = m.nnz,
                "from_csc: restored row order in unsorted columns"
            );
        }
        Ok(m)
    }

    /// Build from `(row, col, value)` triplets. Duplicate positions are
    /// summed into one explicit entry.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] for a triplet outside the matrix.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        entries: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Self> {
        let mut buckets: Vec<Vec<(usize, T)>> = vec![Vec::new(); cols];
        for (r, c, v) in entries {
            if r >= rows {
                return Err(SpMatError::row(r, rows));
            }
            if c >= cols {
                return Err(SpMatError::column(c, cols));
            }
            buckets[c].push((r, v));
        }

        let mut m = Self::new(rows, cols);
        let mut acc = Accumulator::new(rows);
        for (col, bucket) in m.data.iter_mut().zip(&buckets) {
            acc.reset();
            for &(r, v) in bucket {
                *acc.entry(r) += v;
            }
            m.nnz += acc.drain_into(col);
        }
        Ok(m)
    }

    /// Build from a dense matrix, keeping only numerically non-zero values.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use ruvector_spmat::SpMat;
    ///
    /// let a = SpMat::<f64>::from_dense(array![[1.0, 0.0], [0.0, -2.0]].view());
    /// assert_eq!(a.nnz(), 2);
    /// assert_eq!(a.to_dense(), array![[1.0, 0.0], [0.0, -2.0]]);
    /// ```
    pub fn from_dense(dense: ArrayView2<'_, f64>) -> Self {
        let (rows, cols) = dense.dim();
        let mut m = Self::new(rows, cols);
        for (c, col) in m.data.iter_mut().enumerate() {
            for (r, &v) in dense.column(c).iter().enumerate() {
                if v != 0.0 {
                    col.rows.push(r);
                    col.vals.push(T::from_f64(v));
                }
            }
            m.nnz += col.len();
        }
        m
    }

    /// Materialise as a dense `rows x cols` matrix.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.rows, self.cols));
        for (c, col) in self.data.iter().enumerate() {
            for (r, v) in col.iter() {
                out[[r, c]] = v.to_f64();
            }
        }
        out
    }

    // -------------------------------------------------------------------
    // Shape and configuration
    // -------------------------------------------------------------------

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of explicit entries, including explicit zeros.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Configured fan-out for the parallel kernels.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Builder form of [`set_threads`](Self::set_threads).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.set_threads(threads);
        self
    }

    /// Set the fan-out for the parallel kernels. `0` is treated as `1`,
    /// which runs every kernel on the calling thread.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads.max(1);
    }

    /// Emit an advisory `warn!` when a solve fails to converge.
    pub fn warnings_on(&mut self) {
        self.warnings = true;
    }

    /// Silence solver advisories (the default).
    pub fn warnings_off(&mut self) {
        self.warnings = false;
    }

    /// Whether solver advisories are enabled.
    #[inline]
    pub fn warnings_enabled(&self) -> bool {
        self.warnings
    }

    // -------------------------------------------------------------------
    // Element access
    // -------------------------------------------------------------------

    /// Value at `(r, c)`, or zero if the position holds no explicit entry.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] if `(r, c)` lies outside the matrix.
    pub fn peek(&self, r: usize, c: usize) -> Result<T> {
        self.check_index(r, c)?;
        let col = &self.data[c];
        Ok(match col.find(r) {
            Ok(pos) => col.vals[pos],
            Err(_) => T::ZERO,
        })
    }

    /// Store `v` at `(r, c)`, creating an explicit entry if needed.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] if `(r, c)` lies outside the matrix.
    pub fn set(&mut self, r: usize, c: usize, v: T) -> Result<()> {
        self.check_index(r, c)?;
        *self.here(r, c) = v;
        Ok(())
    }

    /// Add `v` to the value at `(r, c)`, creating an explicit entry if needed.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] if `(r, c)` lies outside the matrix.
    pub fn add_to(&mut self, r: usize, c: usize, v: T) -> Result<()> {
        self.check_index(r, c)?;
        *self.here(r, c) += v;
        Ok(())
    }

    /// Replace column `c` with the entries of `dense` whose magnitude exceeds
    /// `eps`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] for a bad column,
    /// [`SpMatError::DimensionMismatch`] if `dense.len() != rows`.
    pub fn set_column(&mut self, c: usize, dense: &[f64], eps: f64) -> Result<()> {
        if c >= self.cols {
            return Err(SpMatError::column(c, self.cols));
        }
        if dense.len() != self.rows {
            return Err(SpMatError::DimensionMismatch(format!(
                "column of length {} does not match matrix rows {}",
                dense.len(),
                self.rows,
            )));
        }

        let col = &mut self.data[c];
        let old = col.len();
        col.rows.clear();
        col.vals.clear();
        for (r, &v) in dense.iter().enumerate() {
            if v.abs() > eps {
                col.rows.push(r);
                col.vals.push(T::from_f64(v));
            }
        }
        self.nnz = self.nnz - old + col.len();
        Ok(())
    }

    /// Scale column `c` by `factors[c]` (post-multiplication by a diagonal).
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `factors.len() != cols`.
    pub fn multiply_columns(&mut self, factors: &[f64]) -> Result<()> {
        if factors.len() != self.cols {
            return Err(SpMatError::DimensionMismatch(format!(
                "{} column factors for a matrix with {} columns",
                factors.len(),
                self.cols,
            )));
        }
        for (col, &s) in self.data.iter_mut().zip(factors) {
            for v in &mut col.vals {
                *v = T::from_f64(v.to_f64() * s);
            }
        }
        Ok(())
    }

    /// Read-only cursor over column `c`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] if `c >= cols`.
    pub fn column(&self, c: usize) -> Result<ColumnIter<'_, T>> {
        Ok(self.column_slice(c)?.iter())
    }

    /// Number of explicit entries in column `c`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::IndexOutOfBounds`] if `c >= cols`.
    pub fn column_nnz(&self, c: usize) -> Result<usize> {
        Ok(self.column_slice(c)?.len())
    }

    /// `true` if every column is in normal form (strictly increasing rows).
    pub fn is_sorted(&self) -> bool {
        self.data.iter().all(Column::is_sorted)
    }

    // -------------------------------------------------------------------
    // Crate-internal helpers
    // -------------------------------------------------------------------

    pub(crate) fn column_slice(&self, c: usize) -> Result<&Column<T>> {
        self.data
            .get(c)
            .ok_or_else(|| SpMatError::column(c, self.cols))
    }

    /// Empty matrix of the given shape carrying this matrix's configuration.
    pub(crate) fn like(&self, rows: usize, cols: usize) -> Self {
        let mut m = Self::new(rows, cols);
        m.threads = self.threads;
        m.warnings = self.warnings;
        m
    }

    fn check_index(&self, r: usize, c: usize) -> Result<()> {
        if r >= self.rows {
            return Err(SpMatError::row(r, self.rows));
        }
        if c >= self.cols {
            return Err(SpMatError::column(c, self.cols));
        }
        Ok(())
    }

    /// Slot for `(r, c)`, inserting an explicit zero if absent.
    fn here(&mut self, r: usize, c: usize) -> &mut T {
        let col = &mut self.data[c];
        let pos = match col.find(r) {
            Ok(pos) => pos,
            Err(pos) => {
                col.insert(pos, r, T::ZERO);
                self.nnz += 1;
                pos
            }
        };
        &mut col.vals[pos]
    }
}

/// Representation-sensitive equality: shapes, explicit-entry counts, column
/// lengths and then every stored `(row, value)` pair must match. Thread and
/// warning settings are ignored.
impl<T: Element> PartialEq for SpMat<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.rows != other.rows || self.cols != other.cols || self.nnz != other.nnz {
            return false;
        }
        if self
            .data
            .iter()
            .zip(&other.data)
            .any(|(a, b)| a.len() != b.len())
        {
            return false;
        }
        self.data
            .iter()
            .zip(&other.data)
            .all(|(a, b)| a.rows == b.rows && a.vals == b.vals)
    }
}
