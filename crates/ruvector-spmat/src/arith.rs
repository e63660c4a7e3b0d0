//! Scaling, addition and concatenation.
//!
//! In-place forms (`add_assign_mat`, `hconcat_assign`, ...) mutate the
//! receiver; the plain forms return new matrices. Shape checks happen before
//! any mutation.

use std::ops::{Mul, MulAssign, Neg};

use ndarray::ArrayView2;
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::error::{Result, SpMatError};
use crate::parallel::for_each_range;
use crate::types::Element;
use crate::SpMat;

impl<T: Element> SpMat<T> {
    // -------------------------------------------------------------------
    // Scaling
    // -------------------------------------------------------------------

    /// Copy with every stored value multiplied by `s`. The pattern is
    /// unchanged, so explicit zeros survive and `s = 0` keeps all slots.
    pub fn scaled(&self, s: f64) -> Self {
        let mut out = self.clone();
        out *= s;
        out
    }

    // -------------------------------------------------------------------
    // Addition
    // -------------------------------------------------------------------

    /// `true` if both matrices have the same shape and identical row-index
    /// sequences in every column.
    ///
    /// Shape, entry count and column lengths are compared first; the full
    /// scan only runs when those agree.
    pub fn same_sparsity(&self, other: &SpMat<T>) -> bool {
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
            .all(|(a, b)| a.rows == b.rows)
    }

    /// `A += B`.
    ///
    /// When both share a pattern the values are added in place. Otherwise
    /// every column is rebuilt from the union of both patterns and the entry
    /// count is recomputed; positions that cancel stay as explicit zeros.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the shapes differ.
    pub fn add_assign_mat(&mut self, other: &SpMat<T>) -> Result<()> {
        self.add_scaled(other, T::from_f64(1.0), "add")
    }

    /// `A -= B`. Same paths as [`add_assign_mat`](Self::add_assign_mat).
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the shapes differ.
    pub fn sub_assign_mat(&mut self, other: &SpMat<T>) -> Result<()> {
        self.add_scaled(other, T::from_f64(-1.0), "subtract")
    }

    /// `A + B` as a new matrix.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the shapes differ.
    pub fn add(&self, other: &SpMat<T>) -> Result<SpMat<T>> {
        let mut out = self.clone();
        out.add_assign_mat(other)?;
        Ok(out)
    }

    /// `A - B` as a new matrix.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the shapes differ.
    pub fn sub(&self, other: &SpMat<T>) -> Result<SpMat<T>> {
        let mut out = self.clone();
        out.sub_assign_mat(other)?;
        Ok(out)
    }

    fn add_scaled(&mut self, other: &SpMat<T>, s: T, op: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(SpMatError::DimensionMismatch(format!(
                "cannot {op} {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols,
            )));
        }

        let bounds = self.columns_per_thread(self.threads, true);
        if self.same_sparsity(other) {
            for_each_range(&bounds, &mut self.data, |first, chunk| {
                for (i, col) in chunk.iter_mut().enumerate() {
                    for (v, &o) in col.vals.iter_mut().zip(&other.data[first + i].vals) {
                        *v += s * o;
                    }
                }
            });
            return Ok(());
        }

        debug!(
            rows = self.rows,
            cols = self.cols,
            "{op}: patterns differ, rebuilding columns"
        );
        let rows = self.rows;
        let partial = for_each_range(&bounds, &mut self.data, |first, chunk| {
            let mut acc = Accumulator::new(rows);
            let mut nnz = 0usize;
            for (i, col) in chunk.iter_mut().enumerate() {
                acc.reset();
                for (&r, &v) in col.rows.iter().zip(&col.vals) {
                    *acc.entry(r) += v;
                }
                let ocol = &other.data[first + i];
                for (&r, &v) in ocol.rows.iter().zip(&ocol.vals) {
                    *acc.entry(r) += s * v;
                }
                nnz += acc.drain_into(col);
            }
            nnz
        });
        self.nnz = partial.into_iter().sum();
        Ok(())
    }

    // -------------------------------------------------------------------
    // Concatenation
    // -------------------------------------------------------------------

    /// `A |= B`: append the columns of `B` to the right.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the row counts differ.
    pub fn hconcat_assign(&mut self, rhs: &SpMat<T>) -> Result<()> {
        if self.rows != rhs.rows {
            return Err(SpMatError::DimensionMismatch(format!(
                "horizontal concatenation of {}x{} and {}x{}: row counts differ",
                self.rows, self.cols, rhs.rows, rhs.cols,
            )));
        }
        self.data.extend(rhs.data.iter().cloned());
        self.cols += rhs.cols;
        self.nnz += rhs.nnz;
        Ok(())
    }

    /// `A &= B`: append the rows of `B` below.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the column counts differ.
    pub fn vconcat_assign(&mut self, bottom: &SpMat<T>) -> Result<()> {
        if self.cols != bottom.cols {
            return Err(SpMatError::DimensionMismatch(format!(
                "vertical concatenation of {}x{} and {}x{}: column counts differ",
                self.rows, self.cols, bottom.rows, bottom.cols,
            )));
        }
        let offset = self.rows;
        for (col, b) in self.data.iter_mut().zip(&bottom.data) {
            col.rows.extend(b.rows.iter().map(|&r| r + offset));
            col.vals.extend_from_slice(&b.vals);
        }
        self.rows += bottom.rows;
        self.nnz += bottom.nnz;
        Ok(())
    }

    /// `A | B` as a new matrix.
    ///
    /// # Example
    ///
    /// ```
    /// use ruvector_spmat::SpMat;
    ///
    /// let a = SpMat::<f64>::identity(2);
    /// let ab = a.hconcat(&a.scaled(3.0)).unwrap();
    /// assert_eq!(ab.shape(), (2, 4));
    /// assert_eq!(ab.peek(1, 3).unwrap(), 3.0);
    /// ```
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the row counts differ.
    pub fn hconcat(&self, rhs: &SpMat<T>) -> Result<SpMat<T>> {
        let mut out = self.clone();
        out.hconcat_assign(rhs)?;
        Ok(out)
    }

    /// `A & B` as a new matrix.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the column counts differ.
    pub fn vconcat(&self, bottom: &SpMat<T>) -> Result<SpMat<T>> {
        let mut out = self.clone();
        out.vconcat_assign(bottom)?;
        Ok(out)
    }

    /// `A | D` with a dense right-hand block; only non-zero values of `D`
    /// become entries.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the row counts differ.
    pub fn hconcat_dense(&self, rhs: ArrayView2<'_, f64>) -> Result<SpMat<T>> {
        self.hconcat(&SpMat::from_dense(rhs))
    }

    /// `A & D` with a dense bottom block.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the column counts differ.
    pub fn vconcat_dense(&self, bottom: ArrayView2<'_, f64>) -> Result<SpMat<T>> {
        self.vconcat(&SpMat::from_dense(bottom))
    }

    /// `D | A` with a dense left-hand block. The result carries `A`'s
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the row counts differ.
    pub fn dense_hconcat(lhs: ArrayView2<'_, f64>, rhs: &SpMat<T>) -> Result<SpMat<T>> {
        let mut out = SpMat::from_dense(lhs);
        out.threads = rhs.threads;
        out.warnings = rhs.warnings;
        out.hconcat_assign(rhs)?;
        Ok(out)
    }

    /// `D & A` with a dense top block. The result carries `A`'s
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the column counts differ.
    pub fn dense_vconcat(top: ArrayView2<'_, f64>, bottom: &SpMat<T>) -> Result<SpMat<T>> {
        let mut out = SpMat::from_dense(top);
        out.threads = bottom.threads;
        out.warnings = bottom.warnings;
        out.vconcat_assign(bottom)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Operator impls (infallible only)
// ---------------------------------------------------------------------------

impl<T: Element> MulAssign<f64> for SpMat<T> {
    fn mul_assign(&mut self, s: f64) {
        for col in &mut self.data {
            for v in &mut col.vals {
                *v = T::from_f64(v.to_f64() * s);
            }
        }
    }
}

impl<T: Element> Mul<f64> for &SpMat<T> {
    type Output = SpMat<T>;

    fn mul(self, s: f64) -> SpMat<T> {
        self.scaled(s)
    }
}

impl<T: Element> Mul<&SpMat<T>> for f64 {
    type Output = SpMat<T>;

    fn mul(self, m: &SpMat<T>) -> SpMat<T> {
        m.scaled(self)
    }
}

impl<T: Element> Neg for &SpMat<T> {
    type Output = SpMat<T>;

    fn neg(self) -> SpMat<T> {
        let mut out = self.clone();
        for col in &mut out.data {
            for v in &mut col.vals {
                *v = -*v;
            }
        }
        out
    }
}

impl<T: Element> Neg for SpMat<T> {
    type Output = SpMat<T>;

    fn neg(self) -> SpMat<T> {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn a() -> SpMat<f64> {
        SpMat::from_dense(array![[1.0, 0.0, 2.0], [0.0, 3.0, 0.0]].view())
    }

    #[test]
    fn scaling_keeps_pattern() {
        let m = a();
        let z = &m * 0.0;
        assert_eq!(z.nnz(), m.nnz());
        assert!(z.same_sparsity(&m));
        assert_eq!((2.0 * &m).to_dense(), array![[2.0, 0.0, 4.0], [0.0, 6.0, 0.0]]);

        let mut n = m.clone();
        n *= -1.0;
        assert_eq!(n, -&m);
        assert_eq!(-(-m.clone()), m);
    }

    #[test]
    fn same_sparsity_path_adds_in_place() {
        let m = a();
        let twice = m.add(&m).unwrap();
        assert_eq!(twice, m.scaled(2.0));
        assert_eq!(twice.sub(&m).unwrap(), m);
    }

    #[test]
    fn different_sparsity_merges_patterns() {
        let m = a();
        let mut b = SpMat::<f64>::new(2, 3);
        b.set(1, 0, 5.0).unwrap();
        b.set(0, 0, -1.0).unwrap();

        let sum = m.add(&b).unwrap();
        assert!(sum.is_sorted());
        assert_eq!(sum.nnz(), 4);
        assert_eq!(sum.peek(0, 0).unwrap(), 0.0);
        assert_eq!(sum.peek(1, 0).unwrap(), 5.0);
        // cancelled slot stays explicit
        assert_eq!(sum.column_nnz(0).unwrap(), 2);
    }

    #[test]
    fn add_then_sub_restores_when_pattern_contained() {
        let m = a().with_threads(3);
        let mut b = SpMat::<f64>::new(2, 3);
        b.set(0, 2, 0.5).unwrap();
        let back = m.add(&b).unwrap().sub(&b).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn shape_mismatch_is_rejected_untouched() {
        let mut m = a();
        let before = m.clone();
        assert!(matches!(
            m.add_assign_mat(&SpMat::new(3, 3)),
            Err(SpMatError::DimensionMismatch(_))
        ));
        assert!(m.sub_assign_mat(&SpMat::new(2, 2)).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn horizontal_concat_appends_columns() {
        let m = a();
        let i = SpMat::<f64>::identity(2);
        let h = m.hconcat(&i).unwrap();
        assert_eq!(h.shape(), (2, 5));
        assert_eq!(h.nnz(), m.nnz() + 2);
        for k in 0..3 {
            assert!(h.column(k).unwrap().eq(m.column(k).unwrap()));
        }
        for k in 3..5 {
            assert!(h.column(k).unwrap().eq(i.column(k - 3).unwrap()));
        }
        assert!(m.hconcat(&SpMat::identity(3)).is_err());
    }

    #[test]
    fn vertical_concat_offsets_rows() {
        let m = a();
        let v = m.vconcat(&m).unwrap();
        assert_eq!(v.shape(), (4, 3));
        assert!(v.is_sorted());
        assert_eq!(v.peek(3, 1).unwrap(), 3.0);
        assert_eq!(v.peek(2, 2).unwrap(), 2.0);
        assert!(m.vconcat(&SpMat::identity(2)).is_err());
    }

    #[test]
    fn dense_blocks_on_either_side() {
        let m = a();
        let d = array![[9.0], [0.0]];
        let right = m.hconcat_dense(d.view()).unwrap();
        assert_eq!(right.peek(0, 3).unwrap(), 9.0);
        assert_eq!(right.nnz(), 4);

        let left = SpMat::dense_hconcat(d.view(), &m).unwrap();
        assert_eq!(left.peek(0, 0).unwrap(), 9.0);
        assert_eq!(left.peek(1, 2).unwrap(), 3.0);

        let row = array![[0.0, 7.0, 0.0]];
        assert_eq!(m.vconcat_dense(row.view()).unwrap().peek(2, 1).unwrap(), 7.0);
        assert_eq!(
            SpMat::dense_vconcat(row.view(), &m).unwrap().peek(0, 1).unwrap(),
            7.0
        );
        assert!(m.vconcat_dense(d.view()).is_err());
    }
}
