//! Products and transposition.
//!
//! Every product here fans out over column ranges from
//! [`SpMat::columns_per_thread`] when the matrix is configured with more than
//! one thread; the calling thread works the last range.
//!
//! # Reproducibility
//!
//! `A * x` with several threads sums per-thread partial vectors through a
//! pairwise tree. For a fixed thread count the summation order is fixed and
//! results are reproducible, but different thread counts may disagree in the
//! low bits because floating-point addition is not associative.

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::column::Column;
use crate::error::{Result, SpMatError};
use crate::parallel::{for_each_range, join};
use crate::types::Element;
use crate::SpMat;

impl<T: Element> SpMat<T> {
    /// Compute `A * x`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `x.len() != cols`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use ruvector_spmat::SpMat;
    ///
    /// let a = SpMat::<f64>::from_dense(array![[1.0, 2.0], [0.0, 3.0]].view());
    /// assert_eq!(a.mul_vec(&[1.0, 1.0]).unwrap(), vec![3.0, 3.0]);
    /// ```
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.cols {
            return Err(SpMatError::DimensionMismatch(format!(
                "cannot multiply {}x{} matrix by vector of length {}",
                self.rows,
                self.cols,
                x.len(),
            )));
        }

        let bounds = self.columns_per_thread(self.threads, true);
        let nt = bounds.len() - 1;
        if nt == 1 {
            let mut y = vec![0.0; self.rows];
            self.scatter_columns(0..self.cols, x, &mut y);
            return Ok(y);
        }

        debug!(threads = nt, nnz = self.nnz, "mul_vec: parallel");
        Ok(self.mul_vec_tree(&bounds, x))
    }

    /// `y += A[:, range] * x[range]`.
    fn scatter_columns(&self, range: std::ops::Range<usize>, x: &[f64], y: &mut [f64]) {
        for c in range {
            let xc = x[c];
            let col = &self.data[c];
            for (&r, &v) in col.rows.iter().zip(&col.vals) {
                y[r] += v.to_f64() * xc;
            }
        }
    }

    /// Per-worker partial products combined by a pairwise tree.
    ///
    /// Let `d = nt - 1 - tid`. At step `s` (1, 2, 4, ...) a worker with odd
    /// `d / s` hands its buffer to `tid + s` and stops; the others absorb the
    /// buffer of `tid - s` if that worker exists. Worker `nt - 1` runs on the
    /// calling thread and ends up holding the full result.
    fn mul_vec_tree(&self, bounds: &[usize], x: &[f64]) -> Vec<f64> {
        let nt = bounds.len() - 1;
        let (senders, receivers): (Vec<Sender<Vec<f64>>>, Vec<Receiver<Vec<f64>>>) =
            (0..nt).map(|_| channel::bounded(1)).unzip();
        let receivers = &receivers;

        let worker = |tid: usize, tx: Sender<Vec<f64>>| -> Option<Vec<f64>> {
            let mut buf = vec![0.0; self.rows];
            self.scatter_columns(bounds[tid]..bounds[tid + 1], x, &mut buf);

            let d = nt - 1 - tid;
            let mut step = 1;
            while step < nt {
                if (d / step) % 2 == 1 {
                    // The receiver outlives every worker; a failed send means
                    // the partner already panicked.
                    let _ = tx.send(buf);
                    return None;
                }
                if tid >= step {
                    let other = receivers[tid - step].recv().ok()?;
                    for (a, b) in buf.iter_mut().zip(&other) {
                        *a += *b;
                    }
                }
                step *= 2;
            }
            Some(buf)
        };
        let worker = &worker;

        std::thread::scope(|s| {
            let mut senders = senders.into_iter().enumerate();
            let last = senders.next_back();
            let handles: Vec<_> = senders
                .map(|(tid, tx)| s.spawn(move || worker(tid, tx)))
                .collect();

            let result = last.and_then(|(tid, tx)| worker(tid, tx));
            for h in handles {
                join(h);
            }
            result.unwrap_or_else(|| vec![0.0; self.rows])
        })
    }

    /// Compute `Aᵀ * x` without forming the transpose.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `x.len() != rows`.
    pub fn trans_mult(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.rows {
            return Err(SpMatError::DimensionMismatch(format!(
                "cannot multiply transpose of {}x{} matrix by vector of length {}",
                self.rows,
                self.cols,
                x.len(),
            )));
        }

        let mut y = vec![0.0; self.cols];
        let bounds = self.columns_per_thread(self.threads, true);
        for_each_range(&bounds, &mut y, |first, chunk| {
            for (i, yi) in chunk.iter_mut().enumerate() {
                let col = &self.data[first + i];
                *yi = col
                    .rows
                    .iter()
                    .zip(&col.vals)
                    .map(|(&r, &v)| v.to_f64() * x[r])
                    .sum();
            }
        });
        Ok(y)
    }

    /// Sparse product `A * B`.
    ///
    /// Each output column is built from the matching column of `B` by
    /// accumulating scaled columns of `A`. Explicit zeros produced by
    /// cancellation are kept.
    ///
    /// The columns of `B` are partitioned across `B`'s thread count; the
    /// result carries `A`'s thread and warning settings.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `A.cols != B.rows`.
    pub fn mul_mat(&self, b: &SpMat<T>) -> Result<SpMat<T>> {
        if self.cols != b.rows {
            return Err(SpMatError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, b.rows, b.cols,
            )));
        }

        let mut out = self.like(self.rows, b.cols);
        let bounds = b.columns_per_thread(b.threads, true);
        let nnz = Mutex::new(0usize);
        for_each_range(&bounds, &mut out.data, |first, chunk| {
            let mut acc = Accumulator::new(self.rows);
            for (i, out_col) in chunk.iter_mut().enumerate() {
                acc.reset();
                let bcol = &b.data[first + i];
                for (&k, &w) in bcol.rows.iter().zip(&bcol.vals) {
                    let acol = &self.data[k];
                    for (&r, &v) in acol.rows.iter().zip(&acol.vals) {
                        *acc.entry(r) += v * w;
                    }
                }
                let n = acc.drain_into(out_col);
                *nnz.lock() += n;
            }
        });
        out.nnz = nnz.into_inner();
        Ok(out)
    }

    /// Transposed copy.
    ///
    /// Counts destination column sizes, pre-allocates, then scatters in a
    /// single forward pass; visiting source columns in order leaves every
    /// destination column in normal form.
    pub fn transpose(&self) -> SpMat<T> {
        let mut counts = vec![0usize; self.rows];
        for col in &self.data {
            for &r in &col.rows {
                counts[r] += 1;
            }
        }

        let mut out = self.like(self.cols, self.rows);
        out.data = counts
            .iter()
            .map(|&n| Column {
                rows: Vec::with_capacity(n),
                vals: Vec::with_capacity(n),
            })
            .collect();

        for (c, col) in self.data.iter().enumerate() {
            for (&r, &v) in col.rows.iter().zip(&col.vals) {
                let dst = &mut out.data[r];
                dst.rows.push(c);
                dst.vals.push(v);
            }
        }
        out.nnz = self.nnz;
        out
    }

    /// `Aᵀ * B`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if `A.rows != B.rows`.
    pub fn trans_mult_mat(&self, b: &SpMat<T>) -> Result<SpMat<T>> {
        if self.rows != b.rows {
            return Err(SpMatError::DimensionMismatch(format!(
                "cannot multiply transpose of {}x{} by {}x{}",
                self.rows, self.cols, b.rows, b.cols,
            )));
        }
        self.transpose().mul_mat(b)
    }

    /// `Aᵀ * A`.
    pub fn trans_mult_self(&self) -> SpMat<T> {
        let t = self.transpose();
        // Shapes agree by construction.
        match t.mul_mat(self) {
            Ok(m) => m,
            Err(_) => unreachable!("transpose has as many columns as the matrix has rows"),
        }
    }
}
