//! Sparse accumulator (SPA) for building one column at a time.
//!
//! [`Accumulator`] holds a dense-length scratch column together with the list
//! of positions touched since the last [`reset`](Accumulator::reset). It is
//! the workhorse behind matrix products, different-sparsity addition and the
//! bulk constructors: entries are scattered into it in arbitrary order and
//! read back in ascending index order.
//!
//! The touched list is sorted lazily, at most once per reset cycle, and only
//! if an out-of-order touch was observed.

use crate::column::Column;
use crate::error::{Result, SpMatError};
use crate::matrix::SpMat;
use crate::types::Element;

/// Scratch buffer representing a single sparse column of fixed capacity.
///
/// # Example
///
/// ```
/// use ruvector_spmat::accumulator::Accumulator;
///
/// let mut acc = Accumulator::<f64>::new(8);
/// *acc.entry(5) += 1.0;
/// *acc.entry(2) += 3.0;
/// *acc.entry(5) += 1.0;
/// assert_eq!(acc.len(), 2);
/// assert_eq!(acc.ri(0), 2);
/// assert_eq!(acc.val(1), 2.0);
/// acc.reset();
/// assert!(acc.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Accumulator<T> {
    occupied: Vec<bool>,
    values: Vec<T>,
    touched: Vec<usize>,
    sorted: bool,
}

impl<T: Element> Accumulator<T> {
    /// Create an accumulator able to hold indices `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            occupied: vec![false; capacity],
            values: vec![T::ZERO; capacity],
            touched: Vec::new(),
            sorted: true,
        }
    }

    /// Maximum index + 1.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Number of occupied positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.touched.len()
    }

    /// `true` if nothing was touched since the last reset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Clear every touched position. Cost is proportional to the number of
    /// touched positions, not to the capacity.
    pub fn reset(&mut self) {
        for &i in &self.touched {
            self.occupied[i] = false;
            self.values[i] = T::ZERO;
        }
        self.touched.clear();
        self.sorted = true;
    }

    /// Mutable reference to the running value at `i`, marking it occupied on
    /// first touch.
    ///
    /// # Panics
    ///
    /// Panics if `i >= capacity()`.
    #[inline]
    pub fn entry(&mut self, i: usize) -> &mut T {
        if !self.occupied[i] {
            if let Some(&last) = self.touched.last() {
                if self.sorted && i < last {
                    self.sorted = false;
                }
            }
            self.occupied[i] = true;
            self.touched.push(i);
        }
        &mut self.values[i]
    }

    /// Index of the `k`-th occupied position in ascending order.
    pub fn ri(&mut self, k: usize) -> usize {
        self.ensure_sorted();
        self.touched[k]
    }

    /// Value of the `k`-th occupied position in ascending index order.
    pub fn val(&mut self, k: usize) -> T {
        self.ensure_sorted();
        self.values[self.touched[k]]
    }

    /// Value stored at index `i` (zero if unoccupied).
    #[inline]
    pub fn value_at(&self, i: usize) -> T {
        self.values[i]
    }

    /// Whether index `i` has been touched.
    #[inline]
    pub fn is_occupied(&self, i: usize) -> bool {
        self.occupied[i]
    }

    /// Iterate occupied `(index, value)` pairs in ascending index order.
    pub fn iter(&mut self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.ensure_sorted();
        let values = &self.values;
        self.touched.iter().map(move |&i| (i, values[i]))
    }

    /// Replace the content with column `c` of `matrix`.
    ///
    /// # Errors
    ///
    /// [`SpMatError::DimensionMismatch`] if the capacity differs from the
    /// matrix row count, [`SpMatError::IndexOutOfBounds`] if `c` is not a
    /// column of `matrix`.
    pub fn extract_column(&mut self, matrix: &SpMat<T>, c: usize) -> Result<&Self> {
        if self.capacity() != matrix.rows() {
            return Err(SpMatError::DimensionMismatch(format!(
                "accumulator capacity {} does not match matrix rows {}",
                self.capacity(),
                matrix.rows(),
            )));
        }
        let col = matrix.column_slice(c)?;
        self.reset();
        for (&r, &v) in col.rows.iter().zip(col.vals.iter()) {
            self.occupied[r] = true;
            self.values[r] = v;
            self.touched.push(r);
        }
        // Stored columns are in normal form.
        self.sorted = true;
        Ok(self)
    }

    /// Write the occupied entries, in ascending order, into `out`, replacing
    /// its previous content. Returns the number of entries written.
    pub(crate) fn drain_into(&mut self, out: &mut Column<T>) -> usize {
        self.ensure_sorted();
        out.rows.clear();
        out.vals.clear();
        out.rows.reserve(self.touched.len());
        out.vals.reserve(self.touched.len());
        for &i in &self.touched {
            out.rows.push(i);
            out.vals.push(self.values[i]);
        }
        self.touched.len()
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.touched.sort_unstable();
            self.sorted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_touches_never_sort() {
        let mut acc = Accumulator::<f64>::new(10);
        for i in [1, 3, 7] {
            *acc.entry(i) += i as f64;
        }
        assert!(acc.sorted);
        let got: Vec<_> = acc.iter().collect();
        assert_eq!(got, vec![(1, 1.0), (3, 3.0), (7, 7.0)]);
    }

    #[test]
    fn out_of_order_touches_read_back_sorted() {
        let mut acc = Accumulator::<f32>::new(10);
        *acc.entry(9) += 1.0;
        *acc.entry(0) += 2.0;
        *acc.entry(4) += 3.0;
        assert!(!acc.sorted);
        assert_eq!(acc.ri(0), 0);
        assert_eq!(acc.ri(1), 4);
        assert_eq!(acc.ri(2), 9);
        assert_eq!(acc.val(2), 1.0);
        assert!(acc.sorted);
    }

    #[test]
    fn repeated_touches_accumulate() {
        let mut acc = Accumulator::<f64>::new(4);
        *acc.entry(2) += 1.5;
        *acc.entry(2) += 1.5;
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.value_at(2), 3.0);
    }

    #[test]
    fn reset_clears_only_touched() {
        let mut acc = Accumulator::<f64>::new(6);
        *acc.entry(5) = 4.0;
        *acc.entry(1) = 2.0;
        acc.reset();
        assert!(acc.is_empty());
        assert!(!acc.is_occupied(5));
        assert_eq!(acc.value_at(1), 0.0);
        *acc.entry(3) += 1.0;
        assert_eq!(acc.iter().collect::<Vec<_>>(), vec![(3, 1.0)]);
    }

    #[test]
    fn explicit_zero_stays_occupied() {
        let mut acc = Accumulator::<f64>::new(3);
        *acc.entry(1) += 2.0;
        *acc.entry(1) += -2.0;
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.val(0), 0.0);
    }

    #[test]
    fn extract_column_loads_stored_entries() {
        let mut m = SpMat::<f64>::new(4, 2);
        m.set(3, 1, 5.0).unwrap();
        m.set(0, 1, 1.0).unwrap();
        let mut acc = Accumulator::new(4);
        *acc.entry(2) = 9.0;
        acc.extract_column(&m, 1).unwrap();
        assert_eq!(acc.iter().collect::<Vec<_>>(), vec![(0, 1.0), (3, 5.0)]);
        assert!(!acc.is_occupied(2));

        let mut wrong = Accumulator::<f64>::new(3);
        assert!(wrong.extract_column(&m, 0).is_err());
        assert!(acc.extract_column(&m, 2).is_err());
    }
}
