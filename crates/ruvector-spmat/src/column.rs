//! Per-column storage and the read-only column cursor.
//!
//! A [`SpMat`](crate::SpMat) owns one [`Column`] per matrix column. Each
//! column holds parallel `rows`/`vals` sequences; in normal form `rows` is
//! strictly increasing.
//!
//! [`ColumnIter`] is the view handed to external solver code that only needs
//! a forward traversal of one column's `(row, value)` pairs.

use std::iter::FusedIterator;

/// Storage of a single sparse column.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Column<T> {
    pub(crate) rows: Vec<usize>,
    pub(crate) vals: Vec<T>,
}

impl<T: Copy> Column<T> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Binary search for `row`. `Ok(pos)` if stored, `Err(pos)` with the
    /// insertion point otherwise.
    #[inline]
    pub(crate) fn find(&self, row: usize) -> Result<usize, usize> {
        self.rows.binary_search(&row)
    }

    /// Open a slot at `pos` holding `(row, val)`.
    #[inline]
    pub(crate) fn insert(&mut self, pos: usize, row: usize, val: T) {
        self.rows.insert(pos, row);
        self.vals.insert(pos, val);
    }

    /// `true` if `rows` is strictly increasing.
    pub(crate) fn is_sorted(&self) -> bool {
        self.rows.windows(2).all(|w| w[0] < w[1])
    }

    pub(crate) fn iter(&self) -> ColumnIter<'_, T> {
        ColumnIter {
            rows: self.rows.iter(),
            vals: self.vals.iter(),
        }
    }
}

/// Forward cursor over the explicit entries of one column.
///
/// Yields `(row, value)` with 0-based rows in ascending order.
///
/// # Example
///
/// ```
/// use ruvector_spmat::SpMat;
///
/// let mut a = SpMat::<f64>::new(3, 2);
/// a.set(2, 0, 4.0).unwrap();
/// a.set(0, 0, 1.0).unwrap();
/// let entries: Vec<_> = a.column(0).unwrap().collect();
/// assert_eq!(entries, vec![(0, 1.0), (2, 4.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct ColumnIter<'a, T> {
    rows: std::slice::Iter<'a, usize>,
    vals: std::slice::Iter<'a, T>,
}

impl<T: Copy> Iterator for ColumnIter<'_, T> {
    type Item = (usize, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let r = *self.rows.next()?;
        let v = *self.vals.next()?;
        Some((r, v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<T: Copy> ExactSizeIterator for ColumnIter<'_, T> {}

impl<T: Copy> FusedIterator for ColumnIter<'_, T> {}
