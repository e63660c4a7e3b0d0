//! Column-range partitioning and the scoped fan-out used by the kernels.
//!
//! Workers are spawned per call with [`std::thread::scope`]; the calling
//! thread takes the last range itself. Nothing outlives the call.

use tracing::trace;

use crate::types::Element;
use crate::SpMat;

impl<T: Element> SpMat<T> {
    /// Split the columns into contiguous ranges, one per worker.
    ///
    /// Returns `bounds` with `bounds[0] == 0`, `bounds[last] == cols` and
    /// worker `t` owning columns `bounds[t]..bounds[t + 1]`. The worker count
    /// is `threads` clamped to `1..=max(cols, 1)`, so the result has at most
    /// `cols + 1` elements.
    ///
    /// With `balance` set the split targets an equal number of explicit
    /// entries per worker, since kernel cost follows entries touched. Ranges
    /// may then be empty. Without it the column count is split evenly.
    ///
    /// # Example
    ///
    /// ```
    /// use ruvector_spmat::SpMat;
    ///
    /// // column 0 holds 4 entries, columns 1..4 one each
    /// let mut a = SpMat::<f64>::new(4, 4);
    /// for r in 0..4 { a.set(r, 0, 1.0).unwrap(); }
    /// for c in 1..4 { a.set(c, c, 1.0).unwrap(); }
    /// assert_eq!(a.columns_per_thread(2, true), vec![0, 1, 4]);
    /// assert_eq!(a.columns_per_thread(2, false), vec![0, 2, 4]);
    /// ```
    pub fn columns_per_thread(&self, threads: usize, balance: bool) -> Vec<usize> {
        let nt = threads.clamp(1, self.cols.max(1));
        let mut bounds = vec![0usize; nt + 1];

        if !balance || self.nnz == 0 {
            for (t, b) in bounds.iter_mut().enumerate() {
                *b = t * self.cols / nt;
            }
            return bounds;
        }

        // Boundary t sits after the first column where the running entry
        // count reaches t/nt of the total.
        let total: usize = self.data.iter().map(|c| c.len()).sum();
        let mut running = 0usize;
        let mut t = 1usize;
        for (c, col) in self.data.iter().enumerate() {
            running += col.len();
            while t < nt && running * nt >= t * total {
                bounds[t] = c + 1;
                t += 1;
            }
        }
        for b in &mut bounds[t..] {
            *b = self.cols;
        }
        bounds[nt] = self.cols;
        bounds
    }
}

/// Run `work(first, chunk)` over consecutive chunks of `items` delimited by
/// `bounds`, one worker per chunk, and collect the per-chunk results in
/// order.
///
/// `first` is the index of `chunk[0]` within `items`. `bounds` must start at
/// 0, be non-decreasing, and end at `items.len()`. With a single chunk the
/// work runs inline.
pub(crate) fn for_each_range<I, R, F>(bounds: &[usize], items: &mut [I], work: F) -> Vec<R>
where
    I: Send,
    R: Send,
    F: Fn(usize, &mut [I]) -> R + Sync,
{
    debug_assert_eq!(bounds.first().copied(), Some(0));
    debug_assert_eq!(bounds.last().copied(), Some(items.len()));

    let ranges = bounds.len().saturating_sub(1);
    if ranges <= 1 {
        return vec![work(0, items)];
    }

    let mut chunks = Vec::with_capacity(ranges);
    let mut rest = items;
    for w in bounds.windows(2) {
        let (head, tail) = rest.split_at_mut(w[1] - w[0]);
        chunks.push((w[0], head));
        rest = tail;
    }

    let work = &work;
    std::thread::scope(|s| {
        let mut chunks = chunks.into_iter();
        let last = chunks.next_back();
        let handles: Vec<_> = chunks
            .map(|(first, chunk)| s.spawn(move || work(first, chunk)))
            .collect();
        trace!(workers = handles.len() + 1, "fan-out");

        let tail = last.map(|(first, chunk)| work(first, chunk));
        let mut out: Vec<R> = handles.into_iter().map(join).collect();
        out.extend(tail);
        out
    })
}

/// Join a scoped worker, re-raising its panic on the caller.
pub(crate) fn join<R>(handle: std::thread::ScopedJoinHandle<'_, R>) -> R {
    match handle.join() {
        Ok(r) => r,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
