//! Property-based tests for structural laws of the sparse matrix.

use proptest::prelude::*;
use ruvector_spmat::SpMat;

/// `(rows, cols, triplets)` with small integer values, so that sums are
/// exact and repeated positions merge predictably.
fn sparse(max_dim: usize, max_entries: usize) -> impl Strategy<Value = SpMat<f64>> {
    (1..=max_dim, 1..=max_dim).prop_flat_map(move |(rows, cols)| {
        prop::collection::vec((0..rows, 0..cols, -9i32..=9), 0..=max_entries).prop_map(
            move |entries| {
                let triplets = entries
                    .into_iter()
                    .filter(|&(_, _, v)| v != 0)
                    .map(|(r, c, v)| (r, c, v as f64));
                SpMat::from_triplets(rows, cols, triplets).unwrap()
            },
        )
    })
}

/// Two matrices of the same shape with positive integer values.
fn sparse_pair(
    max_dim: usize,
    max_entries: usize,
) -> impl Strategy<Value = (SpMat<f64>, SpMat<f64>)> {
    (1..=max_dim, 1..=max_dim).prop_flat_map(move |(rows, cols)| {
        let one = prop::collection::vec((0..rows, 0..cols, 1i32..=9), 0..=max_entries);
        (one.clone(), one).prop_map(move |(a, b)| {
            let build = |e: Vec<(usize, usize, i32)>| {
                SpMat::from_triplets(rows, cols, e.into_iter().map(|(r, c, v)| (r, c, v as f64)))
                    .unwrap()
            };
            (build(a), build(b))
        })
    })
}

proptest! {
    #[test]
    fn transpose_is_an_involution(a in sparse(12, 40)) {
        let t = a.transpose();
        prop_assert_eq!(t.shape(), (a.cols(), a.rows()));
        prop_assert!(t.is_sorted());
        prop_assert_eq!(t.transpose(), a);
    }

    #[test]
    fn construction_is_normal_form(a in sparse(15, 60)) {
        prop_assert!(a.is_sorted());
        let stored: usize = (0..a.cols()).map(|c| a.column_nnz(c).unwrap()).sum();
        prop_assert_eq!(stored, a.nnz());
    }

    #[test]
    fn add_then_sub_restores_values((a, b) in sparse_pair(10, 30)) {
        let back = a.add(&b).unwrap().sub(&b).unwrap();
        prop_assert_eq!(back.to_dense(), a.to_dense());
        prop_assert!(back.is_sorted());
    }

    #[test]
    fn add_then_sub_restores_matrix_when_pattern_contained((a, b) in sparse_pair(10, 30)) {
        // a + b contains the pattern of b
        let sum = a.add(&b).unwrap();
        let back = sum.add(&b).unwrap().sub(&b).unwrap();
        prop_assert_eq!(back, sum);
    }

    #[test]
    fn mul_vec_agrees_across_thread_counts(a in sparse(20, 80), threads in 2usize..8) {
        let x: Vec<f64> = (0..a.cols()).map(|i| (i % 7) as f64 - 3.0).collect();
        let serial = a.mul_vec(&x).unwrap();
        let par = a.clone().with_threads(threads).mul_vec(&x).unwrap();
        prop_assert_eq!(par, serial);
    }

    #[test]
    fn text_round_trip((a, _) in sparse_pair(12, 40)) {
        // positive values only: the writer drops explicit zeros
        let back: SpMat<f64> = a.to_string().parse().unwrap();
        prop_assert_eq!(back, a);
    }

    #[test]
    fn hconcat_columns(a in sparse(8, 20), cols in 1usize..6) {
        let b = SpMat::<f64>::identity(a.rows()).hconcat(&SpMat::new(a.rows(), cols)).unwrap();
        let ab = a.hconcat(&b).unwrap();
        prop_assert_eq!(ab.cols(), a.cols() + b.cols());
        prop_assert_eq!(ab.nnz(), a.nnz() + b.nnz());
        for k in 0..ab.cols() {
            let got: Vec<_> = ab.column(k).unwrap().collect();
            let want: Vec<_> = if k < a.cols() {
                a.column(k).unwrap().collect()
            } else {
                b.column(k - a.cols()).unwrap().collect()
            };
            prop_assert_eq!(got, want);
        }
    }

    #[test]
    fn vconcat_offsets_rows(a in sparse(8, 20)) {
        let ab = a.vconcat(&a).unwrap();
        prop_assert_eq!(ab.rows(), 2 * a.rows());
        prop_assert!(ab.is_sorted());
        for c in 0..a.cols() {
            let top: Vec<_> = a.column(c).unwrap().collect();
            let mut want = top.clone();
            want.extend(top.iter().map(|&(r, v)| (r + a.rows(), v)));
            prop_assert_eq!(ab.column(c).unwrap().collect::<Vec<_>>(), want);
        }
    }

    #[test]
    fn peek_unset_is_zero(a in sparse(10, 20), r in 0usize..10, c in 0usize..10) {
        let (r, c) = (r % a.rows(), c % a.cols());
        let stored = a.column(c).unwrap().any(|(row, _)| row == r);
        if !stored {
            prop_assert_eq!(a.peek(r, c).unwrap(), 0.0);
        }
    }
}
