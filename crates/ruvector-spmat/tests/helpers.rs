//! Shared helpers for the ruvector-spmat integration tests: seeded matrix
//! generators, dense reference operations and error metrics.

#![allow(dead_code)]

use ndarray::{Array1, Array2, ArrayView1};
use ruvector_spmat::SpMat;

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// 64-bit LCG; every generator below is seeded so failures reproduce.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a new LCG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next u64 value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Generate a uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform f64 in [lo, hi).
    pub fn next_f64_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Generate a small non-zero integer in [-4, 4] as f64.
    pub fn next_small_int(&mut self) -> f64 {
        let v = (self.next_u64() >> 33) % 8;
        if v < 4 {
            v as f64 - 4.0
        } else {
            v as f64 - 3.0
        }
    }
}

// ---------------------------------------------------------------------------
// Matrix generators
// ---------------------------------------------------------------------------

/// Random `rows x cols` matrix with about `density * rows * cols` entries,
/// values uniform in [-1, 1).
pub fn random_sparse(rows: usize, cols: usize, density: f64, seed: u64) -> SpMat<f64> {
    let mut rng = Lcg::new(seed);
    let mut entries = Vec::new();
    for c in 0..cols {
        for r in 0..rows {
            if rng.next_f64() < density {
                entries.push((r, c, rng.next_f64_range(-1.0, 1.0)));
            }
        }
    }
    SpMat::from_triplets(rows, cols, entries).unwrap()
}

/// Like [`random_sparse`] but with small integer values, so that sums and
/// products are exact in floating point.
pub fn random_integer_sparse(rows: usize, cols: usize, density: f64, seed: u64) -> SpMat<f64> {
    let mut rng = Lcg::new(seed);
    let mut entries = Vec::new();
    for c in 0..cols {
        for r in 0..rows {
            if rng.next_f64() < density {
                entries.push((r, c, rng.next_small_int()));
            }
        }
    }
    SpMat::from_triplets(rows, cols, entries).unwrap()
}

/// Random strictly diagonally dominant, non-symmetric `n x n` matrix.
pub fn random_diag_dominant(n: usize, density: f64, seed: u64) -> SpMat<f64> {
    let mut rng = Lcg::new(seed);
    let mut entries = Vec::new();
    let mut row_sums = vec![0.0f64; n];
    for c in 0..n {
        for r in 0..n {
            if r != c && rng.next_f64() < density {
                let v = rng.next_f64_range(-1.0, 1.0);
                row_sums[r] += v.abs();
                entries.push((r, c, v));
            }
        }
    }
    for (i, s) in row_sums.iter().enumerate() {
        entries.push((i, i, s + 1.0 + rng.next_f64()));
    }
    SpMat::from_triplets(n, n, entries).unwrap()
}

/// Random SPD matrix `A = BᵀB + I` with `B` random sparse.
pub fn random_spd(n: usize, density: f64, seed: u64) -> SpMat<f64> {
    let b = random_sparse(n, n, density, seed);
    b.trans_mult_self().add(&SpMat::identity(n)).unwrap()
}

/// 1-D Laplacian `tridiag(-1, 2, -1)` of dimension `n`.
pub fn laplacian_1d(n: usize) -> SpMat<f64> {
    let mut entries = Vec::new();
    for i in 0..n {
        entries.push((i, i, 2.0));
        if i + 1 < n {
            entries.push((i, i + 1, -1.0));
            entries.push((i + 1, i, -1.0));
        }
    }
    SpMat::from_triplets(n, n, entries).unwrap()
}

/// Generate a deterministic random vector of length `n`.
pub fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|_| rng.next_f64_range(-1.0, 1.0)).collect()
}

// ---------------------------------------------------------------------------
// Dense reference operations
// ---------------------------------------------------------------------------

/// Dense `A * x`.
pub fn dense_mul_vec(a: &Array2<f64>, x: &[f64]) -> Vec<f64> {
    a.dot(&ArrayView1::from(x)).to_vec()
}

/// Dense solve of `A x = b` by Gaussian elimination with partial pivoting,
/// used as the reference for the iterative solvers.
///
/// # Panics
///
/// Panics on a non-square or numerically singular matrix.
pub fn dense_solve(matrix: &SpMat<f64>, rhs: &[f64]) -> Vec<f64> {
    let n = matrix.rows();
    assert_eq!(n, matrix.cols(), "dense_solve needs a square matrix");
    assert_eq!(rhs.len(), n, "rhs length must equal the dimension");

    let mut a = matrix.to_dense();
    let mut b = Array1::from(rhs.to_vec());

    for k in 0..n {
        let pivot = (k..n)
            .max_by(|&i, &j| a[[i, k]].abs().total_cmp(&a[[j, k]].abs()))
            .unwrap();
        assert!(a[[pivot, k]].abs() > 1e-15, "singular matrix at column {k}");
        if pivot != k {
            for j in 0..n {
                a.swap([k, j], [pivot, j]);
            }
            b.swap(k, pivot);
        }
        for i in (k + 1)..n {
            let f = a[[i, k]] / a[[k, k]];
            if f == 0.0 {
                continue;
            }
            for j in k..n {
                a[[i, j]] -= f * a[[k, j]];
            }
            b[i] -= f * b[k];
        }
    }

    let mut x = vec![0.0f64; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[[i, j]] * x[j]).sum();
        x[i] = (b[i] - tail) / a[[i, i]];
    }
    x
}

// ---------------------------------------------------------------------------
// Error metrics
// ---------------------------------------------------------------------------

/// Euclidean norm.
pub fn l2_norm(v: &[f64]) -> f64 {
    ArrayView1::from(v).dot(&ArrayView1::from(v)).sqrt()
}

/// `||got - want|| / ||want||`, or the absolute error when `want` is zero.
pub fn relative_error(got: &[f64], want: &[f64]) -> f64 {
    assert_eq!(got.len(), want.len(), "length mismatch");
    let diff = &ArrayView1::from(got) - &ArrayView1::from(want);
    let err = diff.dot(&diff).sqrt();
    match l2_norm(want) {
        n if n > 1e-15 => err / n,
        _ => err,
    }
}

/// Relative residual `||b - A x|| / ||b||`.
pub fn relative_residual(matrix: &SpMat<f64>, x: &[f64], rhs: &[f64]) -> f64 {
    let ax = matrix.mul_vec(x).unwrap();
    let r = &ArrayView1::from(rhs) - &Array1::from(ax);
    r.dot(&r).sqrt() / l2_norm(rhs)
}
