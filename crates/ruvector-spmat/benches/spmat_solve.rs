//! Benchmarks for the CG and BiCG solve paths.
//!
//! CG runs on diagonally dominant symmetric systems declared `SYM_POSDEF`;
//! BiCG runs on the same sizes with a non-symmetric perturbation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ruvector_spmat::precond::IdentityPrecond;
use ruvector_spmat::types::{MatrixType, SolveOptions};
use ruvector_spmat::SpMat;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Strictly diagonally dominant matrix: `a_ii = sum_j |a_ij| + 1`.
///
/// With `symmetric` set every off-diagonal entry is mirrored.
fn dominant_matrix(n: usize, density: f64, symmetric: bool, seed: u64) -> SpMat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut entries: Vec<(usize, usize, f64)> = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < density {
                let val: f64 = rng.gen_range(-0.3..0.3);
                entries.push((i, j, val));
                let mirrored = if symmetric { val } else { rng.gen_range(-0.3..0.3) };
                entries.push((j, i, mirrored));
            }
        }
    }

    let mut row_abs_sums = vec![0.0f64; n];
    for &(r, _c, v) in &entries {
        row_abs_sums[r] += v.abs();
    }
    for (i, s) in row_abs_sums.iter().enumerate() {
        entries.push((i, i, s + 1.0));
    }

    SpMat::from_triplets(n, n, entries).expect("valid triplets")
}

fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn options(matrix_type: MatrixType) -> SolveOptions {
    SolveOptions {
        matrix_type,
        tolerance: 1e-8,
        max_iterations: 5000,
    }
}

// ---------------------------------------------------------------------------
// Benchmark: CG scaling with problem size
// ---------------------------------------------------------------------------

fn cg_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("cg_scaling");
    group.warm_up_time(Duration::from_secs(3));

    for &n in &[100, 1000, 5000] {
        let density = if n <= 1000 { 0.02 } else { 0.002 };
        let a = dominant_matrix(n, density, true, 42);
        let rhs = random_vector(n, 43);
        let opts = options(MatrixType::SymPosdef);

        group.sample_size(if n >= 5000 { 20 } else { 100 });
        group.throughput(Throughput::Elements(a.nnz() as u64));
        group.bench_with_input(BenchmarkId::new("n", n), &n, |b, _| {
            b.iter(|| {
                a.solve_for_x(black_box(&rhs), &opts, None, None)
                    .expect("valid system")
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: diagonal vs identity preconditioner
// ---------------------------------------------------------------------------

fn cg_preconditioning(c: &mut Criterion) {
    let mut group = c.benchmark_group("cg_preconditioning");
    group.sample_size(50);

    for &n in &[500, 2000] {
        let a = dominant_matrix(n, 0.02, true, 42);
        let rhs = random_vector(n, 43);
        let opts = options(MatrixType::SymPosdef);
        let identity = IdentityPrecond::new(n);

        group.bench_with_input(BenchmarkId::new("diag", n), &n, |b, _| {
            b.iter(|| a.solve_for_x(black_box(&rhs), &opts, None, None))
        });
        group.bench_with_input(BenchmarkId::new("identity", n), &n, |b, _| {
            b.iter(|| a.solve_for_x(black_box(&rhs), &opts, Some(&identity), None))
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: CG vs BiCG, serial vs threaded
// ---------------------------------------------------------------------------

fn cg_vs_bicg(c: &mut Criterion) {
    let mut group = c.benchmark_group("cg_vs_bicg");
    group.sample_size(50);

    let n = 2000;
    let sym = dominant_matrix(n, 0.01, true, 7);
    let asym = dominant_matrix(n, 0.01, false, 8);
    let rhs = random_vector(n, 9);

    for &threads in &[1, 4] {
        let sym = sym.clone().with_threads(threads);
        let asym = asym.clone().with_threads(threads);
        let spd = options(MatrixType::SymPosdef);
        let general = options(MatrixType::Asym);

        group.bench_with_input(BenchmarkId::new("cg", threads), &threads, |b, _| {
            b.iter(|| sym.solve_for_x(black_box(&rhs), &spd, None, None))
        });
        group.bench_with_input(BenchmarkId::new("bicg", threads), &threads, |b, _| {
            b.iter(|| asym.solve_for_x(black_box(&rhs), &general, None, None))
        });
    }
    group.finish();
}

criterion_group!(solve, cg_scaling, cg_preconditioning, cg_vs_bicg);
criterion_main!(solve);
