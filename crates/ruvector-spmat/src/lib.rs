//! Column-compressed sparse matrices with threaded kernels and iterative
//! solvers for the ruvector ecosystem.
//!
//! [`SpMat<T>`] (`T` = `f32` or `f64`) stores one sorted `(row, value)`
//! sequence per column and counts *explicit* entries, so matrices sharing a
//! sparsity pattern (explicit zeros included) can be combined without
//! re-deriving it.
//!
//! # Capabilities
//!
//! | Area | Entry points |
//! |------|--------------|
//! | Construction | [`SpMat::new`], [`SpMat::from_csc`], [`SpMat::from_triplets`], [`SpMat::from_dense`], [`SpMat::load`] |
//! | Access | [`SpMat::peek`], [`SpMat::set`], [`SpMat::add_to`], [`SpMat::set_column`], [`SpMat::column`] |
//! | Arithmetic | [`SpMat::add_assign_mat`], [`SpMat::sub_assign_mat`], `*=`, `-`, [`SpMat::hconcat`], [`SpMat::vconcat`] |
//! | Products | [`SpMat::mul_vec`], [`SpMat::trans_mult`], [`SpMat::mul_mat`], [`SpMat::transpose`] |
//! | Solving | [`SpMat::solve`], [`SpMat::solve_for_x`], [`cg::cg`], [`bicg::bicg`] |
//!
//! Products and additions fan out over [`SpMat::threads`] scoped threads,
//! with columns split to balance explicit entries per thread.
//!
//! # Example
//!
//! ```rust
//! use ruvector_spmat::types::{MatrixType, SolveOptions};
//! use ruvector_spmat::SpMat;
//!
//! // 1-D Laplacian, built from compressed-column arrays
//! let a = SpMat::<f64>::from_csc(
//!     3, 3,
//!     &[0, 1, 0, 1, 2, 1, 2],
//!     &[0, 2, 5, 7],
//!     &[2.0, -1.0, -1.0, 2.0, -1.0, -1.0, 2.0],
//! ).unwrap()
//! .with_threads(2);
//!
//! let opts = SolveOptions {
//!     matrix_type: MatrixType::SymPosdef,
//!     tolerance: 1e-10,
//!     ..Default::default()
//! };
//! let x = a.solve_for_x(&[1.0, 0.0, 1.0], &opts, None, None).unwrap();
//! assert!(x.iter().all(|v| (v - 1.0).abs() < 1e-8));
//! ```

pub mod accumulator;
pub mod bicg;
pub mod cg;
mod column;
pub mod error;
mod io;
mod matrix;
mod parallel;
pub mod precond;
pub mod traits;
pub mod types;
pub mod validation;

mod arith;
mod kernels;
mod solve;

pub use column::ColumnIter;
pub use error::{Result, SpMatError};
pub use matrix::SpMat;
