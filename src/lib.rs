//! Reverse-mode automatic differentiation with matrix-level nodes.
//!
//! Scalar arithmetic on [`Var`] records one node per operation. The functions
//! in [`matrix`] record one node per output cell (reductions, products) or
//! one node per operation (solves, determinants), each with a vectorized
//! chain rule, so large linear-algebra expressions stay small on the tape.
//!
//! ```
//! use nalgebra::DMatrix;
//! use revmat::matrix;
//!
//! let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 2.0]);
//! let b = DMatrix::from_row_slice(2, 1, &[4.0, 6.0]);
//! let (value, grad) = revmat::grad_matrix(
//!     |a| {
//!         let x = matrix::mdivide_left_const_b(a, &b).unwrap();
//!         matrix::sum(x.as_slice())
//!     },
//!     &a,
//! );
//! assert!((value - 5.0).abs() < 1e-12);
//! assert!((grad[(0, 0)] + 1.0).abs() < 1e-12);
//! ```

pub mod api;
pub mod arena;
pub mod config;
pub mod error;
pub mod linalg;
pub mod matrix;
pub mod node;
pub mod tape;
pub mod validate;
pub mod var;
mod traits;

pub use api::{grad, grad_matrix, gradient, gradient_matrix, vjp};
pub use config::TapeConfig;
pub use error::{MatrixError, Result};
pub use linalg::Triangle;
pub use matrix::{MatrixV, RowVectorV, VectorV};
pub use tape::{Nested, Tape, TapeGuard, TapeMark};
pub use var::Var;
