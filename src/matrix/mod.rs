//! Matrix-level construction entry points.
//!
//! Every function here records onto the thread's active tape (see
//! [`TapeGuard`](crate::tape::TapeGuard)) and builds one composite node per
//! output cell instead of a chain of scalar operations. Shapes are validated
//! before anything is recorded.

use nalgebra::{DMatrix, DVector, RowDVector};

use crate::tape::with_active_tape;
use crate::var::Var;

mod determinant;
mod product;
mod reduce;
mod solve;

pub use self::determinant::{determinant, log_determinant};
pub use self::product::{
    crossprod, divide, multiply, multiply_const_left, multiply_const_right,
    multiply_lower_tri_self_transpose, multiply_row_column, multiply_scalar, tcrossprod,
};
pub use self::reduce::{
    columns_dot_product, columns_dot_product_const, columns_dot_self, dot_product,
    dot_product_const, dot_self, sum, vector_dot_product, vector_dot_self,
};
pub use self::solve::{
    mdivide_left, mdivide_left_const_a, mdivide_left_const_b, mdivide_left_tri,
    mdivide_left_tri_const_a, mdivide_left_tri_const_b,
};

/// Dense matrix of tape variables.
pub type MatrixV = DMatrix<Var>;
/// Column vector of tape variables.
pub type VectorV = DVector<Var>;
/// Row vector of tape variables.
pub type RowVectorV = RowDVector<Var>;

/// Register every entry of `values` as an independent variable on the active
/// tape, column-major.
pub fn variables(values: &DMatrix<f64>) -> MatrixV {
    with_active_tape(|t| t.variable_matrix(values))
}

/// Wrap `values` as constants. Nothing is recorded.
pub fn constants(values: &DMatrix<f64>) -> MatrixV {
    values.map(Var::constant)
}

/// Primal values of `m`.
pub fn values(m: &MatrixV) -> DMatrix<f64> {
    m.map(|v| v.value())
}

/// A matrix of `rows x cols` constant zeros, used for degenerate products.
fn zeros(rows: usize, cols: usize) -> MatrixV {
    MatrixV::from_element(rows, cols, Var::constant(0.0))
}

/// Column `j` of a column-major matrix as a contiguous slice.
fn column(m: &MatrixV, j: usize) -> &[Var] {
    let rows = m.nrows();
    &m.as_slice()[j * rows..(j + 1) * rows]
}
