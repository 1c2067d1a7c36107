//! Left division `A \ B`, i.e. the solution `X` of `A · X = B`.

use nalgebra::DMatrix;

use crate::error::Result;
use crate::linalg::Triangle;
use crate::node::SolveShape;
use crate::tape::{with_active_tape, Operand};
use crate::validate::{check_multiplicable, check_square};

use super::MatrixV;

fn solve(op: &'static str, shape: SolveShape, a: Operand<'_>, b: Operand<'_>) -> Result<MatrixV> {
    let a_shape = (a.nrows(), a.ncols());
    check_square(op, a_shape)?;
    check_multiplicable(op, a_shape, (b.nrows(), b.ncols()))?;
    Ok(with_active_tape(|t| t.record_solve(shape, a, b)))
}

/// `A⁻¹ · B` with both sides tracked.
pub fn mdivide_left(a: &MatrixV, b: &MatrixV) -> Result<MatrixV> {
    solve("mdivide_left", SolveShape::General, Operand::Var(a), Operand::Var(b))
}

/// `A⁻¹ · B` for a constant `A`.
pub fn mdivide_left_const_a(a: &DMatrix<f64>, b: &MatrixV) -> Result<MatrixV> {
    solve("mdivide_left", SolveShape::General, Operand::Const(a), Operand::Var(b))
}

/// `A⁻¹ · B` for a constant `B`.
pub fn mdivide_left_const_b(a: &MatrixV, b: &DMatrix<f64>) -> Result<MatrixV> {
    solve("mdivide_left", SolveShape::General, Operand::Var(a), Operand::Const(b))
}

/// `A⁻¹ · B` where `A` is triangular. Entries of `A` outside `triangle` are
/// never read and receive no adjoint.
pub fn mdivide_left_tri(triangle: Triangle, a: &MatrixV, b: &MatrixV) -> Result<MatrixV> {
    solve(
        "mdivide_left_tri",
        SolveShape::Triangular(triangle),
        Operand::Var(a),
        Operand::Var(b),
    )
}

pub fn mdivide_left_tri_const_a(
    triangle: Triangle,
    a: &DMatrix<f64>,
    b: &MatrixV,
) -> Result<MatrixV> {
    solve(
        "mdivide_left_tri",
        SolveShape::Triangular(triangle),
        Operand::Const(a),
        Operand::Var(b),
    )
}

pub fn mdivide_left_tri_const_b(
    triangle: Triangle,
    a: &MatrixV,
    b: &DMatrix<f64>,
) -> Result<MatrixV> {
    solve(
        "mdivide_left_tri",
        SolveShape::Triangular(triangle),
        Operand::Var(a),
        Operand::Const(b),
    )
}
