use nalgebra::DMatrix;

use crate::error::Result;
use crate::tape::with_active_tape;
use crate::validate::{check_matching_sizes, check_vector};
use crate::var::Var;

use super::{column, MatrixV, RowVectorV};

fn all_constant(v: &[Var]) -> bool {
    v.iter().all(Var::is_constant)
}

/// `Σ vᵢ` as one node. An empty or fully constant input records nothing.
pub fn sum(v: &[Var]) -> Var {
    if all_constant(v) {
        return Var::constant(v.iter().map(|x| x.value).sum());
    }
    with_active_tape(|t| {
        let ops = t.alloc_operands(v);
        t.push_sum(ops)
    })
}

/// `Σ vᵢ²` as one node.
pub fn dot_self(v: &[Var]) -> Var {
    if all_constant(v) {
        return Var::constant(v.iter().map(|x| x.value * x.value).sum());
    }
    with_active_tape(|t| {
        let ops = t.alloc_operands(v);
        t.push_dot_self(ops)
    })
}

/// `Σ aᵢ · bᵢ` as one node.
pub fn dot_product(a: &[Var], b: &[Var]) -> Result<Var> {
    check_matching_sizes("dot_product", a.len(), b.len())?;
    if all_constant(a) && all_constant(b) {
        return Ok(Var::constant(
            a.iter().zip(b).map(|(x, y)| x.value * y.value).sum(),
        ));
    }
    Ok(with_active_tape(|t| {
        let lhs = t.alloc_operands(a);
        let rhs = t.alloc_operands(b);
        t.push_dot_product(lhs, rhs)
    }))
}

/// `Σ aᵢ · wᵢ` for constant weights `w`.
pub fn dot_product_const(a: &[Var], w: &[f64]) -> Result<Var> {
    check_matching_sizes("dot_product", a.len(), w.len())?;
    if all_constant(a) {
        return Ok(Var::constant(
            a.iter().zip(w).map(|(x, y)| x.value * y).sum(),
        ));
    }
    Ok(with_active_tape(|t| {
        let ops = t.alloc_operands(a);
        let weights = t.alloc_values(w.iter().copied());
        t.push_weighted_sum(ops, weights)
    }))
}

/// [`dot_self`] of a row or column vector held as a matrix.
pub fn vector_dot_self(v: &MatrixV) -> Result<Var> {
    check_vector("vector_dot_self", v.shape())?;
    Ok(dot_self(v.as_slice()))
}

/// [`dot_product`] of two row or column vectors held as matrices. A row and a
/// column of the same length may be mixed.
pub fn vector_dot_product(a: &MatrixV, b: &MatrixV) -> Result<Var> {
    check_vector("vector_dot_product", a.shape())?;
    check_vector("vector_dot_product", b.shape())?;
    check_matching_sizes("vector_dot_product", a.len(), b.len())?;
    dot_product(a.as_slice(), b.as_slice())
}

/// Dot-self of every column of `x`.
pub fn columns_dot_self(x: &MatrixV) -> RowVectorV {
    RowVectorV::from_iterator(x.ncols(), (0..x.ncols()).map(|j| dot_self(column(x, j))))
}

/// Dot product of matching columns of `x` and `y`.
pub fn columns_dot_product(x: &MatrixV, y: &MatrixV) -> Result<RowVectorV> {
    check_matching_sizes("columns_dot_product", x.nrows(), y.nrows())?;
    check_matching_sizes("columns_dot_product", x.ncols(), y.ncols())?;
    let cells = (0..x.ncols())
        .map(|j| dot_product(column(x, j), column(y, j)))
        .collect::<Result<Vec<_>>>()?;
    Ok(RowVectorV::from_vec(cells))
}

/// Dot product of matching columns of `x` and the constant matrix `w`.
pub fn columns_dot_product_const(x: &MatrixV, w: &DMatrix<f64>) -> Result<RowVectorV> {
    check_matching_sizes("columns_dot_product", x.nrows(), w.nrows())?;
    check_matching_sizes("columns_dot_product", x.ncols(), w.ncols())?;
    let rows = w.nrows();
    let cells = (0..x.ncols())
        .map(|j| dot_product_const(column(x, j), &w.as_slice()[j * rows..(j + 1) * rows]))
        .collect::<Result<Vec<_>>>()?;
    Ok(RowVectorV::from_vec(cells))
}
