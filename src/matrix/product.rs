//! Matrix products.
//!
//! Every output cell is one dot-product node. The operand index slices are
//! materialized once per row of the left factor and once per column of the
//! right factor, and every cell in that row or column points at the same
//! arena range. Self-products (`M·Mᵀ` and friends) are symmetric: the cell
//! below the diagonal is computed once and the same `Var` is stored in the
//! mirrored position above it.

use nalgebra::DMatrix;

use crate::arena::{IndexSlice, ValueSlice};
use crate::error::Result;
use crate::tape::with_active_tape;
use crate::validate::check_multiplicable;
use crate::var::Var;

use super::{dot_product, zeros, MatrixV, RowVectorV, VectorV};

/// `a · b` for `R×K` by `K×C`.
pub fn multiply(a: &MatrixV, b: &MatrixV) -> Result<MatrixV> {
    check_multiplicable("multiply", a.shape(), b.shape())?;
    let (rows, inner, cols) = (a.nrows(), a.ncols(), b.ncols());
    if rows * inner * cols == 0 {
        return Ok(zeros(rows, cols));
    }

    Ok(with_active_tape(|t| {
        let mut columns: Vec<Option<IndexSlice>> = vec![None; cols];
        let mut out = zeros(rows, cols);
        for i in 0..rows {
            let row = t.alloc_operands(a.row(i).iter());
            for (j, column) in columns.iter_mut().enumerate() {
                let column = *column.get_or_insert_with(|| t.alloc_operands(b.column(j).iter()));
                out[(i, j)] = t.push_dot_product(row, column);
            }
        }
        out
    }))
}

/// `w · b` with a constant left factor.
pub fn multiply_const_left(w: &DMatrix<f64>, b: &MatrixV) -> Result<MatrixV> {
    check_multiplicable("multiply", w.shape(), b.shape())?;
    let (rows, inner, cols) = (w.nrows(), w.ncols(), b.ncols());
    if rows * inner * cols == 0 {
        return Ok(zeros(rows, cols));
    }

    Ok(with_active_tape(|t| {
        let mut columns: Vec<Option<IndexSlice>> = vec![None; cols];
        let mut out = zeros(rows, cols);
        for i in 0..rows {
            let weights = t.alloc_values(w.row(i).iter().copied());
            for (j, column) in columns.iter_mut().enumerate() {
                let column = *column.get_or_insert_with(|| t.alloc_operands(b.column(j).iter()));
                out[(i, j)] = t.push_weighted_sum(column, weights);
            }
        }
        out
    }))
}

/// `a · w` with a constant right factor.
pub fn multiply_const_right(a: &MatrixV, w: &DMatrix<f64>) -> Result<MatrixV> {
    check_multiplicable("multiply", a.shape(), w.shape())?;
    let (rows, inner, cols) = (a.nrows(), a.ncols(), w.ncols());
    if rows * inner * cols == 0 {
        return Ok(zeros(rows, cols));
    }

    Ok(with_active_tape(|t| {
        let mut columns: Vec<Option<ValueSlice>> = vec![None; cols];
        let mut out = zeros(rows, cols);
        for i in 0..rows {
            let row = t.alloc_operands(a.row(i).iter());
            for (j, column) in columns.iter_mut().enumerate() {
                let weights =
                    *column.get_or_insert_with(|| t.alloc_values(w.column(j).iter().copied()));
                out[(i, j)] = t.push_weighted_sum(row, weights);
            }
        }
        out
    }))
}

/// `c · m`, cell by cell.
pub fn multiply_scalar(c: f64, m: &MatrixV) -> MatrixV {
    m.map(|v| c * v)
}

/// `m / c`, cell by cell.
pub fn divide(m: &MatrixV, c: f64) -> MatrixV {
    m.map(|v| v / c)
}

/// Row vector times column vector.
pub fn multiply_row_column(rv: &RowVectorV, v: &VectorV) -> Result<Var> {
    check_multiplicable("multiply", rv.shape(), v.shape())?;
    dot_product(rv.as_slice(), v.as_slice())
}

/// `m · mᵀ`.
pub fn tcrossprod(m: &MatrixV) -> MatrixV {
    let (rows, inner) = m.shape();
    if rows * inner == 0 {
        return zeros(rows, rows);
    }

    with_active_tape(|t| {
        // Every row once, row-major, so row `i` is `all[i * inner..]`.
        let all = t.alloc_operands((0..rows).flat_map(|i| (0..inner).map(move |k| &m[(i, k)])));
        let row = |i: usize| all.sub(i * inner, inner);

        let mut out = zeros(rows, rows);
        for i in 0..rows {
            out[(i, i)] = t.push_dot_self(row(i));
            for j in 0..i {
                let cell = t.push_dot_product(row(i), row(j));
                out[(i, j)] = cell;
                out[(j, i)] = cell;
            }
        }
        out
    })
}

/// `mᵀ · m`.
pub fn crossprod(m: &MatrixV) -> MatrixV {
    tcrossprod(&m.transpose())
}

/// `l · lᵀ` reading only the lower triangle of `l`.
///
/// `l` may be rectangular: row `i` contributes its first `min(i + 1, cols)`
/// entries.
pub fn multiply_lower_tri_self_transpose(l: &MatrixV) -> MatrixV {
    let (rows, cols) = l.shape();
    if rows * cols == 0 {
        return zeros(rows, rows);
    }

    with_active_tape(|t| {
        let width = |i: usize| (i + 1).min(cols);
        let mut offsets = Vec::with_capacity(rows);
        let mut next = 0;
        for i in 0..rows {
            offsets.push(next);
            next += width(i);
        }
        let all = t.alloc_operands(
            (0..rows).flat_map(|i| (0..width(i)).map(move |k| &l[(i, k)])),
        );

        let mut out = zeros(rows, rows);
        for i in 0..rows {
            out[(i, i)] = t.push_dot_self(all.sub(offsets[i], width(i)));
            for j in 0..i {
                // Row j is the shorter one; only its width overlaps.
                let w = width(j);
                let cell = t.push_dot_product(all.sub(offsets[i], w), all.sub(offsets[j], w));
                out[(i, j)] = cell;
                out[(j, i)] = cell;
            }
        }
        out
    })
}
