//! Shape predicates used by the construction entry points.
//!
//! Each check names the operation it guards so the error reads like
//! `"mdivide_left: expected a square matrix, got 2x3"`.

use crate::error::{MatrixError, Result};

/// `(rows, cols)` must describe a square matrix.
pub fn check_square(op: &'static str, (rows, cols): (usize, usize)) -> Result<()> {
    if rows != cols {
        return Err(MatrixError::NotSquare { op, rows, cols });
    }
    Ok(())
}

/// `lhs · rhs` must be defined: `lhs.cols == rhs.rows`.
pub fn check_multiplicable(
    op: &'static str,
    (lhs_rows, lhs_cols): (usize, usize),
    (rhs_rows, rhs_cols): (usize, usize),
) -> Result<()> {
    if lhs_cols != rhs_rows {
        return Err(MatrixError::NotMultiplicable {
            op,
            lhs_rows,
            lhs_cols,
            rhs_rows,
            rhs_cols,
        });
    }
    Ok(())
}

pub fn check_matching_sizes(op: &'static str, lhs: usize, rhs: usize) -> Result<()> {
    if lhs != rhs {
        return Err(MatrixError::SizeMismatch { op, lhs, rhs });
    }
    Ok(())
}

/// `(rows, cols)` must describe a row or column vector.
pub fn check_vector(op: &'static str, (rows, cols): (usize, usize)) -> Result<()> {
    if rows != 1 && cols != 1 {
        return Err(MatrixError::NotVector { op, rows, cols });
    }
    Ok(())
}
