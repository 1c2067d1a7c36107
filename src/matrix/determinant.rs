use crate::error::Result;
use crate::tape::with_active_tape;
use crate::validate::check_square;
use crate::var::Var;

use super::MatrixV;

/// `det(A)`.
pub fn determinant(a: &MatrixV) -> Result<Var> {
    check_square("determinant", a.shape())?;
    Ok(with_active_tape(|t| t.record_determinant(a, false)))
}

/// `ln |det(A)|`, computed from the LU factor so it stays finite where the
/// determinant itself would overflow or underflow.
pub fn log_determinant(a: &MatrixV) -> Result<Var> {
    check_square("log_determinant", a.shape())?;
    Ok(with_active_tape(|t| t.record_determinant(a, true)))
}
