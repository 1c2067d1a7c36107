//! Primal dense linear algebra on plain `f64` matrices.
//!
//! Thin contract layer over nalgebra: the AD nodes only ever call these
//! functions, so they see one convention for singular inputs. When nalgebra
//! reports failure the result is filled with NaN (and a warning is logged),
//! which then flows through values and adjoints like any other non-finite
//! number.

use log::warn;
use nalgebra::DMatrix;

/// Which triangle of a matrix a triangular solve reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Triangle {
    Lower,
    Upper,
}

impl Triangle {
    /// Whether `(row, col)` lies in this triangle (diagonal included).
    #[inline]
    pub fn contains(self, row: usize, col: usize) -> bool {
        match self {
            Triangle::Lower => row >= col,
            Triangle::Upper => row <= col,
        }
    }
}

fn nan_matrix(op: &str, rows: usize, cols: usize) -> DMatrix<f64> {
    warn!("{op}: matrix is singular, result filled with NaN");
    DMatrix::from_element(rows, cols, f64::NAN)
}

/// Solve `a · x = b` with a partially pivoted LU decomposition.
pub fn solve(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    a.clone()
        .lu()
        .solve(b)
        .unwrap_or_else(|| nan_matrix("solve", b.nrows(), b.ncols()))
}

/// Solve `aᵀ · x = b`.
pub fn solve_transpose(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    a.transpose()
        .lu()
        .solve(b)
        .unwrap_or_else(|| nan_matrix("solve_transpose", b.nrows(), b.ncols()))
}

/// Solve `a · x = b` reading only `triangle` of `a`.
pub fn solve_triangular(triangle: Triangle, a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let x = match triangle {
        Triangle::Lower => a.solve_lower_triangular(b),
        Triangle::Upper => a.solve_upper_triangular(b),
    };
    x.unwrap_or_else(|| nan_matrix("solve_triangular", b.nrows(), b.ncols()))
}

/// Solve `aᵀ · x = b` reading only `triangle` of `a`.
pub fn solve_triangular_transpose(
    triangle: Triangle,
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
) -> DMatrix<f64> {
    // The transpose of a lower-triangular matrix is upper-triangular.
    let at = a.transpose();
    let x = match triangle {
        Triangle::Lower => at.solve_upper_triangular(b),
        Triangle::Upper => at.solve_lower_triangular(b),
    };
    x.unwrap_or_else(|| nan_matrix("solve_triangular_transpose", b.nrows(), b.ncols()))
}

pub fn inverse(a: &DMatrix<f64>) -> DMatrix<f64> {
    a.clone()
        .try_inverse()
        .unwrap_or_else(|| nan_matrix("inverse", a.nrows(), a.ncols()))
}

pub fn determinant(a: &DMatrix<f64>) -> f64 {
    if a.is_empty() {
        return 1.0;
    }
    a.determinant()
}

/// `ln |det(a)|` from the diagonal of the LU factor, so large matrices do not
/// overflow the way `determinant(a).abs().ln()` would.
pub fn log_abs_determinant(a: &DMatrix<f64>) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let lu = a.clone().lu();
    lu.u().diagonal().iter().map(|d| d.abs().ln()).sum()
}
