mod common;

use approx::assert_relative_eq;
use common::*;
use nalgebra::DMatrix;
use revmat::matrix::{determinant, log_determinant};
use revmat::tape::{Tape, TapeGuard};
use revmat::{grad_matrix, MatrixError, MatrixV};

#[test]
fn log_determinant_matches_log_abs_determinant() {
    for n in 1..=6 {
        let mut rng = rng(300 + n as u64);
        let a = well_conditioned(&mut rng, n);
        let (det, _) = grad_matrix(|x| determinant(x).unwrap(), &a);
        let (log_det, _) = grad_matrix(|x| log_determinant(x).unwrap(), &a);
        assert_relative_eq!(log_det, det.abs().ln(), max_relative = 1e-10);
    }
}

#[test]
fn log_determinant_gradient_is_determinant_gradient_over_det() {
    let mut rng = rng(31);
    let a = well_conditioned(&mut rng, 4);
    let (det, g_det) = grad_matrix(|x| determinant(x).unwrap(), &a);
    let (_, g_log) = grad_matrix(|x| log_determinant(x).unwrap(), &a);
    assert_relative_eq!(g_log, g_det / det, epsilon = 1e-12, max_relative = 1e-10);
}

#[test]
fn determinant_gradient_matches_finite_differences() {
    for n in 2..=5 {
        let mut rng = rng(320 + n as u64);
        let a = well_conditioned(&mut rng, n);
        check_gradient(|x| determinant(x).unwrap(), &a, 1e-5);
        check_gradient(|x| log_determinant(x).unwrap(), &a, 1e-5);
    }
}

#[test]
fn negative_determinant() {
    // det = -6, ln|det| = ln 6
    let a = DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 3.0, 0.0]);
    let (value, g) = grad_matrix(|x| log_determinant(x).unwrap(), &a);
    assert_relative_eq!(value, 6.0_f64.ln(), max_relative = 1e-12);
    // A⁻ᵀ = [[0, 1/2], [1/3, 0]]
    let expected = DMatrix::from_row_slice(2, 2, &[0.0, 0.5, 1.0 / 3.0, 0.0]);
    assert_relative_eq!(g, expected, epsilon = 1e-12);
    check_gradient(|x| determinant(x).unwrap(), &a, 1e-6);
}

#[test]
fn non_square_is_rejected() {
    let mut tape = Tape::new();
    let a = tape.variable_matrix(&DMatrix::from_element(2, 3, 1.0));
    let before = tape.len();
    let err = {
        let _guard = TapeGuard::new(&mut tape);
        log_determinant(&a).unwrap_err()
    };
    assert_eq!(
        err,
        MatrixError::NotSquare {
            op: "log_determinant",
            rows: 2,
            cols: 3
        }
    );
    assert_eq!(tape.len(), before);
}

#[test]
fn empty_matrix_determinant_is_one() {
    let mut tape = Tape::new();
    let _guard = TapeGuard::new(&mut tape);
    let a = MatrixV::from_element(0, 0, Default::default());
    let d = determinant(&a).unwrap();
    assert!(d.is_constant());
    assert_eq!(d.value(), 1.0);
}

#[test]
fn singular_matrix_gradients_are_nan() {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);

    let (det, g) = grad_matrix(|x| determinant(x).unwrap(), &a);
    assert_eq!(det, 0.0);
    assert!(g.iter().all(|v| v.is_nan()));

    let (log_det, g) = grad_matrix(|x| log_determinant(x).unwrap(), &a);
    assert_eq!(log_det, f64::NEG_INFINITY);
    assert!(g.iter().all(|v| v.is_nan()));
}

#[test]
fn unreached_determinant_leaves_operands_alone() {
    // The determinant is recorded but the output does not depend on it.
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
    let (_, g) = grad_matrix(
        |x| {
            let _ = determinant(x).unwrap();
            x[(0, 0)] * 3.0
        },
        &a,
    );
    assert_eq!(g, DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, 0.0]));
}
