#![allow(dead_code)]

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revmat::{grad_matrix, MatrixV, Tape, TapeGuard, Var};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Entries uniform in `[-1, 1)`.
pub fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0..1.0))
}

/// Diagonally dominant, hence comfortably invertible.
pub fn well_conditioned(rng: &mut StdRng, n: usize) -> DMatrix<f64> {
    let mut a = random_matrix(rng, n, n);
    for i in 0..n {
        a[(i, i)] += n as f64 + 1.0;
    }
    a
}

/// Evaluate `f` at `a` on a throwaway tape.
pub fn eval(f: impl Fn(&MatrixV) -> Var, a: &DMatrix<f64>) -> f64 {
    let mut tape = Tape::new();
    let x = tape.variable_matrix(a);
    let _guard = TapeGuard::new(&mut tape);
    f(&x).value()
}

/// Central finite differences of `f` at `a`, one entry at a time.
pub fn finite_diff(f: impl Fn(&MatrixV) -> Var, a: &DMatrix<f64>) -> DMatrix<f64> {
    let h = 1e-6;
    let mut g = DMatrix::<f64>::zeros(a.nrows(), a.ncols());
    for k in 0..a.len() {
        let mut plus = a.clone();
        plus[k] += h;
        let mut minus = a.clone();
        minus[k] -= h;
        g[k] = (eval(&f, &plus) - eval(&f, &minus)) / (2.0 * h);
    }
    g
}

/// Reverse-mode gradient of `f` at `a` must agree with finite differences.
pub fn check_gradient(f: impl Fn(&MatrixV) -> Var, a: &DMatrix<f64>, tol: f64) {
    let (_, g) = grad_matrix(&f, a);
    let fd = finite_diff(&f, a);
    for k in 0..a.len() {
        assert_relative_eq!(g[k], fd[k], epsilon = tol, max_relative = tol);
    }
}
