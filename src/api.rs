use nalgebra::DMatrix;

use crate::config::TapeConfig;
use crate::matrix::MatrixV;
use crate::tape::{self, Tape, TapeGuard};
use crate::var::Var;

/// Gradient of `output` with respect to `inputs` on the active tape.
///
/// Panics if no tape is active.
pub fn gradient(output: Var, inputs: &[Var]) -> Vec<f64> {
    tape::with_active_tape(|t| t.gradient(output, inputs))
}

/// Gradient of `output` with respect to every cell of `inputs` on the active
/// tape.
pub fn gradient_matrix(output: Var, inputs: &MatrixV) -> DMatrix<f64> {
    tape::with_active_tape(|t| t.gradient_matrix(output, inputs))
}

/// Compute the gradient of a scalar function `f : R^n → R` using reverse mode.
///
/// ```
/// let g = revmat::grad(|x: &[revmat::Var]| {
///     revmat::matrix::dot_self(x)
/// }, &[3.0, 4.0]);
/// assert!((g[0] - 6.0).abs() < 1e-10);
/// assert!((g[1] - 8.0).abs() < 1e-10);
/// ```
pub fn grad(f: impl FnOnce(&[Var]) -> Var, x: &[f64]) -> Vec<f64> {
    let mut tape = Tape::with_config(&TapeConfig::for_inputs(x.len()));
    let inputs = tape.new_variables(x);

    let output = {
        let _guard = TapeGuard::new(&mut tape);
        f(&inputs)
    };
    tape.gradient(output, &inputs)
}

/// Value and gradient of a scalar function of a matrix.
///
/// ```
/// use nalgebra::DMatrix;
///
/// let a = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 2.0, 4.0]);
/// let (det, g) = revmat::grad_matrix(|a| revmat::matrix::determinant(a).unwrap(), &a);
/// assert!((det - 10.0).abs() < 1e-10);
/// assert!((g[(0, 0)] - 4.0).abs() < 1e-10);
/// ```
pub fn grad_matrix(f: impl FnOnce(&MatrixV) -> Var, a: &DMatrix<f64>) -> (f64, DMatrix<f64>) {
    let mut tape = Tape::with_config(&TapeConfig::for_inputs(a.len()));
    let inputs = tape.variable_matrix(a);

    let output = {
        let _guard = TapeGuard::new(&mut tape);
        f(&inputs)
    };
    (output.value(), tape.gradient_matrix(output, &inputs))
}

/// Vector-Jacobian product (reverse mode): `(f(x), wᵀ·J)`.
///
/// Evaluates `f` at `x` and computes the adjoint product with weights `w`.
pub fn vjp(f: impl FnOnce(&[Var]) -> Vec<Var>, x: &[f64], w: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut tape = Tape::with_config(&TapeConfig::for_inputs(x.len()));
    let inputs = tape.new_variables(x);

    let outputs = {
        let _guard = TapeGuard::new(&mut tape);
        f(&inputs)
    };
    assert_eq!(
        outputs.len(),
        w.len(),
        "output length must match weight vector length"
    );

    let values = outputs.iter().map(Var::value).collect();
    // Seed every output with its weight. Repeated outputs accumulate.
    tape.zero_adjoints();
    for (&out, &wi) in outputs.iter().zip(w) {
        tape.accumulate_adjoint(out, wi);
    }
    let len = tape.len();
    tape.reverse_sweep(len, 0);
    let grad = inputs.iter().map(|&v| tape.adjoint(v)).collect();
    (values, grad)
}
