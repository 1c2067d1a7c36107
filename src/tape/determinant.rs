//! Determinant and log-determinant nodes.
//!
//! Both share one payload and one rule, `adjA += s · A⁻ᵀ`, with `s = adj · det`
//! for the determinant and `s = adj` for the log-determinant.

use nalgebra::DMatrix;

use crate::linalg;
use crate::matrix::MatrixV;
use crate::node::{DeterminantNode, NodeKind};
use crate::var::Var;

use super::Tape;

impl Tape {
    /// Record `det(A)` or, with `log`, `ln |det(A)|`. `A` must be square.
    ///
    /// An empty or fully constant `A` yields a constant.
    pub(crate) fn record_determinant(&mut self, a: &MatrixV, log: bool) -> Var {
        let av = a.map(|v| v.value);
        let value = if log {
            linalg::log_abs_determinant(&av)
        } else {
            linalg::determinant(&av)
        };
        if a.iter().all(Var::is_constant) {
            return Var::constant(value);
        }

        let refs = self.alloc_operands(a.iter());
        let values = self.alloc_values(av.iter().copied());
        let node = DeterminantNode {
            n: a.nrows() as u32,
            a: values,
            refs,
        };
        let kind = if log {
            NodeKind::LogDeterminant(node)
        } else {
            NodeKind::Determinant(node)
        };
        Var::from_tape(value, self.record(value, kind))
    }

    /// `adjA += scale · A⁻ᵀ`. Callers skip nodes with a zero adjoint.
    pub(super) fn propagate_determinant(&mut self, scale: f64, node: &DeterminantNode) {
        let n = node.n as usize;
        let a = DMatrix::from_column_slice(n, n, self.arena.values(node.a));
        let inv_t = linalg::inverse(&a).transpose();
        for (&k, &g) in self.arena.indices(node.refs).iter().zip(inv_t.iter()) {
            self.nodes.adjoints[k as usize] += scale * g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn determinant_2x2() {
        let mut tape = Tape::new();
        let a = tape.variable_matrix(&DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 2.0, 4.0]));
        let d = tape.record_determinant(&a, false);
        assert_relative_eq!(d.value(), 10.0, max_relative = 1e-12);
        // d det / dA = adj(A)ᵀ = [[4, -2], [-1, 3]]
        let g = tape.gradient_matrix(d, &a);
        let expected = DMatrix::from_row_slice(2, 2, &[4.0, -2.0, -1.0, 3.0]);
        assert_relative_eq!(g, expected, epsilon = 1e-10);
    }

    #[test]
    fn log_determinant_gradient_is_inverse_transpose() {
        let mut tape = Tape::new();
        let a = tape.variable_matrix(&DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 2.0, 4.0]));
        let d = tape.record_determinant(&a, true);
        assert_relative_eq!(d.value(), 10.0_f64.ln(), max_relative = 1e-12);
        let g = tape.gradient_matrix(d, &a);
        let expected = DMatrix::from_row_slice(2, 2, &[0.4, -0.2, -0.1, 0.3]);
        assert_relative_eq!(g, expected, epsilon = 1e-10);
    }

    #[test]
    fn constant_matrix_records_nothing() {
        let mut tape = Tape::new();
        let a = DMatrix::from_element(2, 2, Var::constant(1.0));
        let d = tape.record_determinant(&a, false);
        assert!(d.is_constant());
        assert!(tape.is_empty());
    }
}
