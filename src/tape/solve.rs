//! Linear solve nodes.
//!
//! One node holds the whole solve `A · X = B`; its result cells are plain
//! leaves recorded right after it. On the reverse sweep the node gathers the
//! result adjoints into `adjX` and applies
//!
//! ```text
//! adjB += A⁻ᵀ · adjX
//! adjA -= adjB · Xᵀ
//! ```
//!
//! For triangular solves only the active triangle of `A` is stored and only
//! those entries receive adjoint.

use log::trace;
use nalgebra::DMatrix;

use crate::linalg;
use crate::matrix::MatrixV;
use crate::node::{NodeKind, SolveNode, SolveShape};
use crate::var::Var;

use super::Tape;

/// One side of a solve: either tracked cells or a plain constant matrix.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Operand<'a> {
    Var(&'a MatrixV),
    Const(&'a DMatrix<f64>),
}

impl Operand<'_> {
    pub(crate) fn nrows(&self) -> usize {
        match self {
            Operand::Var(m) => m.nrows(),
            Operand::Const(m) => m.nrows(),
        }
    }

    pub(crate) fn ncols(&self) -> usize {
        match self {
            Operand::Var(m) => m.ncols(),
            Operand::Const(m) => m.ncols(),
        }
    }

    fn values(&self) -> DMatrix<f64> {
        match self {
            Operand::Var(m) => m.map(|v| v.value),
            Operand::Const(m) => (*m).clone(),
        }
    }
}

impl Tape {
    /// Record `X = A⁻¹ · B`. Dimensions must already be validated: `A` square,
    /// `B` with as many rows as `A`.
    pub(crate) fn record_solve(
        &mut self,
        shape: SolveShape,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> MatrixV {
        let (m, n) = (b.nrows(), b.ncols());
        if m == 0 || n == 0 {
            return MatrixV::from_element(m, n, Var::default());
        }

        let av = a.values();
        let bv = b.values();
        let c = match shape {
            SolveShape::General => linalg::solve(&av, &bv),
            SolveShape::Triangular(t) => linalg::solve_triangular(t, &av, &bv),
        };

        let a_refs = match a {
            Operand::Var(vars) => {
                Some(self.alloc_operands(shape.positions(m).map(move |p| &vars[p])))
            }
            Operand::Const(_) => None,
        };
        let b_refs = match b {
            Operand::Var(vars) => Some(self.alloc_operands(vars.iter())),
            Operand::Const(_) => None,
        };
        let a_values = self.alloc_values(shape.positions(m).map(|p| av[p]));
        let c_values = self.alloc_values(c.iter().copied());

        let first_result = self.len() as u32 + 1;
        trace!(
            "solve {m}x{m} by {m}x{n} ({shape:?}), results from node {first_result}"
        );
        self.record(
            0.0,
            NodeKind::Solve(SolveNode {
                shape,
                m: m as u32,
                n: n as u32,
                a: a_values,
                c: c_values,
                a_refs,
                b_refs,
                first_result,
            }),
        );

        let nodes = &mut self.nodes;
        MatrixV::from_iterator(
            m,
            n,
            c.iter()
                .map(|&v| Var::from_tape(v, nodes.push(v, NodeKind::Leaf))),
        )
    }

    pub(super) fn propagate_solve(&mut self, node: &SolveNode) {
        let (m, n) = (node.m as usize, node.n as usize);
        let first = node.first_result as usize;
        let adj_c = DMatrix::from_column_slice(m, n, &self.nodes.adjoints[first..first + m * n]);
        if adj_c.iter().all(|&g| g == 0.0) {
            return;
        }

        let mut a = DMatrix::<f64>::zeros(m, m);
        for (p, &v) in node.shape.positions(m).zip(self.arena.values(node.a)) {
            a[p] = v;
        }
        let adj_b = match node.shape {
            SolveShape::General => linalg::solve_transpose(&a, &adj_c),
            SolveShape::Triangular(t) => linalg::solve_triangular_transpose(t, &a, &adj_c),
        };

        if let Some(refs) = node.a_refs {
            let c = DMatrix::from_column_slice(m, n, self.arena.values(node.c));
            let adj_a = -(&adj_b * c.transpose());
            for (p, &k) in node.shape.positions(m).zip(self.arena.indices(refs)) {
                self.nodes.adjoints[k as usize] += adj_a[p];
            }
        }
        if let Some(refs) = node.b_refs {
            for (&k, &g) in self.arena.indices(refs).iter().zip(adj_b.iter()) {
                self.nodes.adjoints[k as usize] += g;
            }
        }
    }
}
