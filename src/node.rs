//! Node kinds: the local chain-rule step each tape entry performs.
//!
//! A node's primal value and adjoint live in the tape's parallel columns; the
//! kind only says how the node's adjoint is pushed to its operands. Payloads
//! are arena handles, so every kind is `Copy` and the reverse sweep is a
//! single `match`.

use crate::arena::{IndexSlice, ValueSlice};
use crate::linalg::Triangle;

/// Which solver a [`SolveNode`] was built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveShape {
    General,
    Triangular(Triangle),
}

impl SolveShape {
    /// Whether `(row, col)` of the coefficient matrix takes part in the solve.
    #[inline]
    pub fn contains(self, row: usize, col: usize) -> bool {
        match self {
            SolveShape::General => true,
            SolveShape::Triangular(t) => t.contains(row, col),
        }
    }

    /// Active `(row, col)` positions of an `m x m` coefficient matrix in
    /// column-major order. This is the layout of the stored primal copy and of
    /// the operand back-references.
    pub fn positions(self, m: usize) -> impl Iterator<Item = (usize, usize)> {
        (0..m)
            .flat_map(move |j| (0..m).map(move |i| (i, j)))
            .filter(move |&(i, j)| self.contains(i, j))
    }
}

/// Payload of a linear solve `A · X = B`.
///
/// The `m * n` result cells are recorded as leaves directly after the solve
/// node; cell `k` (column-major) is node `first_result + k`.
#[derive(Clone, Copy, Debug)]
pub struct SolveNode {
    pub shape: SolveShape,
    pub m: u32,
    pub n: u32,
    /// Active entries of primal `A`, column-major.
    pub a: ValueSlice,
    /// Primal solution `X`, column-major.
    pub c: ValueSlice,
    /// Operand nodes of `A`, same layout as `a`. `None` when `A` is constant.
    pub a_refs: Option<IndexSlice>,
    /// Operand nodes of `B`, column-major. `None` when `B` is constant.
    pub b_refs: Option<IndexSlice>,
    pub first_result: u32,
}

/// Payload of a determinant or log-determinant.
#[derive(Clone, Copy, Debug)]
pub struct DeterminantNode {
    pub n: u32,
    /// Primal `A`, column-major.
    pub a: ValueSlice,
    /// Operand nodes of `A`, column-major.
    pub refs: IndexSlice,
}

#[derive(Clone, Copy, Debug)]
pub enum NodeKind {
    /// Independent input, promoted constant, or solve result cell.
    Leaf,
    Unary {
        operand: u32,
        multiplier: f64,
    },
    Binary {
        lhs: u32,
        lhs_mult: f64,
        rhs: u32,
        rhs_mult: f64,
    },
    Sum {
        operands: IndexSlice,
    },
    DotSelf {
        operands: IndexSlice,
    },
    DotProduct {
        lhs: IndexSlice,
        rhs: IndexSlice,
    },
    /// Dot product of operand nodes with a constant weight vector.
    WeightedSum {
        operands: IndexSlice,
        weights: ValueSlice,
    },
    Solve(SolveNode),
    Determinant(DeterminantNode),
    LogDeterminant(DeterminantNode),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_positions_cover_matrix_column_major() {
        let p: Vec<_> = SolveShape::General.positions(2).collect();
        assert_eq!(p, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn triangular_positions() {
        let lower: Vec<_> = SolveShape::Triangular(Triangle::Lower).positions(3).collect();
        assert_eq!(lower, vec![(0, 0), (1, 0), (2, 0), (1, 1), (2, 1), (2, 2)]);
        let upper: Vec<_> = SolveShape::Triangular(Triangle::Upper).positions(3).collect();
        assert_eq!(upper, vec![(0, 0), (0, 1), (1, 1), (0, 2), (1, 2), (2, 2)]);
    }
}
