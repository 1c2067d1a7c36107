//! Reduction nodes: one node over a contiguous operand slice, one vectorized
//! local rule.

use crate::arena::{IndexSlice, ValueSlice};
use crate::node::NodeKind;
use crate::var::Var;

use super::Tape;

impl Tape {
    /// Record `Σ operandsᵢ`.
    pub fn push_sum(&mut self, operands: IndexSlice) -> Var {
        let value: f64 = self
            .arena
            .indices(operands)
            .iter()
            .map(|&k| self.nodes.values[k as usize])
            .sum();
        Var::from_tape(value, self.record(value, NodeKind::Sum { operands }))
    }

    /// Record `Σ operandsᵢ²`.
    pub fn push_dot_self(&mut self, operands: IndexSlice) -> Var {
        let value: f64 = self
            .arena
            .indices(operands)
            .iter()
            .map(|&k| {
                let v = self.nodes.values[k as usize];
                v * v
            })
            .sum();
        Var::from_tape(value, self.record(value, NodeKind::DotSelf { operands }))
    }

    /// Record `Σ lhsᵢ · rhsᵢ`. Both slices must have the same length.
    pub fn push_dot_product(&mut self, lhs: IndexSlice, rhs: IndexSlice) -> Var {
        debug_assert_eq!(lhs.len(), rhs.len());
        let values = &self.nodes.values;
        let value: f64 = self
            .arena
            .indices(lhs)
            .iter()
            .zip(self.arena.indices(rhs))
            .map(|(&a, &b)| values[a as usize] * values[b as usize])
            .sum();
        Var::from_tape(value, self.record(value, NodeKind::DotProduct { lhs, rhs }))
    }

    /// Record `Σ operandsᵢ · weightsᵢ` for constant weights.
    pub fn push_weighted_sum(&mut self, operands: IndexSlice, weights: ValueSlice) -> Var {
        debug_assert_eq!(operands.len(), weights.len());
        let value: f64 = self
            .arena
            .indices(operands)
            .iter()
            .zip(self.arena.values(weights))
            .map(|(&k, &w)| self.nodes.values[k as usize] * w)
            .sum();
        Var::from_tape(
            value,
            self.record(value, NodeKind::WeightedSum { operands, weights }),
        )
    }

    pub(super) fn propagate_sum(&mut self, adj: f64, operands: IndexSlice) {
        if adj == 0.0 {
            return;
        }
        for &k in self.arena.indices(operands) {
            self.nodes.adjoints[k as usize] += adj;
        }
    }

    pub(super) fn propagate_dot_self(&mut self, adj: f64, operands: IndexSlice) {
        if adj == 0.0 {
            return;
        }
        let twice = 2.0 * adj;
        for &k in self.arena.indices(operands) {
            let k = k as usize;
            self.nodes.adjoints[k] += twice * self.nodes.values[k];
        }
    }

    pub(super) fn propagate_dot_product(&mut self, adj: f64, lhs: IndexSlice, rhs: IndexSlice) {
        if adj == 0.0 {
            return;
        }
        for (&a, &b) in self.arena.indices(lhs).iter().zip(self.arena.indices(rhs)) {
            let (a, b) = (a as usize, b as usize);
            let (va, vb) = (self.nodes.values[a], self.nodes.values[b]);
            self.nodes.adjoints[a] += adj * vb;
            self.nodes.adjoints[b] += adj * va;
        }
    }

    pub(super) fn propagate_weighted_sum(
        &mut self,
        adj: f64,
        operands: IndexSlice,
        weights: ValueSlice,
    ) {
        if adj == 0.0 {
            return;
        }
        for (&k, &w) in self
            .arena
            .indices(operands)
            .iter()
            .zip(self.arena.values(weights))
        {
            self.nodes.adjoints[k as usize] += adj * w;
        }
    }
}
