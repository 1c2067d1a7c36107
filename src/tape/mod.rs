//! The tape: every node in creation order, replayed backwards.
//!
//! Nodes live in three parallel columns (primal value, adjoint, kind) and are
//! addressed by their position. Because an expression can only refer to nodes
//! that already exist, creation order is a topological order, and a single
//! descending pass over the columns visits every node before any of its
//! operands.
//!
//! Variable-length payloads (operand lists, primal matrix copies) live in the
//! tape's [`Arena`]. A [`TapeMark`] snapshots both the node count and the
//! arena position, so a nested computation is undone by one truncation.

use log::trace;
use nalgebra::DMatrix;

use crate::arena::{Arena, ArenaMark, IndexSlice, ValueSlice};
use crate::config::TapeConfig;
use crate::matrix::MatrixV;
use crate::node::NodeKind;
use crate::var::Var;

// Submodules add construction and propagation rules to `Tape`.
mod determinant;
mod reduce;
mod solve;

mod thread_local;
pub(crate) use self::solve::Operand;
pub use self::thread_local::{is_active, try_with_active_tape, with_active_tape, Nested, TapeGuard};

/// Sentinel index for a constant (no node on the tape).
pub const CONSTANT: u32 = u32::MAX;

/// Snapshot of a tape position: node count plus arena position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TapeMark {
    nodes: u32,
    arena: ArenaMark,
}

impl TapeMark {
    /// The mark of an empty tape.
    pub fn start() -> Self {
        Self::default()
    }

    /// Number of nodes recorded when the mark was taken.
    pub fn nodes(&self) -> usize {
        self.nodes as usize
    }
}

/// Node columns.
#[derive(Debug, Default)]
struct Nodes {
    values: Vec<f64>,
    adjoints: Vec<f64>,
    kinds: Vec<NodeKind>,
}

impl Nodes {
    fn with_capacity(n: usize) -> Self {
        Nodes {
            values: Vec::with_capacity(n),
            adjoints: Vec::with_capacity(n),
            kinds: Vec::with_capacity(n),
        }
    }

    #[inline]
    fn push(&mut self, value: f64, kind: NodeKind) -> u32 {
        let idx = self.values.len();
        assert!(idx < CONSTANT as usize, "tape index space exhausted");
        self.values.push(value);
        self.adjoints.push(0.0);
        self.kinds.push(kind);
        idx as u32
    }

    /// Node index of `v`, promoting a constant to a fresh leaf.
    #[inline]
    fn operand(&mut self, v: &Var) -> u32 {
        if v.is_constant() {
            self.push(v.value, NodeKind::Leaf)
        } else {
            v.index
        }
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
        self.adjoints.truncate(len);
        self.kinds.truncate(len);
    }
}

/// Reverse-mode tape.
///
/// Construction appends nodes; [`gradient`](Tape::gradient) seeds an output
/// and sweeps backwards. Single-threaded: each thread (or worker) owns its own
/// tape.
#[derive(Debug, Default)]
pub struct Tape {
    nodes: Nodes,
    arena: Arena,
}

impl Tape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &TapeConfig) -> Self {
        Tape {
            nodes: Nodes::with_capacity(config.nodes),
            arena: Arena::with_capacity(config.indices, config.values),
        }
    }

    /// Number of recorded nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.values.is_empty()
    }

    /// The tape's payload arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Register a new independent variable.
    #[inline]
    pub fn new_variable(&mut self, value: f64) -> Var {
        Var::from_tape(value, self.nodes.push(value, NodeKind::Leaf))
    }

    pub fn new_variables(&mut self, values: &[f64]) -> Vec<Var> {
        values.iter().map(|&v| self.new_variable(v)).collect()
    }

    /// Register every entry of `values` as an independent variable
    /// (column-major creation order).
    pub fn variable_matrix(&mut self, values: &DMatrix<f64>) -> MatrixV {
        values.map(|v| self.new_variable(v))
    }

    /// Append a node and return its index.
    #[inline]
    pub fn record(&mut self, value: f64, kind: NodeKind) -> u32 {
        self.nodes.push(value, kind)
    }

    /// Record `result = f(operand)` with precomputed `multiplier = df/d(operand)`.
    #[inline]
    pub fn push_unary(&mut self, value: f64, operand: u32, multiplier: f64) -> u32 {
        self.nodes.push(
            value,
            NodeKind::Unary {
                operand,
                multiplier,
            },
        )
    }

    /// Record a binary operation with precomputed partial derivatives.
    /// Either operand may be [`CONSTANT`].
    #[inline]
    pub fn push_binary(
        &mut self,
        value: f64,
        lhs: u32,
        lhs_mult: f64,
        rhs: u32,
        rhs_mult: f64,
    ) -> u32 {
        self.nodes.push(
            value,
            NodeKind::Binary {
                lhs,
                lhs_mult,
                rhs,
                rhs_mult,
            },
        )
    }

    /// Copy the node indices of `vars` into the arena, promoting constants
    /// to leaves on the way.
    pub fn alloc_operands<'a>(&mut self, vars: impl IntoIterator<Item = &'a Var>) -> IndexSlice {
        let nodes = &mut self.nodes;
        self.arena
            .alloc_indices(vars.into_iter().map(|v| nodes.operand(v)))
    }

    /// Copy primal values into the arena.
    pub fn alloc_values(&mut self, values: impl IntoIterator<Item = f64>) -> ValueSlice {
        self.arena.alloc_values(values)
    }

    /// Primal value of node `index`.
    #[inline]
    pub fn value(&self, index: u32) -> f64 {
        self.nodes.values[index as usize]
    }

    /// Current adjoint of `v` (zero for constants).
    #[inline]
    pub fn adjoint(&self, v: Var) -> f64 {
        if v.is_constant() {
            0.0
        } else {
            self.nodes.adjoints[v.index as usize]
        }
    }

    /// Add `delta` to the adjoint of `v`. Constants are ignored.
    #[inline]
    pub fn accumulate_adjoint(&mut self, v: Var, delta: f64) {
        if !v.is_constant() {
            self.nodes.adjoints[v.index as usize] += delta;
        }
    }

    /// Current position.
    #[inline]
    pub fn mark(&self) -> TapeMark {
        TapeMark {
            nodes: self.len() as u32,
            arena: self.arena.mark(),
        }
    }

    /// Drop every node and arena payload recorded after `mark`.
    ///
    /// `Var`s created after the mark must not be used afterwards.
    pub fn truncate(&mut self, mark: TapeMark) {
        trace!(
            "truncating tape from {} to {} nodes",
            self.len(),
            mark.nodes
        );
        self.nodes.truncate(mark.nodes as usize);
        self.arena.release_to(mark.arena);
    }

    /// Drop everything (keeps capacity).
    pub fn clear(&mut self) {
        self.truncate(TapeMark::start());
    }

    /// Run `f` as a nested computation and roll the tape back afterwards.
    ///
    /// Nodes recorded before the call are untouched. The result must not hold
    /// `Var`s created inside `f`.
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Tape) -> R) -> R {
        let mark = self.mark();
        let out = f(self);
        self.truncate(mark);
        out
    }

    pub fn zero_adjoints(&mut self) {
        self.nodes.adjoints.fill(0.0);
    }

    /// Zero the adjoints of every node recorded at or after `mark`.
    pub fn zero_adjoints_from(&mut self, mark: TapeMark) {
        let start = (mark.nodes as usize).min(self.len());
        self.nodes.adjoints[start..].fill(0.0);
    }

    /// Apply the chain rule of every node in `[to, from)`, highest index first.
    pub fn reverse_sweep(&mut self, from: usize, to: usize) {
        for i in (to..from).rev() {
            self.propagate(i);
        }
    }

    /// Set the adjoint of `seed` to `seed_adjoint` and sweep from `from` down
    /// to the start of the tape. Adjoints are not cleared first.
    pub fn reverse_propagate(&mut self, from: TapeMark, seed: Var, seed_adjoint: f64) {
        if !seed.is_constant() {
            self.nodes.adjoints[seed.index as usize] = seed_adjoint;
        }
        self.reverse_sweep(from.nodes as usize, 0);
    }

    /// Zero all adjoints, seed `seed` with 1 and sweep the whole tape.
    /// Returns the full adjoint vector.
    pub fn reverse(&mut self, seed: Var) -> Vec<f64> {
        self.zero_adjoints();
        self.reverse_propagate(self.mark(), seed, 1.0);
        self.nodes.adjoints.clone()
    }

    /// Gradient of `output` with respect to `inputs` over the whole tape.
    pub fn gradient(&mut self, output: Var, inputs: &[Var]) -> Vec<f64> {
        self.gradient_since(TapeMark::start(), output, inputs)
    }

    /// Gradient of `output` with respect to `inputs`, sweeping only the nodes
    /// recorded at or after `mark`.
    ///
    /// Adjoints from `mark` on, and the inputs' own adjoints, are zeroed
    /// first, so repeated calls on the same tape are independent.
    pub fn gradient_since(&mut self, mark: TapeMark, output: Var, inputs: &[Var]) -> Vec<f64> {
        self.zero_adjoints_from(mark);
        for v in inputs.iter().filter(|v| !v.is_constant()) {
            self.nodes.adjoints[v.index as usize] = 0.0;
        }
        if output.is_constant() {
            return vec![0.0; inputs.len()];
        }
        self.nodes.adjoints[output.index as usize] = 1.0;

        let from = self.len();
        trace!("reverse sweep over nodes {}..{}", mark.nodes, from);
        self.reverse_sweep(from, mark.nodes as usize);

        inputs.iter().map(|&v| self.adjoint(v)).collect()
    }

    /// Gradient of `output` with respect to every cell of `inputs`.
    pub fn gradient_matrix(&mut self, output: Var, inputs: &MatrixV) -> DMatrix<f64> {
        let grad = self.gradient(output, inputs.as_slice());
        DMatrix::from_vec(inputs.nrows(), inputs.ncols(), grad)
    }

    /// One chain-rule step for node `i`. Never writes node `i`'s own adjoint.
    fn propagate(&mut self, i: usize) {
        let adj = self.nodes.adjoints[i];
        match self.nodes.kinds[i] {
            NodeKind::Leaf => {}
            NodeKind::Unary {
                operand,
                multiplier,
            } => {
                if adj != 0.0 && operand != CONSTANT {
                    self.nodes.adjoints[operand as usize] += multiplier * adj;
                }
            }
            NodeKind::Binary {
                lhs,
                lhs_mult,
                rhs,
                rhs_mult,
            } => {
                if adj != 0.0 {
                    if lhs != CONSTANT {
                        self.nodes.adjoints[lhs as usize] += lhs_mult * adj;
                    }
                    if rhs != CONSTANT {
                        self.nodes.adjoints[rhs as usize] += rhs_mult * adj;
                    }
                }
            }
            NodeKind::Sum { operands } => self.propagate_sum(adj, operands),
            NodeKind::DotSelf { operands } => self.propagate_dot_self(adj, operands),
            NodeKind::DotProduct { lhs, rhs } => self.propagate_dot_product(adj, lhs, rhs),
            NodeKind::WeightedSum { operands, weights } => {
                self.propagate_weighted_sum(adj, operands, weights)
            }
            NodeKind::Solve(node) => self.propagate_solve(&node),
            // The skip is on the node's own adjoint: a zero determinant must
            // still reach `A⁻ᵀ`, which is NaN for a singular `A`.
            NodeKind::Determinant(node) => {
                if adj != 0.0 {
                    let scale = adj * self.nodes.values[i];
                    self.propagate_determinant(scale, &node);
                }
            }
            NodeKind::LogDeterminant(node) => {
                if adj != 0.0 {
                    self.propagate_determinant(adj, &node);
                }
            }
        }
    }
}
