use std::fmt::{self, Display};

use crate::tape::CONSTANT;

/// Reverse-mode AD variable.
///
/// Just a value and a tape index: 16 bytes. `Copy` because the node (and its
/// adjoint) lives on the tape, not inside this struct. Two copies of a `Var`
/// refer to the same node, so adjoint contributions from either land in one
/// place.
#[derive(Clone, Copy, Debug)]
pub struct Var {
    pub(crate) value: f64,
    pub(crate) index: u32,
}

impl Var {
    /// Create a constant (not tracked on tape).
    #[inline]
    pub fn constant(value: f64) -> Self {
        Var {
            value,
            index: CONSTANT,
        }
    }

    /// Create a variable from a tape allocation.
    /// Typically only used internally by the tape and tests.
    #[inline]
    pub fn from_tape(value: f64, index: u32) -> Self {
        Var { value, index }
    }

    /// Primal value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Tape index (for advanced usage / testing).
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.index == CONSTANT
    }

    /// Whether `self` and `other` are backed by the same tape node.
    #[inline]
    pub fn same_node(&self, other: &Var) -> bool {
        !self.is_constant() && self.index == other.index
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Default for Var {
    fn default() -> Self {
        Var::constant(0.0)
    }
}

impl From<f64> for Var {
    fn from(value: f64) -> Self {
        Var::constant(value)
    }
}

// Comparisons look at primal values only.
impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for Var {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}
