/// Initial capacities for a [`Tape`](crate::tape::Tape).
///
/// Only a sizing hint: the tape grows past these on demand. Pre-sizing avoids
/// reallocation churn when the same model is evaluated many times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeConfig {
    /// Node slots (values, adjoints, kinds).
    pub nodes: usize,
    /// Operand index pool entries.
    pub indices: usize,
    /// Primal value pool entries.
    pub values: usize,
}

impl Default for TapeConfig {
    fn default() -> Self {
        TapeConfig {
            nodes: 1024,
            indices: 4096,
            values: 4096,
        }
    }
}

impl TapeConfig {
    /// Sizing heuristic for a function of `n` inputs.
    pub fn for_inputs(n: usize) -> Self {
        TapeConfig {
            nodes: n * 10,
            indices: n * 20,
            values: n * 20,
        }
    }
}
