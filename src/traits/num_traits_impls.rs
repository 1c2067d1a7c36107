use num_traits::{One, Zero};

use crate::var::Var;

// Identities are constants: no tape is needed to create them.

impl Zero for Var {
    #[inline]
    fn zero() -> Self {
        Var::constant(0.0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

impl One for Var {
    #[inline]
    fn one() -> Self {
        Var::constant(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_constants() {
        assert!(Var::zero().is_constant());
        assert!(Var::one().is_constant());
        assert!(Var::zero().is_zero());
        assert_eq!((Var::one() + Var::one()).value(), 2.0);
    }
}
