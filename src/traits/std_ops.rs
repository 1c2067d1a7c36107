use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::tape;
use crate::var::Var;

/// Record a binary node on the active tape, or fold to a constant when both
/// sides are constant.
#[inline]
fn binary(lhs: Var, rhs: Var, value: f64, lhs_mult: f64, rhs_mult: f64) -> Var {
    if lhs.is_constant() && rhs.is_constant() {
        return Var::constant(value);
    }
    let index =
        tape::with_active_tape(|t| t.push_binary(value, lhs.index, lhs_mult, rhs.index, rhs_mult));
    Var::from_tape(value, index)
}

#[inline]
fn unary(x: Var, value: f64, multiplier: f64) -> Var {
    if x.is_constant() {
        return Var::constant(value);
    }
    let index = tape::with_active_tape(|t| t.push_unary(value, x.index, multiplier));
    Var::from_tape(value, index)
}

impl Add for Var {
    type Output = Var;
    #[inline]
    fn add(self, rhs: Var) -> Var {
        binary(self, rhs, self.value + rhs.value, 1.0, 1.0)
    }
}

impl Sub for Var {
    type Output = Var;
    #[inline]
    fn sub(self, rhs: Var) -> Var {
        binary(self, rhs, self.value - rhs.value, 1.0, -1.0)
    }
}

impl Mul for Var {
    type Output = Var;
    #[inline]
    fn mul(self, rhs: Var) -> Var {
        binary(self, rhs, self.value * rhs.value, rhs.value, self.value)
    }
}

impl Div for Var {
    type Output = Var;
    #[inline]
    fn div(self, rhs: Var) -> Var {
        let inv = 1.0 / rhs.value;
        let value = self.value * inv;
        binary(self, rhs, value, inv, -value * inv)
    }
}

impl Neg for Var {
    type Output = Var;
    #[inline]
    fn neg(self) -> Var {
        unary(self, -self.value, -1.0)
    }
}

impl Add<f64> for Var {
    type Output = Var;
    #[inline]
    fn add(self, rhs: f64) -> Var {
        unary(self, self.value + rhs, 1.0)
    }
}

impl Add<Var> for f64 {
    type Output = Var;
    #[inline]
    fn add(self, rhs: Var) -> Var {
        unary(rhs, self + rhs.value, 1.0)
    }
}

impl Sub<f64> for Var {
    type Output = Var;
    #[inline]
    fn sub(self, rhs: f64) -> Var {
        unary(self, self.value - rhs, 1.0)
    }
}

impl Sub<Var> for f64 {
    type Output = Var;
    #[inline]
    fn sub(self, rhs: Var) -> Var {
        unary(rhs, self - rhs.value, -1.0)
    }
}

impl Mul<f64> for Var {
    type Output = Var;
    #[inline]
    fn mul(self, rhs: f64) -> Var {
        unary(self, self.value * rhs, rhs)
    }
}

impl Mul<Var> for f64 {
    type Output = Var;
    #[inline]
    fn mul(self, rhs: Var) -> Var {
        unary(rhs, self * rhs.value, self)
    }
}

impl Div<f64> for Var {
    type Output = Var;
    #[inline]
    fn div(self, rhs: f64) -> Var {
        let inv = 1.0 / rhs;
        unary(self, self.value * inv, inv)
    }
}

impl Div<Var> for f64 {
    type Output = Var;
    #[inline]
    fn div(self, rhs: Var) -> Var {
        let inv = 1.0 / rhs.value;
        let value = self * inv;
        unary(rhs, value, -value * inv)
    }
}

macro_rules! impl_assign_ops {
    ($($trait:ident, $method:ident, $op:tt;)*) => {
        $(
            impl $trait for Var {
                #[inline]
                fn $method(&mut self, rhs: Var) {
                    *self = *self $op rhs;
                }
            }

            impl $trait<f64> for Var {
                #[inline]
                fn $method(&mut self, rhs: f64) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

impl_assign_ops! {
    AddAssign, add_assign, +;
    SubAssign, sub_assign, -;
    MulAssign, mul_assign, *;
    DivAssign, div_assign, /;
}

impl std::iter::Sum for Var {
    /// Chained binary additions. Prefer [`crate::matrix::sum`] for long
    /// sequences: it records a single node.
    fn sum<I: Iterator<Item = Var>>(iter: I) -> Var {
        iter.fold(Var::constant(0.0), |acc, x| acc + x)
    }
}
