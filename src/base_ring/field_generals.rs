use core::fmt::{Debug, Display};
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use num::{One, Zero};

use crate::error::{AlgebraError, AlgebraResult};

pub trait Commutative: Mul<Output = Self> + Sized {}

pub type IntegerType = i64;

pub trait Ring:
    Add<Output = Self>
    + AddAssign<Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<Output = Self>
    + PartialEq
    + From<IntegerType>
    + Clone
    + Debug
    + Sized
{
    #[must_use]
    fn characteristic(primes: Box<dyn Iterator<Item = IntegerType>>) -> IntegerType {
        let zero_f = Self::from(0);
        for i in primes {
            if Self::from(i) == zero_f {
                return i;
            }
        }
        0
    }

    #[must_use]
    fn ring_one() -> Self {
        1.into()
    }

    /// by default nothing is invertible
    /// override with inverse if it exists
    #[must_use]
    fn try_inverse(self) -> Option<Self> {
        None
    }

    /// `x *= y`
    /// but not `MulAssign` because `other` is not owned
    fn mul_assign_borrow(&mut self, other: &Self);

    /// `(-1)^exponent` embedded in the ring
    #[must_use]
    fn sign(exponent: IntegerType) -> Self {
        if exponent.rem_euclid(2) == 0 {
            Self::ring_one()
        } else {
            -Self::ring_one()
        }
    }
}

/// The coefficient fields the linear algebra is written against.
pub trait Field: Ring + Div<Output = Self> + Commutative + Zero + One + Display {
    /// if implement Field, this will be used instead of `try_inverse` of Ring
    /// and it will just use the `Div` implementation
    fn try_inverse(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(<Self as Ring>::ring_one() / self)
        }
    }

    /// checked `self / rhs`
    /// # Errors
    /// `DivisionByZero` when `rhs` is zero
    fn try_divide(self, rhs: Self) -> AlgebraResult<Self> {
        if rhs.is_zero() {
            Err(AlgebraError::DivisionByZero)
        } else {
            Ok(self / rhs)
        }
    }
}
