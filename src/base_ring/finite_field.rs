use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use num::{One, Zero};

use super::bezout::BezoutDomain;
use super::field_generals::{Commutative, Field, IntegerType, Ring};

/// The integers modulo the prime `P`.
/// Primality of `P` is not checked, dividing by a non-unit panics.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Zp<const P: u64>(u64);

pub type F2 = Zp<2>;
pub type F3 = Zp<3>;

impl<const P: u64> Zp<P> {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    fn reduce_wide(value: u128) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self((value % u128::from(P)) as u64)
    }

    /// inverse through the Bezout witnesses of `self` and `P`
    fn bezout_inverse(self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }
        let value = IntegerType::try_from(self.0).ok()?;
        let modulus = IntegerType::try_from(P).ok()?;
        let ([sigma, _], beta) = value.gcd_and_witnesses(&modulus);
        if beta == 1 {
            Some(Self::from(sigma))
        } else {
            None
        }
    }
}

impl<const P: u64> Add for Zp<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::reduce_wide(u128::from(self.0) + u128::from(rhs.0))
    }
}

impl<const P: u64> AddAssign for Zp<P> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const P: u64> Neg for Zp<P> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }
}

impl<const P: u64> Sub for Zp<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl<const P: u64> Mul for Zp<P> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::reduce_wide(u128::from(self.0) * u128::from(rhs.0))
    }
}

impl<const P: u64> Commutative for Zp<P> {}

impl<const P: u64> Div for Zp<P> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        match rhs.bezout_inverse() {
            Some(inverse) => self * inverse,
            None => panic!("Division by 0"),
        }
    }
}

impl<const P: u64> From<IntegerType> for Zp<P> {
    fn from(value: IntegerType) -> Self {
        let modulus = i128::from(P);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(i128::from(value).rem_euclid(modulus) as u64)
    }
}

impl<const P: u64> PartialEq<IntegerType> for Zp<P> {
    fn eq(&self, other: &IntegerType) -> bool {
        *self == Self::from(*other)
    }
}

impl<const P: u64> Zero for Zp<P> {
    fn zero() -> Self {
        Self(0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl<const P: u64> One for Zp<P> {
    fn one() -> Self {
        Self(1 % P)
    }
}

impl<const P: u64> fmt::Display for Zp<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const P: u64> Ring for Zp<P> {
    fn characteristic(_primes: Box<dyn Iterator<Item = IntegerType>>) -> IntegerType {
        IntegerType::try_from(P).unwrap_or(0)
    }

    fn try_inverse(self) -> Option<Self> {
        self.bezout_inverse()
    }

    fn mul_assign_borrow(&mut self, other: &Self) {
        *self = *self * *other;
    }
}

impl<const P: u64> Field for Zp<P> {
    fn try_inverse(self) -> Option<Self> {
        self.bezout_inverse()
    }
}

mod test {

    #[test]
    fn arithmetic_mod_seven() {
        use super::Zp;
        type F7 = Zp<7>;
        let three = F7::from(3);
        let five = F7::from(5);
        assert_eq!(three + five, F7::from(1));
        assert_eq!(three - five, F7::from(5));
        assert_eq!(three * five, F7::from(1));
        assert_eq!(-three, F7::from(4));
        assert_eq!(F7::from(-1), 6i64);
        assert_eq!(F7::from(14), 0i64);
        assert_eq!(three / five, F7::from(2));
    }

    #[test]
    fn inverses() {
        use super::{Zp, F2};
        use crate::base_ring::field_generals::{Field, Ring};
        type F11 = Zp<11>;
        for n in 1..11 {
            let x = F11::from(n);
            let inverse = Field::try_inverse(x).expect("nonzero in a field");
            assert_eq!(x * inverse, 1i64);
        }
        assert_eq!(Field::try_inverse(F11::from(0)), None);
        assert_eq!(Field::try_inverse(F2::from(1)), Some(F2::from(1)));
        assert_eq!(
            F11::characteristic(Box::new([2, 3, 5, 7, 11].into_iter())),
            11
        );
    }

    #[test]
    fn checked_division() {
        use super::F3;
        use crate::base_ring::field_generals::Field;
        use crate::error::AlgebraError;
        assert_eq!(F3::from(2).try_divide(F3::from(2)), Ok(F3::from(1)));
        assert_eq!(
            F3::from(2).try_divide(F3::from(3)),
            Err(AlgebraError::DivisionByZero)
        );
    }

    #[test]
    #[should_panic(expected = "Division by 0")]
    fn operator_division_by_zero() {
        use super::F2;
        let _ = F2::from(1) / F2::from(0);
    }
}
