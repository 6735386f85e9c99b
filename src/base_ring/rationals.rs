use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use num::{BigInt, One, Signed, Zero};

use super::bezout::BezoutDomain;
use super::field_generals::{Commutative, Field, IntegerType, Ring};
use crate::error::{AlgebraError, AlgebraResult};

/// Exact rationals kept in normal form:
/// the denominator is positive and coprime to the numerator, zero is `0/1`.
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Rational {
    numerator: BigInt,
    denominator: BigInt,
}

impl Rational {
    /// # Errors
    /// `DivisionByZero` for a zero denominator
    pub fn new(
        numerator: impl Into<BigInt>,
        denominator: impl Into<BigInt>,
    ) -> AlgebraResult<Self> {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(AlgebraError::DivisionByZero);
        }
        Ok(Self::normalized(numerator.into(), denominator))
    }

    #[must_use]
    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    #[must_use]
    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// only called with a nonzero `denominator`
    fn normalized(numerator: BigInt, denominator: BigInt) -> Self {
        let common = numerator.gcd(&denominator);
        let (mut numerator, mut denominator) = if common.is_zero() || common.is_one() {
            (numerator, denominator)
        } else {
            (numerator / &common, denominator / &common)
        };
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        if numerator.is_zero() {
            denominator = BigInt::one();
        }
        Self {
            numerator,
            denominator,
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::normalized(
            self.numerator * rhs.denominator.clone() + rhs.numerator * self.denominator.clone(),
            self.denominator * rhs.denominator,
        )
    }
}

impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Self) {
        let lhs = core::mem::replace(self, Self::zero());
        *self = lhs + rhs;
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::normalized(
            self.numerator * rhs.numerator,
            self.denominator * rhs.denominator,
        )
    }
}

impl Commutative for Rational {}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        assert!(!rhs.numerator.is_zero(), "Division by 0");
        Self::normalized(
            self.numerator * rhs.denominator,
            self.denominator * rhs.numerator,
        )
    }
}

impl From<IntegerType> for Rational {
    fn from(value: IntegerType) -> Self {
        Self {
            numerator: value.into(),
            denominator: BigInt::one(),
        }
    }
}

impl PartialEq<IntegerType> for Rational {
    fn eq(&self, other: &IntegerType) -> bool {
        self.denominator.is_one() && self.numerator == BigInt::from(*other)
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        0.into()
    }

    fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        1.into()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl Ring for Rational {
    fn characteristic(_primes: Box<dyn Iterator<Item = IntegerType>>) -> IntegerType {
        0
    }

    fn try_inverse(self) -> Option<Self> {
        <Self as Field>::try_inverse(self)
    }

    fn mul_assign_borrow(&mut self, other: &Self) {
        let lhs = core::mem::replace(self, Self::zero());
        *self = lhs * other.clone();
    }
}

impl Field for Rational {
    fn try_inverse(self) -> Option<Self> {
        if self.numerator.is_zero() {
            None
        } else {
            Some(Self::normalized(self.denominator, self.numerator))
        }
    }
}

#[cfg(test)]
mod test {

    #[test]
    fn normal_form() {
        use super::Rational;
        use num::BigInt;
        let half = Rational::new(-3, -6).expect("nonzero denominator");
        assert_eq!(half.numerator(), &BigInt::from(1));
        assert_eq!(half.denominator(), &BigInt::from(2));
        let negative = Rational::new(4, -6).expect("nonzero denominator");
        assert_eq!(negative.numerator(), &BigInt::from(-2));
        assert_eq!(negative.denominator(), &BigInt::from(3));
        let zero = Rational::new(0, -5).expect("nonzero denominator");
        assert_eq!(zero, 0i64);
        assert_eq!(zero.denominator(), &BigInt::from(1));
        assert_eq!(format!("{negative}"), "-2/3");
    }

    #[test]
    fn zero_denominator() {
        use super::Rational;
        use crate::error::AlgebraError;
        assert_eq!(Rational::new(1, 0), Err(AlgebraError::DivisionByZero));
    }

    #[test]
    fn arithmetic() {
        use super::Rational;
        use crate::base_ring::field_generals::Field;
        let third = Rational::new(1, 3).expect("nonzero denominator");
        let quarter = Rational::new(1, 4).expect("nonzero denominator");
        assert_eq!(
            third.clone() + quarter.clone(),
            Rational::new(7, 12).expect("nonzero denominator")
        );
        assert_eq!(
            third.clone() - quarter.clone(),
            Rational::new(1, 12).expect("nonzero denominator")
        );
        assert_eq!(
            third.clone() * quarter.clone(),
            Rational::new(1, 12).expect("nonzero denominator")
        );
        assert_eq!(
            third.clone() / quarter.clone(),
            Rational::new(4, 3).expect("nonzero denominator")
        );
        assert_eq!(Field::try_inverse(third), Some(Rational::from(3)));
        assert_eq!(Field::try_inverse(Rational::from(0)), None);
    }

    #[test]
    fn big_values_do_not_overflow() {
        use super::Rational;
        let mut total = Rational::from(0);
        let mut factor = Rational::from(1);
        for _ in 0..100 {
            factor = factor * Rational::from(1 << 20);
            total += factor.clone();
        }
        let back = total.clone() - total;
        assert_eq!(back, 0i64);
    }

    proptest::proptest! {
        #[test]
        fn field_axioms(a in -50i64..50, b in 1i64..50, c in -50i64..50, d in 1i64..50) {
            use super::Rational;
            use crate::base_ring::field_generals::Field;
            let x = Rational::new(a, b).expect("nonzero denominator");
            let y = Rational::new(c, d).expect("nonzero denominator");
            proptest::prop_assert_eq!(x.clone() + y.clone(), y.clone() + x.clone());
            proptest::prop_assert_eq!(x.clone() * y.clone(), y.clone() * x.clone());
            proptest::prop_assert_eq!((x.clone() - y.clone()) + y.clone(), x.clone());
            if let Some(inverse) = Field::try_inverse(y.clone()) {
                proptest::prop_assert_eq!(x.clone() * inverse * y, x);
            }
        }
    }
}
