use num::{BigInt, Integer, Signed, Zero};

use super::field_generals::{IntegerType, Ring};
use crate::error::{AlgebraError, AlgebraResult};

#[allow(clippy::module_name_repetitions)]
pub trait BezoutDomain: Ring {
    /// division
    /// # Errors
    /// divide by 0, or `other` does not divide `self`
    fn divide_by_divisor(&self, other: &Self) -> AlgebraResult<Self>;

    /// greatest common divisor in this Bezout Domain
    #[must_use]
    fn gcd(&self, other: &Self) -> Self;

    /// sigma*self + tau*other = beta
    /// alpha = self/beta
    /// gamma = other/beta
    /// sigma*alpha + tau*gamma = beta/beta = 1
    /// the format of the output is [sigma,tau],beta
    fn gcd_and_witnesses(&self, other: &Self) -> ([Self; 2], Self);
}

/// extended Euclid, the gcd is normalised to be nonnegative
fn extended_euclid<T>(a: &T, b: &T) -> ([T; 2], T)
where
    T: Ring + Integer + Signed,
{
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (<T as Ring>::ring_one(), <T as Zero>::zero());
    let (mut old_t, mut t) = (<T as Zero>::zero(), <T as Ring>::ring_one());
    while !r.is_zero() {
        let q = old_r.div_floor(&r);
        let next_r = old_r - q.clone() * r.clone();
        old_r = core::mem::replace(&mut r, next_r);
        let next_s = old_s - q.clone() * s.clone();
        old_s = core::mem::replace(&mut s, next_s);
        let next_t = old_t - q * t.clone();
        old_t = core::mem::replace(&mut t, next_t);
    }
    if old_r.is_negative() {
        ([-old_s, -old_t], -old_r)
    } else {
        ([old_s, old_t], old_r)
    }
}

macro_rules! integer_bezout {
    ($int:ty) => {
        impl BezoutDomain for $int {
            fn divide_by_divisor(&self, other: &Self) -> AlgebraResult<Self> {
                if other.is_zero() {
                    return Err(AlgebraError::DivisionByZero);
                }
                let (quotient, remainder) = self.div_rem(other);
                if remainder.is_zero() {
                    Ok(quotient)
                } else {
                    Err(AlgebraError::incompatible(
                        "divide_by_divisor",
                        format!("{other} does not divide {self}"),
                    ))
                }
            }

            fn gcd(&self, other: &Self) -> Self {
                extended_euclid(self, other).1
            }

            fn gcd_and_witnesses(&self, other: &Self) -> ([Self; 2], Self) {
                extended_euclid(self, other)
            }
        }
    };
}

impl Ring for IntegerType {
    fn mul_assign_borrow(&mut self, other: &Self) {
        *self *= *other;
    }
}

impl Ring for BigInt {
    fn mul_assign_borrow(&mut self, other: &Self) {
        *self *= other;
    }
}

integer_bezout!(IntegerType);
integer_bezout!(BigInt);

mod test {

    #[test]
    fn small_gcds() {
        use super::BezoutDomain;
        assert_eq!(12i64.gcd(&18), 6);
        assert_eq!((-12i64).gcd(&18), 6);
        assert_eq!(0i64.gcd(&7), 7);
        assert_eq!(7i64.gcd(&0), 7);
        assert_eq!(0i64.gcd(&0), 0);
        assert_eq!(17i64.gcd(&5), 1);
    }

    #[test]
    fn witnesses_combine_to_gcd() {
        use super::BezoutDomain;
        for (a, b) in [(240i64, 46), (-35, 15), (3, 7), (101, -13), (0, 9)] {
            let ([sigma, tau], beta) = a.gcd_and_witnesses(&b);
            assert_eq!(sigma * a + tau * b, beta);
            assert!(beta >= 0);
            assert_eq!(a.divide_by_divisor(&beta).map(|x| x * beta), Ok(a));
        }
    }

    #[test]
    fn big_witnesses() {
        use super::BezoutDomain;
        use num::BigInt;
        let a = BigInt::from(2i64).pow(80) + BigInt::from(1);
        let b = BigInt::from(3i64).pow(40);
        let ([sigma, tau], beta) = a.gcd_and_witnesses(&b);
        assert_eq!(sigma * a.clone() + tau * b.clone(), beta.clone());
        assert_eq!(a.gcd(&b), beta);
    }

    #[test]
    fn divide_errors() {
        use super::BezoutDomain;
        use crate::error::AlgebraError;
        assert_eq!(5i64.divide_by_divisor(&0), Err(AlgebraError::DivisionByZero));
        assert!(5i64.divide_by_divisor(&2).is_err());
        assert_eq!(6i64.divide_by_divisor(&-2), Ok(-3));
    }
}
