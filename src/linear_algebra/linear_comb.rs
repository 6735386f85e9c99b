use core::ops::{Add, AddAssign, Mul, Neg, Sub};
use num::traits::One;

use super::basis_key::BasisKey;

/// A formal linear combination that has not been collected yet,
/// repeated terms are only merged once it becomes a `Vector`.
pub struct LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N>,
{
    pub(crate) summands: Box<dyn Iterator<Item = (N, T)>>,
}

impl<N, T> LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    #[must_use]
    pub fn new() -> Self {
        LazyLinear::<_, _> {
            summands: Box::new(vec![].into_iter()),
        }
    }

    pub fn map<T2>(self, f: impl Fn(T) -> T2 + 'static) -> LazyLinear<N, T2>
    where
        T2: 'static,
    {
        LazyLinear::<_, _> {
            summands: Box::new(self.summands.map(move |(z0, z1)| (z0, f(z1)))),
        }
    }

    pub fn from_summands(summands: impl IntoIterator<Item = (N, T)> + 'static) -> Self {
        Self {
            summands: Box::new(summands.into_iter()),
        }
    }
}

impl<N, T> Default for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, T> Add for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            summands: Box::new(self.summands.chain(rhs.summands)),
        }
    }
}

impl<N, T> AddAssign for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    fn add_assign(&mut self, rhs: Self) {
        let mut dummy_summands: Box<dyn Iterator<Item = (N, T)>> = Box::new([].into_iter());
        core::mem::swap(&mut dummy_summands, &mut self.summands);
        self.summands = Box::new(dummy_summands.chain(rhs.summands));
    }
}

impl<N, T> Neg for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            summands: Box::new(self.summands.map(|(z0, z1)| (-z0, z1))),
        }
    }
}

impl<N, T> Sub for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl<N, T> Mul<N> for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + Clone + 'static,
    T: 'static,
{
    type Output = Self;

    fn mul(self, rhs: N) -> Self::Output {
        Self {
            summands: Box::new(self.summands.map(move |(z0, z1)| (z0 * rhs.clone(), z1))),
        }
    }
}

impl<N, T> From<(N, T)> for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    T: 'static,
{
    fn from(value: (N, T)) -> Self {
        Self {
            summands: Box::new([value].into_iter()),
        }
    }
}

pub trait TermMultiplier<N, T2 = Self>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + 'static,
    Self: Sized,
{
    fn two_summand_mul(self, rhs: T2) -> LazyLinear<N, Self>;
}

/// words of basis keys multiply by concatenation,
/// this is how pure tensors of basis vectors are formed
impl<N> TermMultiplier<N> for Vec<BasisKey>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + One + 'static,
{
    fn two_summand_mul(mut self, rhs: Vec<BasisKey>) -> LazyLinear<N, Self> {
        self.extend(rhs);
        (N::one(), self).into()
    }
}

impl<N, T, T2> Mul<LazyLinear<N, T2>> for LazyLinear<N, T>
where
    N: Add<Output = N> + Neg<Output = N> + Mul<Output = N> + Clone + 'static,
    T: 'static + TermMultiplier<N, T2> + Clone,
    T2: 'static + Clone,
{
    type Output = Self;

    fn mul(self, rhs: LazyLinear<N, T2>) -> Self::Output {
        let rhs_materialized = rhs.summands.collect::<Vec<_>>();
        Self {
            summands: Box::new(self.summands.flat_map(move |self_summand| {
                rhs_materialized
                    .clone()
                    .into_iter()
                    .flat_map(move |rhs_summand| {
                        let coeff = self_summand.0.clone() * rhs_summand.0;
                        let pieces = self_summand.1.clone().two_summand_mul(rhs_summand.1);
                        pieces
                            .summands
                            .map(move |piece| (piece.0 * coeff.clone(), piece.1))
                    })
            })),
        }
    }
}

mod test {

    #[test]
    fn concatenating_words() {
        use super::LazyLinear;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::basis_key::BasisKey;
        let first: LazyLinear<Rational, Vec<BasisKey>> = LazyLinear::from_summands([
            (Rational::from(2), vec![BasisKey::Index(0)]),
            (Rational::from(3), vec![BasisKey::Index(1)]),
        ]);
        let second: LazyLinear<Rational, Vec<BasisKey>> =
            LazyLinear::from((Rational::from(-1), vec![BasisKey::Index(7)]));
        let product = (first * second).summands.collect::<Vec<_>>();
        assert_eq!(
            product,
            vec![
                (
                    Rational::from(-2),
                    vec![BasisKey::Index(0), BasisKey::Index(7)]
                ),
                (
                    Rational::from(-3),
                    vec![BasisKey::Index(1), BasisKey::Index(7)]
                ),
            ]
        );
    }

    #[test]
    fn sums_and_negation() {
        use super::LazyLinear;
        use crate::base_ring::finite_field::F3;
        let x: LazyLinear<F3, usize> = LazyLinear::from((F3::from(1), 4));
        let y: LazyLinear<F3, usize> = LazyLinear::from((F3::from(2), 5));
        let mut z = x - y * F3::from(2);
        z += LazyLinear::from((F3::from(1), 6));
        let collected = z.map(|t| t + 1).summands.collect::<Vec<_>>();
        assert_eq!(
            collected,
            vec![(F3::from(1), 5), (F3::from(2), 6), (F3::from(1), 7)]
        );
    }
}
