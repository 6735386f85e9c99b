use core::ops::{Add, Mul, Neg, Sub};
use std::collections::BTreeMap;

use super::basis_key::BasisKey;
use super::linear_comb::LazyLinear;
use super::vector_space::VectorSpace;
use crate::base_ring::field_generals::Field;
use crate::error::AlgebraResult;

/// Sparse vector: basis key to coefficient, no stored coefficient is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector<F> {
    components: BTreeMap<BasisKey, F>,
}

impl<F: Field + 'static> Vector<F> {
    #[must_use]
    pub fn zero() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn basis_vector(key: BasisKey) -> Self {
        Self::from_terms([(F::one(), key)])
    }

    /// collects repeated keys and drops whatever cancels
    pub fn from_terms(terms: impl IntoIterator<Item = (F, BasisKey)>) -> Self {
        let mut components: BTreeMap<BasisKey, F> = BTreeMap::new();
        for (coeff, key) in terms {
            match components.get_mut(&key) {
                Some(existing) => *existing += coeff,
                None => {
                    components.insert(key, coeff);
                }
            }
        }
        Self { components }.chomp()
    }

    /// remove zero coefficients
    #[must_use]
    pub fn chomp(mut self) -> Self {
        self.components.retain(|_, coeff| !coeff.is_zero());
        self
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn coefficient(&self, key: &BasisKey) -> F {
        self.components.get(key).cloned().unwrap_or_else(F::zero)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&BasisKey, &F)> + '_ {
        self.components.iter()
    }

    #[must_use]
    pub fn support_size(&self) -> usize {
        self.components.len()
    }

    /// smallest key with a nonzero coefficient
    #[must_use]
    pub fn leading_key(&self) -> Option<&BasisKey> {
        self.components.keys().next()
    }

    /// `self += coeff * other`
    pub fn add_scaled(&mut self, coeff: &F, other: &Self) {
        for (key, value) in &other.components {
            let summand = coeff.clone() * value.clone();
            match self.components.get_mut(key) {
                Some(existing) => *existing += summand,
                None => {
                    self.components.insert(key.clone(), summand);
                }
            }
        }
        self.components.retain(|_, c| !c.is_zero());
    }

    #[must_use]
    pub fn scale(&self, coeff: &F) -> Self {
        Self::from_terms(
            self.components
                .iter()
                .map(|(k, c)| (coeff.clone() * c.clone(), k.clone())),
        )
    }

    /// every key with a nonzero coefficient is a basis key of `space`
    #[must_use]
    pub fn lies_in(&self, space: &VectorSpace) -> bool {
        self.components.keys().all(|k| space.contains(k))
    }

    pub(crate) fn rekey(
        &self,
        translate: impl Fn(&BasisKey) -> AlgebraResult<BasisKey>,
    ) -> AlgebraResult<Self> {
        let terms = self
            .components
            .iter()
            .map(|(k, c)| Ok((c.clone(), translate(k)?)))
            .collect::<AlgebraResult<Vec<_>>>()?;
        Ok(Self::from_terms(terms))
    }

    pub fn into_lazy(self) -> LazyLinear<F, BasisKey> {
        LazyLinear::from_summands(self.components.into_iter().map(|(k, c)| (c, k)))
    }
}

impl<F: Field + 'static> From<LazyLinear<F, BasisKey>> for Vector<F> {
    fn from(value: LazyLinear<F, BasisKey>) -> Self {
        Self::from_terms(value.summands)
    }
}

impl<F: Field + 'static> Add for Vector<F> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.add_scaled(&F::one(), &rhs);
        self
    }
}

impl<F: Field + 'static> Sub for Vector<F> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self.add_scaled(&(-F::one()), &rhs);
        self
    }
}

impl<F: Field + 'static> Neg for Vector<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            components: self
                .components
                .into_iter()
                .map(|(k, c)| (k, -c))
                .collect(),
        }
    }
}

impl<F: Field + 'static> Mul<F> for Vector<F> {
    type Output = Self;

    fn mul(self, rhs: F) -> Self::Output {
        self.scale(&rhs)
    }
}

mod test {

    #[test]
    fn chomp_is_idempotent() {
        use super::Vector;
        use crate::base_ring::finite_field::F3;
        use crate::linear_algebra::basis_key::BasisKey;
        let v: Vector<F3> = Vector::from_terms([
            (F3::from(1), BasisKey::Index(0)),
            (F3::from(2), BasisKey::Index(0)),
            (F3::from(2), BasisKey::Index(1)),
        ]);
        assert_eq!(v.support_size(), 1);
        assert_eq!(v.coefficient(&BasisKey::Index(1)), F3::from(2));
        assert_eq!(v.coefficient(&BasisKey::Index(0)), F3::from(0));
        assert_eq!(v.clone().chomp(), v);
        assert_eq!(v.clone().chomp().chomp(), v.clone().chomp());
    }

    #[test]
    fn arithmetic_cancels() {
        use super::Vector;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::basis_key::BasisKey;
        let a: Vector<Rational> = Vector::basis_vector(BasisKey::Index(3));
        let b: Vector<Rational> = Vector::from_terms([
            (Rational::from(2), BasisKey::Index(3)),
            (Rational::from(5), BasisKey::Index(4)),
        ]);
        let diff = b.clone() - a.clone() * Rational::from(2);
        assert_eq!(diff.leading_key(), Some(&BasisKey::Index(4)));
        assert_eq!(diff.support_size(), 1);
        assert!((b.clone() + (-b)).is_zero());
        let lazy_back: Vector<Rational> = a.clone().into_lazy().into();
        assert_eq!(lazy_back, a);
    }
}
