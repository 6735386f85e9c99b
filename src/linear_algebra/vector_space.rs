use core::fmt;
use std::collections::BTreeMap;

use itertools::Itertools;

use super::basis_key::BasisKey;
use crate::base_ring::field_generals::IntegerType;
use crate::error::{AlgebraError, AlgebraResult};

pub type Degree = IntegerType;

/// A graded vector space given by its basis, each basis key carrying a degree.
///
/// Spaces are values: every operation builds a new one, and two spaces
/// are equal exactly when their keys and degrees agree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VectorSpace {
    basis: BTreeMap<BasisKey, Degree>,
}

/// shared zero space handed out by every zero default
pub(crate) static ZERO_SPACE: VectorSpace = VectorSpace::zero_space();

impl VectorSpace {
    #[must_use]
    pub const fn zero_space() -> Self {
        Self {
            basis: BTreeMap::new(),
        }
    }

    pub fn from_basis(basis: impl IntoIterator<Item = (BasisKey, Degree)>) -> Self {
        Self {
            basis: basis.into_iter().collect(),
        }
    }

    /// `build([(0, 1), (2, 1)])` is one basis vector in degree 0 and one in degree 2,
    /// keys are `Index(0), Index(1), ..` in increasing degree
    pub fn build(graded_dimensions: impl IntoIterator<Item = (Degree, usize)>) -> Self {
        let mut per_degree: BTreeMap<Degree, usize> = BTreeMap::new();
        for (degree, count) in graded_dimensions {
            *per_degree.entry(degree).or_default() += count;
        }
        Self::from_basis(
            per_degree
                .into_iter()
                .flat_map(|(degree, count)| core::iter::repeat(degree).take(count))
                .enumerate()
                .map(|(idx, degree)| (BasisKey::Index(idx), degree)),
        )
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.basis.is_empty()
    }

    #[must_use]
    pub fn degree_of(&self, key: &BasisKey) -> Option<Degree> {
        self.basis.get(key).copied()
    }

    #[must_use]
    pub fn contains(&self, key: &BasisKey) -> bool {
        self.basis.contains_key(key)
    }

    pub fn basis(&self) -> impl Iterator<Item = (&BasisKey, Degree)> + '_ {
        self.basis.iter().map(|(k, d)| (k, *d))
    }

    pub fn keys(&self) -> impl Iterator<Item = &BasisKey> + '_ {
        self.basis.keys()
    }

    #[must_use]
    pub fn graded_dimensions(&self) -> BTreeMap<Degree, usize> {
        let mut answer = BTreeMap::new();
        for degree in self.basis.values() {
            *answer.entry(*degree).or_default() += 1;
        }
        answer
    }

    #[must_use]
    pub fn graded_pieces(&self) -> BTreeMap<Degree, VectorSpace> {
        let mut answer: BTreeMap<Degree, VectorSpace> = BTreeMap::new();
        for (key, degree) in &self.basis {
            answer
                .entry(*degree)
                .or_default()
                .basis
                .insert(key.clone(), *degree);
        }
        answer
    }

    /// `V[m]`, every degree drops by `m` so that `V[m]^d = V^{m+d}`
    #[must_use]
    pub fn shift(&self, how_much: Degree) -> Self {
        Self::from_basis(self.basis.iter().map(|(k, d)| (k.clone(), d - how_much)))
    }

    /// keys are tuples with one entry per factor, degrees add;
    /// a single factor is returned as is and no factors give the ground field
    #[must_use]
    pub fn tensor(factors: &[&VectorSpace]) -> Self {
        match factors {
            [] => Self::from_basis([(BasisKey::Tuple(vec![]), 0)]),
            [only] => (*only).clone(),
            _ => Self::from_basis(
                factors
                    .iter()
                    .map(|factor| factor.basis.iter())
                    .multi_cartesian_product()
                    .map(|combination| {
                        let degree = combination.iter().map(|(_, d)| **d).sum::<Degree>();
                        let key = BasisKey::tuple(combination.into_iter().map(|(k, _)| k.clone()));
                        (key, degree)
                    }),
            ),
        }
    }

    /// direct sum, keys of `self` tagged `Left` and keys of `other` tagged `Right`
    #[must_use]
    pub fn oplus(&self, other: &Self) -> Self {
        Self::from_basis(
            self.basis
                .iter()
                .map(|(k, d)| (BasisKey::left(k.clone()), *d))
                .chain(
                    other
                        .basis
                        .iter()
                        .map(|(k, d)| (BasisKey::right(k.clone()), *d)),
                ),
        )
    }

    /// same degrees, keys moved along `translate`, which has to be injective
    pub(crate) fn rekey(
        &self,
        operation: &'static str,
        translate: impl Fn(&BasisKey) -> AlgebraResult<BasisKey>,
    ) -> AlgebraResult<Self> {
        let basis = self
            .basis
            .iter()
            .map(|(k, d)| Ok((translate(k)?, *d)))
            .collect::<AlgebraResult<BTreeMap<_, _>>>()?;
        if basis.len() == self.basis.len() {
            Ok(Self { basis })
        } else {
            Err(AlgebraError::incompatible(
                operation,
                "two basis keys collapse to the same key",
            ))
        }
    }

    /// # Errors
    /// if some key is not a tuple with a tuple at `position`
    pub fn flatten(&self, position: usize) -> AlgebraResult<Self> {
        self.rekey("flatten", |k| k.flatten(position))
    }

    /// # Errors
    /// if some key is not a tuple containing `[start, end)`
    pub fn unflatten(&self, start: usize, end: usize) -> AlgebraResult<Self> {
        self.rekey("unflatten", |k| k.unflatten(start, end))
    }

    /// # Errors
    /// if some key is not a summand of a nonempty tuple
    pub fn distribute(&self) -> AlgebraResult<Self> {
        self.rekey("distribute", BasisKey::distribute)
    }

    /// every key of `self` is a key of `other` with the same degree
    #[must_use]
    pub fn is_subspace_of(&self, other: &Self) -> bool {
        self.basis
            .iter()
            .all(|(k, d)| other.basis.get(k).is_some_and(|d2| d2 == d))
    }
}

impl fmt::Display for VectorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (degree, dimension)) in self.graded_dimensions().into_iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{degree}: {dimension}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    #[test]
    fn build_and_display() {
        use super::VectorSpace;
        let sphere = VectorSpace::build([(0, 1), (2, 1)]);
        assert_eq!(sphere.dimension(), 2);
        assert_eq!(format!("{sphere}"), "{0: 1, 2: 1}");
        assert_eq!(format!("{}", VectorSpace::zero_space()), "{}");
        assert_eq!(VectorSpace::build([]), VectorSpace::zero_space());
    }

    #[test]
    fn shift_lowers_degrees() {
        use super::VectorSpace;
        let v = VectorSpace::build([(0, 2), (3, 1)]);
        let shifted = v.shift(2);
        assert_eq!(
            shifted.graded_dimensions().into_iter().collect::<Vec<_>>(),
            vec![(-2, 2), (1, 1)]
        );
        assert_eq!(shifted.shift(-2), v);
    }

    #[test]
    fn tensor_and_sum_dimensions() {
        use super::VectorSpace;
        let v = VectorSpace::build([(0, 1), (1, 1)]);
        let w = VectorSpace::build([(2, 2)]);
        let vw = VectorSpace::tensor(&[&v, &w]);
        assert_eq!(vw.dimension(), 4);
        assert_eq!(
            vw.graded_dimensions().into_iter().collect::<Vec<_>>(),
            vec![(2, 2), (3, 2)]
        );
        assert_eq!(VectorSpace::tensor(&[&v]), v);
        assert_eq!(VectorSpace::tensor(&[]).dimension(), 1);
        assert_eq!(VectorSpace::tensor(&[&v, &VectorSpace::zero_space()]).dimension(), 0);
        let same_keys = v.oplus(&v);
        assert_eq!(same_keys.dimension(), 4);
        assert!(!v.is_subspace_of(&same_keys));
    }

    #[test]
    fn flatten_matches_tensor_conventions() {
        use super::VectorSpace;
        let a = VectorSpace::build([(0, 1), (1, 1)]);
        let b = VectorSpace::build([(1, 1)]);
        let c = VectorSpace::build([(5, 2)]);
        let bc = VectorSpace::tensor(&[&b, &c]);
        let nested = VectorSpace::tensor(&[&a, &bc]);
        let flat = VectorSpace::tensor(&[&a, &b, &c]);
        assert_eq!(nested.flatten(1), Ok(flat.clone()));
        assert_eq!(flat.unflatten(1, 3), Ok(nested));
        assert!(a.flatten(0).is_err());
    }

    #[test]
    fn graded_pieces_cover() {
        use super::VectorSpace;
        let v = VectorSpace::build([(0, 2), (1, 3), (4, 1)]);
        let pieces = v.graded_pieces();
        assert_eq!(pieces.len(), 3);
        for (degree, piece) in &pieces {
            assert!(piece.is_subspace_of(&v));
            assert!(piece.basis().all(|(_, d)| d == *degree));
        }
        assert_eq!(pieces.values().map(VectorSpace::dimension).sum::<usize>(), 6);
    }

    fn small_graded() -> impl Strategy<Value = Vec<(i64, usize)>> {
        proptest::collection::vec((-3i64..4, 0usize..3), 0..4)
    }

    proptest! {
        #[test]
        fn tensor_associative_up_to_shuffle(a in small_graded(), b in small_graded(), c in small_graded()) {
            use super::VectorSpace;
            let (a, b, c) = (VectorSpace::build(a), VectorSpace::build(b), VectorSpace::build(c));
            let left = VectorSpace::tensor(&[&VectorSpace::tensor(&[&a, &b]), &c]);
            let right = VectorSpace::tensor(&[&a, &VectorSpace::tensor(&[&b, &c])]);
            prop_assert_eq!(left.graded_dimensions(), right.graded_dimensions());
            prop_assert_eq!(left.dimension(), a.dimension() * b.dimension() * c.dimension());
        }
    }
}
