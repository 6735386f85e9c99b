use core::ops::Neg;
use std::collections::BTreeMap;

use itertools::Itertools;

use super::basis_key::BasisKey;
use super::linear_comb::LazyLinear;
use super::vector::Vector;
use super::vector_space::{Degree, VectorSpace};
use crate::base_ring::field_generals::Field;
use crate::error::{AlgebraError, AlgebraResult};

/// A graded linear map stored as the images of the source basis.
///
/// A key with no stored image maps to zero and zero images are never stored,
/// so the derived equality is equality of linear maps.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearMap<F> {
    source: VectorSpace,
    target: VectorSpace,
    degree: Degree,
    maps: BTreeMap<BasisKey, Vector<F>>,
}

impl<F: Field + 'static> LinearMap<F> {
    #[must_use]
    pub fn zero(source: VectorSpace, target: VectorSpace, degree: Degree) -> Self {
        Self {
            source,
            target,
            degree,
            maps: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn identity(space: &VectorSpace) -> Self {
        Self::diagonal(space, |_| F::one())
    }

    /// `b -> (-1)^{|b|-1} b`
    #[must_use]
    pub fn sigma(space: &VectorSpace) -> Self {
        Self::diagonal(space, |degree| F::sign(degree - 1))
    }

    fn diagonal(space: &VectorSpace, coefficient: impl Fn(Degree) -> F) -> Self {
        let maps = space
            .basis()
            .map(|(key, degree)| {
                (
                    key.clone(),
                    Vector::from_terms([(coefficient(degree), key.clone())]),
                )
            })
            .collect();
        Self {
            source: space.clone(),
            target: space.clone(),
            degree: 0,
            maps,
        }
    }

    /// set the image of one basis vector
    /// # Errors
    /// if `key` is not in the source or `image` leaves the target
    /// or lands in the wrong degree
    pub fn insert_image(&mut self, key: BasisKey, image: Vector<F>) -> AlgebraResult<()> {
        let Some(key_degree) = self.source.degree_of(&key) else {
            return Err(AlgebraError::incompatible(
                "insert_image",
                format!("{key} is not a basis key of the source"),
            ));
        };
        for (target_key, _) in image.terms() {
            if self.target.degree_of(target_key) != Some(key_degree + self.degree) {
                return Err(AlgebraError::incompatible(
                    "insert_image",
                    format!(
                        "{target_key} is not a basis key of degree {} in the target",
                        key_degree + self.degree
                    ),
                ));
            }
        }
        if image.is_zero() {
            self.maps.remove(&key);
        } else {
            self.maps.insert(key, image);
        }
        Ok(())
    }

    #[must_use]
    pub fn source(&self) -> &VectorSpace {
        &self.source
    }

    #[must_use]
    pub fn target(&self) -> &VectorSpace {
        &self.target
    }

    #[must_use]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.maps.is_empty()
    }

    /// number of basis vectors with a nonzero image
    #[must_use]
    pub fn support_size(&self) -> usize {
        self.maps.len()
    }

    #[must_use]
    pub fn image(&self, key: &BasisKey) -> Vector<F> {
        self.maps.get(key).cloned().unwrap_or_else(Vector::zero)
    }

    pub fn images(&self) -> impl Iterator<Item = (&BasisKey, &Vector<F>)> + '_ {
        self.maps.iter()
    }

    #[must_use]
    pub fn apply(&self, v: &Vector<F>) -> Vector<F> {
        let mut answer = Vector::zero();
        for (key, coeff) in v.terms() {
            if let Some(image) = self.maps.get(key) {
                answer.add_scaled(coeff, image);
            }
        }
        answer
    }

    fn same_shape(&self, other: &Self, operation: &'static str) -> AlgebraResult<()> {
        if self.source != other.source {
            return Err(AlgebraError::incompatible(operation, "sources differ"));
        }
        if self.target != other.target {
            return Err(AlgebraError::incompatible(operation, "targets differ"));
        }
        if self.degree != other.degree {
            return Err(AlgebraError::incompatible(
                operation,
                format!("degrees {} and {} differ", self.degree, other.degree),
            ));
        }
        Ok(())
    }

    /// `self ∘ other`, first `other` then `self`
    /// # Errors
    /// if the target of `other` is not the source of `self`
    pub fn circ(&self, other: &Self) -> AlgebraResult<Self> {
        if other.target != self.source {
            return Err(AlgebraError::incompatible(
                "circ",
                format!(
                    "target {} of the inner map is not the source {} of the outer map",
                    other.target, self.source
                ),
            ));
        }
        let maps = other
            .maps
            .iter()
            .map(|(key, image)| (key.clone(), self.apply(image)))
            .filter(|(_, image)| !image.is_zero())
            .collect();
        Ok(Self {
            source: other.source.clone(),
            target: self.target.clone(),
            degree: self.degree + other.degree,
            maps,
        })
    }

    /// # Errors
    /// if source, target or degree differ
    pub fn checked_add(&self, other: &Self) -> AlgebraResult<Self> {
        self.same_shape(other, "add")?;
        let mut maps = self.maps.clone();
        for (key, image) in &other.maps {
            let summed = match maps.remove(key) {
                Some(existing) => existing + image.clone(),
                None => image.clone(),
            };
            if !summed.is_zero() {
                maps.insert(key.clone(), summed);
            }
        }
        Ok(Self {
            source: self.source.clone(),
            target: self.target.clone(),
            degree: self.degree,
            maps,
        })
    }

    /// # Errors
    /// if source, target or degree differ
    pub fn checked_sub(&self, other: &Self) -> AlgebraResult<Self> {
        self.checked_add(&(-other.clone()))
    }

    #[must_use]
    pub fn scale(&self, coeff: &F) -> Self {
        let maps = self
            .maps
            .iter()
            .map(|(key, image)| (key.clone(), image.scale(coeff)))
            .filter(|(_, image)| !image.is_zero())
            .collect();
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
            degree: self.degree,
            maps,
        }
    }

    /// # Errors
    /// if `subspace` is not spanned by basis vectors of the source
    pub fn restrict(&self, subspace: &VectorSpace) -> AlgebraResult<Self> {
        if !subspace.is_subspace_of(&self.source) {
            return Err(AlgebraError::incompatible(
                "restrict",
                format!("{subspace} is not a subspace of {}", self.source),
            ));
        }
        let maps = subspace
            .keys()
            .filter_map(|key| self.maps.get(key).map(|image| (key.clone(), image.clone())))
            .collect();
        Ok(Self {
            source: subspace.clone(),
            target: self.target.clone(),
            degree: self.degree,
            maps,
        })
    }

    /// `(nullity, rank)` by greedy elimination on the images of the basis vectors
    ///
    /// Images that vanish count towards the kernel. One surviving image is taken
    /// as the pivot, its leading coordinate is cleared from every other survivor,
    /// and the process repeats on the survivors.
    /// # Errors
    /// only if a nonzero pivot fails to be invertible
    pub fn ker_im(&self) -> AlgebraResult<(usize, usize)> {
        let mut candidates: Vec<Vector<F>> = self.source.keys().map(|k| self.image(k)).collect();
        let mut nullity = 0;
        let mut rank = 0;
        loop {
            let before = candidates.len();
            candidates.retain(|v| !v.is_zero());
            nullity += before - candidates.len();
            let Some(pivot) = candidates.pop() else {
                break;
            };
            rank += 1;
            let Some(pivot_key) = pivot.leading_key().cloned() else {
                continue;
            };
            let pivot_inverse = Field::try_inverse(pivot.coefficient(&pivot_key))
                .ok_or(AlgebraError::DivisionByZero)?;
            for candidate in &mut candidates {
                let to_clear = candidate.coefficient(&pivot_key);
                if !to_clear.is_zero() {
                    candidate.add_scaled(&(-(to_clear * pivot_inverse.clone())), &pivot);
                }
            }
        }
        Ok((nullity, rank))
    }

    /// Kronecker product without Koszul signs, keys are tuples with one entry per factor
    #[must_use]
    pub fn tensor(factors: &[&LinearMap<F>]) -> Self {
        match factors {
            [] => Self::identity(&VectorSpace::tensor(&[])),
            [only] => (*only).clone(),
            _ => {
                let sources = factors.iter().map(|f| &f.source).collect::<Vec<_>>();
                let targets = factors.iter().map(|f| &f.target).collect::<Vec<_>>();
                let maps = factors
                    .iter()
                    .map(|f| f.maps.iter())
                    .multi_cartesian_product()
                    .map(|combination| {
                        let key = BasisKey::tuple(combination.iter().map(|(k, _)| (*k).clone()));
                        let product = combination.into_iter().fold(
                            LazyLinear::from((F::one(), Vec::new())),
                            |so_far, (_, image)| {
                                so_far * image.clone().into_lazy().map(|k| vec![k])
                            },
                        );
                        (key, Vector::from(product.map(BasisKey::Tuple)))
                    })
                    .filter(|(_, image)| !image.is_zero())
                    .collect();
                Self {
                    source: VectorSpace::tensor(&sources),
                    target: VectorSpace::tensor(&targets),
                    degree: factors.iter().map(|f| f.degree).sum(),
                    maps,
                }
            }
        }
    }

    /// The block map
    /// ```text
    /// ( a  b )
    /// ( c  d )
    /// ```
    /// from `V ⊕ V'` to `W ⊕ W'` where `a: V -> W`, `b: V' -> W`, `c: V -> W'`, `d: V' -> W'`.
    /// # Errors
    /// if the four sources, targets and degrees do not fit together
    pub fn block(a: &Self, b: &Self, c: &Self, d: &Self) -> AlgebraResult<Self> {
        if a.source != c.source || b.source != d.source {
            return Err(AlgebraError::incompatible(
                "block",
                "maps in the same column need the same source",
            ));
        }
        if a.target != b.target || c.target != d.target {
            return Err(AlgebraError::incompatible(
                "block",
                "maps in the same row need the same target",
            ));
        }
        if [b.degree, c.degree, d.degree].iter().any(|deg| *deg != a.degree) {
            return Err(AlgebraError::incompatible(
                "block",
                "all four blocks need the same degree",
            ));
        }
        let tag_left = |k: &BasisKey| Ok(BasisKey::left(k.clone()));
        let tag_right = |k: &BasisKey| Ok(BasisKey::right(k.clone()));
        let mut maps = BTreeMap::new();
        for (column_key, upper, lower, wrap) in a
            .source
            .keys()
            .map(|k| (k, a, c, BasisKey::left as fn(BasisKey) -> BasisKey))
            .chain(b.source.keys().map(|k| (k, b, d, BasisKey::right as fn(BasisKey) -> BasisKey)))
        {
            let image = upper.image(column_key).rekey(tag_left)?
                + lower.image(column_key).rekey(tag_right)?;
            if !image.is_zero() {
                maps.insert(wrap(column_key.clone()), image);
            }
        }
        Ok(Self {
            source: a.source.oplus(&b.source),
            target: a.target.oplus(&c.target),
            degree: a.degree,
            maps,
        })
    }

    fn rekey_source(
        &self,
        source: VectorSpace,
        translate: impl Fn(&BasisKey) -> AlgebraResult<BasisKey>,
    ) -> AlgebraResult<Self> {
        let maps = self
            .maps
            .iter()
            .map(|(k, image)| Ok((translate(k)?, image.clone())))
            .collect::<AlgebraResult<BTreeMap<_, _>>>()?;
        Ok(Self {
            source,
            target: self.target.clone(),
            degree: self.degree,
            maps,
        })
    }

    /// regroup the source keys, see [`BasisKey::flatten`]
    /// # Errors
    /// if a source key has the wrong shape
    pub fn flatten(&self, position: usize) -> AlgebraResult<Self> {
        self.rekey_source(self.source.flatten(position)?, |k| k.flatten(position))
    }

    /// regroup the source keys, see [`BasisKey::unflatten`]
    /// # Errors
    /// if a source key has the wrong shape
    pub fn unflatten(&self, start: usize, end: usize) -> AlgebraResult<Self> {
        self.rekey_source(self.source.unflatten(start, end)?, |k| k.unflatten(start, end))
    }

    /// regroup the source keys, see [`BasisKey::distribute`]
    /// # Errors
    /// if a source key has the wrong shape
    pub fn distribute(&self) -> AlgebraResult<Self> {
        self.rekey_source(self.source.distribute()?, BasisKey::distribute)
    }

    /// translate source and target keys at once,
    /// the result is checked against `source` and `target`
    pub(crate) fn rekey(
        &self,
        source: VectorSpace,
        target: VectorSpace,
        source_key: impl Fn(&BasisKey) -> AlgebraResult<BasisKey>,
        target_key: impl Fn(&BasisKey) -> AlgebraResult<BasisKey>,
    ) -> AlgebraResult<Self> {
        let maps = self
            .maps
            .iter()
            .map(|(k, image)| Ok((source_key(k)?, image.rekey(&target_key)?)))
            .collect::<AlgebraResult<BTreeMap<_, _>>>()?;
        let answer = Self {
            source,
            target,
            degree: self.degree,
            maps,
        };
        answer.verify()?;
        Ok(answer)
    }

    /// the same matrix between `source[m]` and `target[m]`, no sign
    #[must_use]
    pub fn shift(&self, how_much: Degree) -> Self {
        Self {
            source: self.source.shift(how_much),
            target: self.target.shift(how_much),
            degree: self.degree,
            maps: self.maps.clone(),
        }
    }

    /// `hom(M,N)[m] ≅ hom(M,N[m])`
    #[must_use]
    pub fn rejig_1(&self, how_much: Degree) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.shift(how_much),
            degree: self.degree - how_much,
            maps: self.maps.clone(),
        }
    }

    /// `hom(M,N) ≅ hom(M[m],N[m])`, with the sign `(-1)^{m(d-1)}`
    #[must_use]
    pub fn rejig_2(&self, how_much: Degree) -> Self {
        self.shift(how_much)
            .scale(&F::sign(how_much * (self.degree - 1)))
    }

    /// `hom(M,N) ≅ hom(M[m],N)[m]`, the composite of `rejig_2` by `m` and `rejig_1` by `-m`
    #[must_use]
    pub fn rejig_3(&self, how_much: Degree) -> Self {
        self.rejig_2(how_much).rejig_1(-how_much)
    }

    /// keys and degrees of all stored images are consistent with source, target and degree
    /// # Errors
    /// `InvariantViolation` naming the first offending basis key
    pub fn verify(&self) -> AlgebraResult<()> {
        for (key, image) in &self.maps {
            let Some(key_degree) = self.source.degree_of(key) else {
                return Err(AlgebraError::violation(
                    "LinearMap::verify",
                    format!("{key} is not a basis key of the source"),
                ));
            };
            for (target_key, _) in image.terms() {
                match self.target.degree_of(target_key) {
                    Some(d) if d == key_degree + self.degree => {}
                    Some(d) => {
                        return Err(AlgebraError::violation(
                            "LinearMap::verify",
                            format!(
                                "{key} of degree {key_degree} hits {target_key} of degree {d} under a map of degree {}",
                                self.degree
                            ),
                        ));
                    }
                    None => {
                        return Err(AlgebraError::violation(
                            "LinearMap::verify",
                            format!("{target_key} is not a basis key of the target"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<F: Field + 'static> Neg for LinearMap<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            source: self.source,
            target: self.target,
            degree: self.degree,
            maps: self.maps.into_iter().map(|(k, v)| (k, -v)).collect(),
        }
    }
}

#[cfg(test)]
mod test {

    #[allow(dead_code)]
    fn sample_map() -> super::LinearMap<crate::base_ring::rationals::Rational> {
        use super::LinearMap;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector, vector_space::VectorSpace};
        let v = VectorSpace::build([(0, 2), (1, 1)]);
        let w = VectorSpace::build([(1, 2), (2, 2)]);
        let mut f = LinearMap::zero(v, w, 1);
        f.insert_image(
            BasisKey::Index(0),
            Vector::from_terms([
                (Rational::from(1), BasisKey::Index(0)),
                (Rational::from(2), BasisKey::Index(1)),
            ]),
        )
        .expect("degree 1 lands in degree 1");
        f.insert_image(
            BasisKey::Index(2),
            Vector::from_terms([(Rational::from(-1), BasisKey::Index(3))]),
        )
        .expect("degree 1 lands in degree 2");
        f
    }

    #[test]
    fn insert_checks_degrees() {
        use super::LinearMap;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector, vector_space::VectorSpace};
        let v = VectorSpace::build([(0, 1)]);
        let mut f: LinearMap<Rational> = LinearMap::zero(v.clone(), v, 1);
        assert!(f
            .insert_image(BasisKey::Index(0), Vector::basis_vector(BasisKey::Index(0)))
            .is_err());
        assert!(f
            .insert_image(BasisKey::Index(5), Vector::zero())
            .is_err());
        assert!(f.insert_image(BasisKey::Index(0), Vector::zero()).is_ok());
        assert!(f.is_zero());
    }

    #[test]
    fn composition_and_errors() {
        use super::LinearMap;
        let f = sample_map();
        let id_source = LinearMap::identity(f.source());
        let id_target = LinearMap::identity(f.target());
        assert_eq!(f.circ(&id_source), Ok(f.clone()));
        assert_eq!(id_target.circ(&f), Ok(f.clone()));
        assert!(f.circ(&f).is_err());
        assert!(f.verify().is_ok());
    }

    #[test]
    fn sums_cancel() {
        let f = sample_map();
        let zero = f.checked_sub(&f).expect("same shape");
        assert!(zero.is_zero());
        assert!(f.checked_add(&f.rejig_1(1)).is_err());
    }

    #[test]
    fn ker_im_rank_nullity() {
        let f = sample_map();
        assert_eq!(f.ker_im(), Ok((1, 2)));
        let g = f.checked_add(&f).expect("same shape");
        assert_eq!(g.ker_im(), Ok((1, 2)));
    }

    #[test]
    fn ker_im_dependent_columns() {
        use super::LinearMap;
        use crate::base_ring::finite_field::F3;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector, vector_space::VectorSpace};
        let v = VectorSpace::build([(0, 3)]);
        let mut f: LinearMap<F3> = LinearMap::zero(v.clone(), v, 0);
        let e = |i: usize| BasisKey::Index(i);
        f.insert_image(e(0), Vector::from_terms([(F3::from(1), e(0)), (F3::from(1), e(1))]))
            .expect("in range");
        f.insert_image(e(1), Vector::from_terms([(F3::from(1), e(1)), (F3::from(1), e(2))]))
            .expect("in range");
        f.insert_image(e(2), Vector::from_terms([(F3::from(1), e(0)), (F3::from(2), e(2))]))
            .expect("in range");
        // third column is first minus second mod 3
        assert_eq!(f.ker_im(), Ok((1, 2)));
    }

    #[test]
    fn random_ker_im_adds_up() {
        use super::LinearMap;
        use crate::base_ring::finite_field::Zp;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector, vector_space::VectorSpace};
        use rand::Rng;
        type F5 = Zp<5>;
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let rows = rng.gen_range(0..6);
            let cols = rng.gen_range(0..6);
            let source = VectorSpace::build([(0, cols)]);
            let target = VectorSpace::build([(0, rows)]);
            let mut f: LinearMap<F5> = LinearMap::zero(source, target, 0);
            for col in 0..cols {
                let image = Vector::from_terms(
                    (0..rows).map(|row| (F5::from(rng.gen_range(0..5)), BasisKey::Index(row))),
                );
                f.insert_image(BasisKey::Index(col), image).expect("in range");
            }
            let (nullity, rank) = f.ker_im().expect("field");
            assert_eq!(nullity + rank, cols);
            assert!(rank <= rows);
            let doubled = LinearMap::tensor(&[&f, &LinearMap::identity(&VectorSpace::build([(0, 2)]))]);
            assert_eq!(doubled.ker_im().expect("field"), (2 * nullity, 2 * rank));
        }
    }

    #[test]
    fn tensor_of_maps() {
        use super::LinearMap;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector, vector_space::VectorSpace};
        let f = sample_map();
        let u = VectorSpace::build([(3, 1)]);
        let s: LinearMap<Rational> = LinearMap::sigma(&u);
        let t = LinearMap::tensor(&[&f, &s]);
        assert_eq!(t.degree(), 1);
        assert_eq!(t.source(), &VectorSpace::tensor(&[f.source(), &u]));
        let key = BasisKey::tuple([BasisKey::Index(0), BasisKey::Index(0)]);
        assert_eq!(
            t.image(&key),
            Vector::from_terms([
                (
                    Rational::from(1),
                    BasisKey::tuple([BasisKey::Index(0), BasisKey::Index(0)])
                ),
                (
                    Rational::from(2),
                    BasisKey::tuple([BasisKey::Index(1), BasisKey::Index(0)])
                ),
            ])
        );
        assert!(t.verify().is_ok());
        assert_eq!(LinearMap::tensor(&[&f]), f);
    }

    #[test]
    fn sigma_signs() {
        use super::LinearMap;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector, vector_space::VectorSpace};
        let v = VectorSpace::build([(0, 1), (1, 1), (2, 1)]);
        let s: LinearMap<Rational> = LinearMap::sigma(&v);
        assert_eq!(
            s.image(&BasisKey::Index(0)),
            Vector::from_terms([(Rational::from(-1), BasisKey::Index(0))])
        );
        assert_eq!(
            s.image(&BasisKey::Index(1)),
            Vector::basis_vector(BasisKey::Index(1))
        );
        assert_eq!(s.circ(&s), Ok(LinearMap::identity(&v)));
    }

    #[test]
    fn block_shapes() {
        use super::LinearMap;
        use crate::base_ring::rationals::Rational;
        let f = sample_map();
        let zero_top = LinearMap::zero(f.source().clone(), f.target().clone(), 1);
        let b = LinearMap::block(&f, &zero_top, &zero_top, &f).expect("compatible");
        assert_eq!(b.source(), &f.source().oplus(f.source()));
        assert_eq!(b.ker_im(), Ok((2, 4)));
        assert!(b.verify().is_ok());
        let wrong_degree: LinearMap<Rational> =
            LinearMap::zero(f.source().clone(), f.target().clone(), 0);
        assert!(LinearMap::block(&f, &wrong_degree, &zero_top, &f).is_err());
        assert!(LinearMap::block(&f, &zero_top, &zero_top.rejig_1(1), &f).is_err());
    }

    #[test]
    fn rejig_round_trips() {
        use crate::base_ring::field_generals::Ring;
        use crate::base_ring::rationals::Rational;
        let f = sample_map();
        for m in -2..=2 {
            assert_eq!(f.rejig_1(m).rejig_1(-m), f);
            assert_eq!(f.rejig_2(m).rejig_2(-m), f);
            let composite = f.rejig_1(-m).rejig_2(m).scale(&Rational::sign(m));
            assert_eq!(f.rejig_3(m), composite);
            assert!(f.rejig_3(m).verify().is_ok());
            assert_eq!(f.rejig_3(m).degree(), f.degree() + m);
        }
    }

    #[test]
    fn restrict_to_graded_piece() {
        use crate::linear_algebra::vector_space::VectorSpace;
        let f = sample_map();
        let pieces = f.source().graded_pieces();
        let low = f.restrict(&pieces[&0]).expect("piece of the source");
        assert_eq!(low.ker_im(), Ok((1, 1)));
        assert!(f.restrict(&VectorSpace::build([(7, 1)])).is_err());
    }

    #[test]
    fn regrouping_source() {
        use super::LinearMap;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::vector_space::VectorSpace;
        let a = VectorSpace::build([(0, 1), (1, 1)]);
        let b = VectorSpace::build([(2, 1)]);
        let id_ab: LinearMap<Rational> = LinearMap::identity(&VectorSpace::tensor(&[&a, &b]));
        let nested = LinearMap::tensor(&[&LinearMap::identity(&a), &id_ab]);
        let flat = nested.flatten(1).expect("second factor is a tuple");
        assert_eq!(flat.source(), &VectorSpace::tensor(&[&a, &a, &b]));
        assert_eq!(flat.unflatten(1, 3), Ok(nested));
    }
}
