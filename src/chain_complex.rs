use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::base_ring::field_generals::Field;
use crate::error::{AlgebraError, AlgebraResult};
use crate::linear_algebra::{
    basis_key::BasisKey,
    linear_map::LinearMap,
    vector_space::{Degree, VectorSpace},
};

/// A graded space with a differential of degree `+1`.
#[derive(Clone, Debug, PartialEq)]
pub struct CochainComplex<F> {
    cochains: VectorSpace,
    differential: LinearMap<F>,
}

impl<F: Field + 'static> CochainComplex<F> {
    /// # Errors
    /// if the differential is not an endomorphism of degree 1
    pub fn new(differential: LinearMap<F>) -> AlgebraResult<Self> {
        if differential.source() != differential.target() {
            return Err(AlgebraError::incompatible(
                "CochainComplex::new",
                "a differential has the same source and target",
            ));
        }
        if differential.degree() != 1 {
            return Err(AlgebraError::incompatible(
                "CochainComplex::new",
                format!("a differential has degree 1, not {}", differential.degree()),
            ));
        }
        Ok(Self {
            cochains: differential.source().clone(),
            differential,
        })
    }

    /// the ground field sitting in `degree` with zero differential
    #[must_use]
    pub fn rank_one(degree: Degree) -> Self {
        let cochains = VectorSpace::from_basis([(BasisKey::Index(0), degree)]);
        Self {
            differential: LinearMap::zero(cochains.clone(), cochains.clone(), 1),
            cochains,
        }
    }

    #[must_use]
    pub fn cochains(&self) -> &VectorSpace {
        &self.cochains
    }

    #[must_use]
    pub fn differential(&self) -> &LinearMap<F> {
        &self.differential
    }

    /// dimension of `H^n` for every `n` where it is nonzero
    /// # Errors
    /// if the differential does not square to zero in some degree
    #[instrument(skip(self), fields(dimension = self.cochains.dimension()), level = "debug")]
    pub fn cohomology(&self) -> AlgebraResult<BTreeMap<Degree, usize>> {
        let mut nullity_rank = BTreeMap::new();
        for (degree, piece) in self.cochains.graded_pieces() {
            let restricted = self.differential.restrict(&piece)?;
            nullity_rank.insert(degree, restricted.ker_im()?);
        }
        let mut answer = BTreeMap::new();
        for (degree, (nullity, _)) in &nullity_rank {
            let incoming = nullity_rank.get(&(degree - 1)).map_or(0, |(_, rank)| *rank);
            let Some(betti) = nullity.checked_sub(incoming) else {
                return Err(AlgebraError::violation(
                    "CochainComplex::cohomology",
                    format!("image of rank {incoming} does not fit in a kernel of dimension {nullity} in degree {degree}"),
                ));
            };
            if betti > 0 {
                answer.insert(*degree, betti);
            }
        }
        debug!(?answer, "cohomology");
        Ok(answer)
    }

    /// # Errors
    /// if the differential is inconsistent with the grading or `d ∘ d != 0`
    pub fn verify(&self) -> AlgebraResult<()> {
        self.differential.verify()?;
        let square = self.differential.circ(&self.differential)?;
        if square.is_zero() {
            Ok(())
        } else {
            Err(AlgebraError::violation(
                "CochainComplex::verify",
                format!(
                    "d squares to a map nonzero on {} basis vectors",
                    square.support_size()
                ),
            ))
        }
    }

    /// `C[m]`
    #[must_use]
    pub fn shift(&self, how_much: Degree) -> Self {
        Self {
            cochains: self.cochains.shift(how_much),
            differential: self.differential.rejig_2(how_much),
        }
    }
}

mod test {

    #[test]
    fn sphere_zero_differential() {
        use super::CochainComplex;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{linear_map::LinearMap, vector_space::VectorSpace};
        let sphere = VectorSpace::build([(0, 1), (2, 1)]);
        let complex: CochainComplex<Rational> =
            CochainComplex::new(LinearMap::zero(sphere.clone(), sphere, 1)).expect("degree 1");
        assert!(complex.verify().is_ok());
        let cohomology = complex.cohomology().expect("d^2 = 0");
        assert_eq!(cohomology.into_iter().collect::<Vec<_>>(), vec![(0, 1), (2, 1)]);
    }

    #[test]
    fn acyclic_pair() {
        use super::CochainComplex;
        use crate::base_ring::finite_field::F2;
        use crate::linear_algebra::{
            basis_key::BasisKey, linear_map::LinearMap, vector::Vector, vector_space::VectorSpace,
        };
        let interval = VectorSpace::build([(0, 1), (1, 1)]);
        let mut d: LinearMap<F2> = LinearMap::zero(interval.clone(), interval, 1);
        d.insert_image(BasisKey::Index(0), Vector::basis_vector(BasisKey::Index(1)))
            .expect("degree 0 to degree 1");
        let complex = CochainComplex::new(d).expect("degree 1");
        assert!(complex.verify().is_ok());
        assert!(complex.cohomology().expect("d^2 = 0").is_empty());
        let shifted = complex.shift(3);
        assert!(shifted.verify().is_ok());
        assert!(shifted.cohomology().expect("d^2 = 0").is_empty());
    }

    #[test]
    fn rank_one_and_shift() {
        use super::CochainComplex;
        use crate::base_ring::finite_field::F3;
        let point: CochainComplex<F3> = CochainComplex::rank_one(-2);
        assert_eq!(
            point.cohomology().expect("zero differential").into_iter().collect::<Vec<_>>(),
            vec![(-2, 1)]
        );
        let moved = point.shift(-2);
        assert_eq!(
            moved.cohomology().expect("zero differential").into_iter().collect::<Vec<_>>(),
            vec![(0, 1)]
        );
    }

    #[test]
    fn rejects_bad_differentials() {
        use super::CochainComplex;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{linear_map::LinearMap, vector_space::VectorSpace};
        let v = VectorSpace::build([(0, 2)]);
        let w = VectorSpace::build([(1, 2)]);
        assert!(CochainComplex::<Rational>::new(LinearMap::zero(v.clone(), v.clone(), 0)).is_err());
        assert!(CochainComplex::<Rational>::new(LinearMap::zero(v, w, 1)).is_err());
    }
}
