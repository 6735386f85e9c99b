use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument, trace};

use super::module::A8Module;
use super::words::{all_splices, cut, show_word, word_length, ObjectLabel};
use crate::base_ring::field_generals::Field;
use crate::error::{AlgebraError, AlgebraResult};
use crate::linear_algebra::{
    linear_map::LinearMap,
    vector_space::{VectorSpace, ZERO_SPACE},
};

/// An A∞ category with finitely many objects.
///
/// `mu(X_0, .., X_d)` is the operation
/// `hom(X_{d-1},X_d) ⊗ .. ⊗ hom(X_0,X_1) -> hom(X_0,X_d)` of degree `2-d`.
/// Missing hom spaces are zero and missing operations are zero maps.
#[derive(Clone, Debug)]
pub struct A8Category<O, F> {
    objects: BTreeSet<O>,
    homs: BTreeMap<(O, O), VectorSpace>,
    operations: BTreeMap<Vec<O>, LinearMap<F>>,
}

impl<O: ObjectLabel, F: Field + 'static> A8Category<O, F> {
    /// # Errors
    /// if a hom space or operation mentions an unknown object,
    /// or an operation has the wrong source, target or degree for its word
    pub fn new(
        objects: BTreeSet<O>,
        homs: BTreeMap<(O, O), VectorSpace>,
        operations: BTreeMap<Vec<O>, LinearMap<F>>,
    ) -> AlgebraResult<Self> {
        for (x, y) in homs.keys() {
            for object in [x, y] {
                if !objects.contains(object) {
                    return Err(AlgebraError::UndefinedObject(object.to_string()));
                }
            }
        }
        let answer = Self {
            objects,
            homs,
            operations,
        };
        for (word, operation) in &answer.operations {
            answer.check_operation(word, operation)?;
        }
        Ok(answer)
    }

    fn check_operation(&self, word: &[O], operation: &LinearMap<F>) -> AlgebraResult<()> {
        if let Some(unknown) = word.iter().find(|x| !self.objects.contains(*x)) {
            return Err(AlgebraError::UndefinedObject(unknown.to_string()));
        }
        let (Some(first), Some(last)) = (word.first(), word.last()) else {
            return Err(AlgebraError::incompatible("A8Category", "empty word"));
        };
        if word.len() < 2 {
            return Err(AlgebraError::incompatible(
                "A8Category",
                format!("operation {} has no inputs", show_word(word)),
            ));
        }
        if operation.source() != &self.hom_word(word)
            || operation.target() != self.hom(first, last)
            || operation.degree() != 3 - word_length(word)
        {
            return Err(AlgebraError::incompatible(
                "A8Category",
                format!(
                    "operation {} is not a map of degree {} from the tensor of its hom spaces to {}",
                    show_word(word),
                    3 - word_length(word),
                    self.hom(first, last)
                ),
            ));
        }
        Ok(())
    }

    pub fn objects(&self) -> impl Iterator<Item = &O> + '_ {
        self.objects.iter()
    }

    #[must_use]
    pub fn contains(&self, object: &O) -> bool {
        self.objects.contains(object)
    }

    /// the stored morphism space, zero if there is none
    #[must_use]
    pub fn hom(&self, source: &O, target: &O) -> &VectorSpace {
        self.homs
            .get(&(source.clone(), target.clone()))
            .unwrap_or(&ZERO_SPACE)
    }

    pub(crate) fn has_hom(&self, source: &O, target: &O) -> bool {
        self.homs.contains_key(&(source.clone(), target.clone()))
    }

    /// `hom(X_{d-1},X_d) ⊗ .. ⊗ hom(X_0,X_1)`, keys `(a_d, .., a_1)`
    #[must_use]
    pub fn hom_word(&self, word: &[O]) -> VectorSpace {
        let factors = word
            .windows(2)
            .rev()
            .map(|pair| self.hom(&pair[0], &pair[1]))
            .collect::<Vec<_>>();
        VectorSpace::tensor(&factors)
    }

    /// the stored operation or the zero map of the same shape
    #[must_use]
    pub fn mu(&self, word: &[O]) -> Cow<'_, LinearMap<F>> {
        match self.operations.get(word) {
            Some(operation) => Cow::Borrowed(operation),
            None => {
                let target = match (word.first(), word.last()) {
                    (Some(first), Some(last)) => self.hom(first, last).clone(),
                    _ => VectorSpace::zero_space(),
                };
                Cow::Owned(LinearMap::zero(
                    self.hom_word(word),
                    target,
                    3 - word_length(word),
                ))
            }
        }
    }

    pub fn operations(&self) -> impl Iterator<Item = (&Vec<O>, &LinearMap<F>)> + '_ {
        self.operations.iter()
    }

    /// words where one stored operation can be fed into another
    #[must_use]
    pub fn super_words(&self) -> BTreeSet<Vec<O>> {
        all_splices(self.operations.keys(), self.operations.keys())
    }

    /// Left hand side of the A∞ relation at `word`
    /// ```text
    /// sum (-1)^{✠_n} mu(a_d, .., a_{n+m+1}, mu(a_{n+m}, .., a_{n+1}), a_n, .., a_1)
    /// ```
    /// with `✠_n = sum_{j <= n} (|a_j| - 1)`.
    /// # Errors
    /// if `word` has fewer than two objects
    pub fn relation(&self, word: &[O]) -> AlgebraResult<LinearMap<F>> {
        let (Some(first), Some(last)) = (word.first(), word.last()) else {
            return Err(AlgebraError::incompatible("relation", "empty word"));
        };
        let arity = word.len() - 1;
        if arity == 0 {
            return Err(AlgebraError::incompatible(
                "relation",
                "a word needs at least two objects",
            ));
        }
        let mut total = LinearMap::zero(
            self.hom_word(word),
            self.hom(first, last).clone(),
            4 - word_length(word),
        );
        for start in 0..arity {
            for inner_arity in 1..=arity - start {
                let inner = self.mu(&word[start..=start + inner_arity]);
                let after = (start + inner_arity + 1..=arity)
                    .rev()
                    .map(|i| LinearMap::identity(self.hom(&word[i - 1], &word[i])))
                    .collect::<Vec<_>>();
                let before = (1..=start)
                    .rev()
                    .map(|i| LinearMap::sigma(self.hom(&word[i - 1], &word[i])))
                    .collect::<Vec<_>>();
                let factors = after
                    .iter()
                    .chain(core::iter::once(inner.as_ref()))
                    .chain(before.iter())
                    .collect::<Vec<_>>();
                let mut feed = LinearMap::tensor(&factors);
                if inner_arity > 1 && inner_arity != arity {
                    feed = feed.flatten(arity - start - inner_arity)?;
                }
                let outer = self.mu(&cut(word, start, inner_arity));
                total = total.checked_add(&outer.circ(&feed)?)?;
            }
        }
        Ok(total)
    }

    /// Checks every stored operation and the A∞ relations on all super words.
    /// # Errors
    /// `InvariantViolation` naming the first word where something fails
    #[instrument(skip(self), fields(operations = self.operations.len()))]
    pub fn verify(&self) -> AlgebraResult<()> {
        for (word, operation) in &self.operations {
            self.check_operation(word, operation)?;
            operation.verify().map_err(|e| {
                AlgebraError::violation(format!("A8Category::verify {}", show_word(word)), e.to_string())
            })?;
        }
        let super_words = self.super_words();
        debug!(count = super_words.len(), "checking A∞ relations");
        for word in &super_words {
            let relation = self.relation(word)?;
            if !relation.is_zero() {
                return Err(AlgebraError::violation(
                    "A8Category::verify",
                    format!(
                        "A∞ relation fails at {} on {} basis vectors",
                        show_word(word),
                        relation.support_size()
                    ),
                ));
            }
            trace!(word = %show_word(word), "relation holds");
        }
        info!("category verified");
        Ok(())
    }

    /// the module `X -> hom(X, target)`
    /// # Errors
    /// if `target` is not an object
    pub fn yoneda(&self, target: &O) -> AlgebraResult<A8Module<'_, O, F>> {
        if !self.contains(target) {
            return Err(AlgebraError::UndefinedObject(target.to_string()));
        }
        let fibers = self
            .objects
            .iter()
            .filter(|x| self.has_hom(x, target))
            .map(|x| (x.clone(), self.hom(x, target).clone()))
            .collect();
        let operations = self
            .operations
            .iter()
            .filter(|(word, _)| word.last() == Some(target))
            .map(|(word, operation)| (word[..word.len() - 1].to_vec(), operation.clone()))
            .collect();
        Ok(A8Module::assemble(self, fibers, operations))
    }

    /// the direct sum of the Yoneda modules of all objects
    /// # Errors
    /// only if the basis bookkeeping breaks
    #[instrument(skip(self))]
    pub fn total_yoneda(&self) -> AlgebraResult<A8Module<'_, O, F>> {
        let mut total = A8Module::zero(self);
        for object in &self.objects {
            total = total.oplus(&self.yoneda(object)?)?.simplify()?;
        }
        Ok(total)
    }
}

mod test {

    #[allow(dead_code)]
    fn sphere<F: crate::base_ring::field_generals::Field + 'static>(
    ) -> super::A8Category<char, F> {
        use super::A8Category;
        use crate::linear_algebra::{
            basis_key::BasisKey, linear_map::LinearMap, vector::Vector, vector_space::VectorSpace,
        };
        let cohomology = VectorSpace::build([(0, 1), (2, 1)]);
        let unit = BasisKey::Index(0);
        let point = BasisKey::Index(1);
        let square = VectorSpace::tensor(&[&cohomology, &cohomology]);
        let mut product = LinearMap::zero(square, cohomology.clone(), 0);
        for (b, a, c) in [
            (&unit, &unit, &unit),
            (&point, &unit, &point),
            (&unit, &point, &point),
        ] {
            // |a| is even so no sign
            product
                .insert_image(
                    BasisKey::tuple([b.clone(), a.clone()]),
                    Vector::basis_vector(c.clone()),
                )
                .expect("degrees add up");
        }
        A8Category::new(
            ['S'].into_iter().collect(),
            [(('S', 'S'), cohomology)].into_iter().collect(),
            [(vec!['S', 'S', 'S'], product)].into_iter().collect(),
        )
        .expect("well formed")
    }

    #[test]
    fn sphere_is_associative() {
        use crate::base_ring::{finite_field::F2, rationals::Rational};
        let over_q = sphere::<Rational>();
        assert!(over_q.verify().is_ok());
        assert_eq!(over_q.super_words().len(), 1);
        assert!(sphere::<F2>().verify().is_ok());
    }

    #[test]
    fn broken_sign_is_caught() {
        use super::A8Category;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{basis_key::BasisKey, vector::Vector};
        let good = sphere::<Rational>();
        let word = vec!['S', 'S', 'S'];
        let mut product = good.mu(&word).into_owned();
        product
            .insert_image(
                BasisKey::tuple([BasisKey::Index(1), BasisKey::Index(0)]),
                Vector::from_terms([(Rational::from(-1), BasisKey::Index(1))]),
            )
            .expect("same degree");
        let bad: A8Category<char, Rational> = A8Category::new(
            good.objects().copied().collect(),
            [(('S', 'S'), good.hom(&'S', &'S').clone())].into_iter().collect(),
            [(word, product)].into_iter().collect(),
        )
        .expect("well formed");
        match bad.verify() {
            Err(crate::error::AlgebraError::InvariantViolation { detail, .. }) => {
                assert!(detail.contains("(S,S,S,S)"), "{detail}");
            }
            other => panic!("expected a failing relation, got {other:?}"),
        }
    }

    /// `A` and `B` with units, `hom(A,B) = <f, g>` in degrees 0 and 1 and `mu^1(f) = g`.
    /// With `twisted` the unit of `B` acts on `g` with the wrong sign.
    #[allow(dead_code)]
    fn interval<F: crate::base_ring::field_generals::Field + 'static>(
        twisted: bool,
    ) -> super::A8Category<char, F> {
        use super::A8Category;
        use crate::linear_algebra::{
            basis_key::BasisKey, linear_map::LinearMap, vector::Vector, vector_space::VectorSpace,
        };
        let unit = BasisKey::Index(0);
        let (f, g) = (BasisKey::Index(0), BasisKey::Index(1));
        let endomorphisms = VectorSpace::from_basis([(unit.clone(), 0)]);
        let between = VectorSpace::from_basis([(f.clone(), 0), (g.clone(), 1)]);
        let mut differential = LinearMap::zero(between.clone(), between.clone(), 1);
        differential
            .insert_image(f.clone(), Vector::basis_vector(g.clone()))
            .expect("degree 1");
        let mut operations = std::collections::BTreeMap::new();
        operations.insert(vec!['A', 'B'], differential);
        for x in ['A', 'B'] {
            let mut square = LinearMap::zero(
                VectorSpace::tensor(&[&endomorphisms, &endomorphisms]),
                endomorphisms.clone(),
                0,
            );
            square
                .insert_image(
                    BasisKey::tuple([unit.clone(), unit.clone()]),
                    Vector::basis_vector(unit.clone()),
                )
                .expect("degree 0");
            operations.insert(vec![x, x, x], square);
        }
        let mut right_unit = LinearMap::zero(
            VectorSpace::tensor(&[&between, &endomorphisms]),
            between.clone(),
            0,
        );
        let mut left_unit = LinearMap::zero(
            VectorSpace::tensor(&[&endomorphisms, &between]),
            between.clone(),
            0,
        );
        for (key, degree) in [(&f, 0), (&g, 1)] {
            right_unit
                .insert_image(
                    BasisKey::tuple([key.clone(), unit.clone()]),
                    Vector::basis_vector(key.clone()),
                )
                .expect("degree 0");
            let sign = if twisted { F::one() } else { F::sign(degree) };
            left_unit
                .insert_image(
                    BasisKey::tuple([unit.clone(), key.clone()]),
                    Vector::from_terms([(sign, key.clone())]),
                )
                .expect("degree 0");
        }
        operations.insert(vec!['A', 'A', 'B'], right_unit);
        operations.insert(vec!['A', 'B', 'B'], left_unit);
        A8Category::new(
            ['A', 'B'].into_iter().collect(),
            [
                (('A', 'A'), endomorphisms.clone()),
                (('B', 'B'), endomorphisms),
                (('A', 'B'), between),
            ]
            .into_iter()
            .collect(),
            operations,
        )
        .expect("well formed")
    }

    /// `0 -a-> 1 -b-> 2 -c-> 3` in degree 1 with `mu^2(c, mu^2(b, a)) = 0`,
    /// `mu^2(mu^2(c, b), a) = p` and `mu^3(c, b, a) = -q` where `mu^1(q) = p`.
    /// With `twisted` the sign of `mu^3` is flipped.
    #[allow(dead_code)]
    fn homotopy_associative<F: crate::base_ring::field_generals::Field + 'static>(
        twisted: bool,
    ) -> super::A8Category<usize, F> {
        use super::A8Category;
        use crate::linear_algebra::{
            basis_key::BasisKey, linear_map::LinearMap, vector::Vector, vector_space::VectorSpace,
        };
        let only = BasisKey::Index(0);
        let (p, q) = (BasisKey::Index(0), BasisKey::Index(1));
        let arrow = VectorSpace::from_basis([(only.clone(), 1)]);
        let pair = VectorSpace::from_basis([(only.clone(), 2)]);
        let long = VectorSpace::from_basis([(p.clone(), 3), (q.clone(), 2)]);
        let homs = [
            ((0, 1), arrow.clone()),
            ((1, 2), arrow.clone()),
            ((2, 3), arrow.clone()),
            ((0, 2), pair.clone()),
            ((1, 3), pair.clone()),
            ((0, 3), long.clone()),
        ];
        fn operation<F: crate::base_ring::field_generals::Field + 'static>(
            factors: &[&VectorSpace],
            target: &VectorSpace,
            degree: crate::linear_algebra::vector_space::Degree,
            key: BasisKey,
            image: Vector<F>,
        ) -> LinearMap<F> {
            let mut map = LinearMap::zero(VectorSpace::tensor(factors), target.clone(), degree);
            map.insert_image(key, image).expect("degrees add up");
            map
        }
        let two = BasisKey::tuple([only.clone(), only.clone()]);
        let three = BasisKey::tuple([only.clone(), only.clone(), only.clone()]);
        let mu3_sign = if twisted { F::one() } else { -F::one() };
        let operations = [
            (
                vec![0, 1, 2],
                operation(&[&arrow, &arrow], &pair, 0, two.clone(), Vector::basis_vector(only.clone())),
            ),
            (
                vec![1, 2, 3],
                operation(&[&arrow, &arrow], &pair, 0, two.clone(), Vector::basis_vector(only.clone())),
            ),
            (
                vec![0, 1, 3],
                operation(&[&pair, &arrow], &long, 0, two, Vector::basis_vector(p.clone())),
            ),
            (
                vec![0, 3],
                operation(&[&long], &long, 1, q.clone(), Vector::basis_vector(p)),
            ),
            (
                vec![0, 1, 2, 3],
                operation(
                    &[&arrow, &arrow, &arrow],
                    &long,
                    -1,
                    three,
                    Vector::from_terms([(mu3_sign, q)]),
                ),
            ),
        ];
        A8Category::new(
            (0..=3).collect(),
            homs.into_iter().collect(),
            operations.into_iter().collect(),
        )
        .expect("well formed")
    }

    #[test]
    fn differential_obeys_leibniz() {
        use crate::base_ring::{finite_field::F3, rationals::Rational};
        let category = interval::<Rational>(false);
        assert!(category.verify().is_ok());
        assert!(interval::<F3>(false).verify().is_ok());
        let yoneda = category.yoneda(&'B').expect("B is an object");
        assert!(yoneda.verify().is_ok());
        assert_eq!(
            yoneda.total().expect("complexes").into_iter().collect::<Vec<_>>(),
            vec![(0, 1)]
        );
        assert!(yoneda.twist(&'A').expect("A is an object").verify().is_ok());
        let twisted = category
            .yoneda(&'A')
            .expect("A is an object")
            .twist_word(&['B', 'A', 'B'])
            .expect("objects");
        assert!(twisted.verify().is_ok());
        assert!(twisted.total().expect("complexes").is_empty());
        let total = category.total_yoneda().expect("sums");
        assert!(total.verify().is_ok());
        assert_eq!(
            total.total().expect("complexes").into_iter().collect::<Vec<_>>(),
            vec![(0, 2)]
        );
    }

    #[test]
    fn wrong_leibniz_sign_is_caught() {
        use crate::base_ring::rationals::Rational;
        match interval::<Rational>(true).verify() {
            Err(crate::error::AlgebraError::InvariantViolation { detail, .. }) => {
                assert!(detail.contains("(A,B,B)"), "{detail}");
            }
            other => panic!("expected a failing relation, got {other:?}"),
        }
    }

    #[test]
    fn higher_product_corrects_associativity() {
        use crate::base_ring::{finite_field::F3, rationals::Rational};
        let category = homotopy_associative::<Rational>(false);
        assert!(category.super_words().contains(&vec![0, 1, 2, 3]));
        assert!(category.relation(&[0, 1, 2, 3]).expect("word").is_zero());
        assert!(category.verify().is_ok());
        assert!(homotopy_associative::<F3>(false).verify().is_ok());
        assert!(category.yoneda(&3).expect("object").verify().is_ok());
        let broken = homotopy_associative::<Rational>(true);
        assert_eq!(
            broken.relation(&[0, 1, 2, 3]).expect("word").support_size(),
            1
        );
        assert!(broken.verify().is_err());
    }

    #[test]
    fn zero_fallback_has_the_stored_shape() {
        use crate::base_ring::rationals::Rational;
        let category = sphere::<Rational>();
        let stored = category.mu(&['S', 'S', 'S']);
        let longer = category.mu(&['S', 'S', 'S', 'S']);
        assert!(!stored.is_zero());
        assert!(longer.is_zero());
        assert_eq!(longer.degree(), -1);
        assert_eq!(longer.source().dimension(), 8);
        assert_eq!(longer.target(), category.hom(&'S', &'S'));
        assert_eq!(category.hom(&'S', &'T').dimension(), 0);
    }

    #[test]
    fn malformed_operations_rejected() {
        use super::A8Category;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{linear_map::LinearMap, vector_space::VectorSpace};
        let v = VectorSpace::build([(0, 1)]);
        let wrong_degree: LinearMap<Rational> =
            LinearMap::zero(VectorSpace::tensor(&[&v, &v]), v.clone(), 1);
        let attempt = A8Category::new(
            [0usize].into_iter().collect(),
            [((0, 0), v.clone())].into_iter().collect(),
            [(vec![0, 0, 0], wrong_degree)].into_iter().collect(),
        );
        assert!(attempt.is_err());
        let unknown: Result<A8Category<usize, Rational>, _> = A8Category::new(
            [0usize].into_iter().collect(),
            [((0, 1), v)].into_iter().collect(),
            Default::default(),
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn yoneda_of_the_sphere() {
        use crate::base_ring::rationals::Rational;
        let category = sphere::<Rational>();
        let module = category.yoneda(&'S').expect("S is an object");
        assert!(module.verify().is_ok());
        assert_eq!(
            module.total().expect("complexes").into_iter().collect::<Vec<_>>(),
            vec![(0, 1), (2, 1)]
        );
        assert!(category.yoneda(&'T').is_err());
    }
}
