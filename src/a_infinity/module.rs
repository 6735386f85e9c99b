use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument, trace};

use super::category::A8Category;
use super::module_map::A8ModuleMap;
use super::words::{all_splices, concatenation, cut, show_word, word_length, ObjectLabel};
use crate::base_ring::field_generals::Field;
use crate::chain_complex::CochainComplex;
use crate::error::{AlgebraError, AlgebraResult};
use crate::linear_algebra::{
    basis_key::BasisKey,
    linear_map::LinearMap,
    vector_space::{Degree, VectorSpace, ZERO_SPACE},
};

/// A right A∞ module over a borrowed category.
///
/// `mu(X_0, .., X_{d-1})` is the operation
/// `M(X_{d-1}) ⊗ hom(X_{d-2},X_{d-1}) ⊗ .. ⊗ hom(X_0,X_1) -> M(X_0)` of degree `2-d`.
/// Missing fibers are zero and missing operations are zero maps.
#[derive(Clone, Debug)]
pub struct A8Module<'a, O, F> {
    category: &'a A8Category<O, F>,
    fibers: BTreeMap<O, VectorSpace>,
    operations: BTreeMap<Vec<O>, LinearMap<F>>,
}

impl<'a, O: ObjectLabel, F: Field + 'static> A8Module<'a, O, F> {
    /// # Errors
    /// if a fiber or operation mentions an object the category lacks,
    /// or an operation has the wrong source, target or degree for its word
    pub fn new(
        category: &'a A8Category<O, F>,
        fibers: BTreeMap<O, VectorSpace>,
        operations: BTreeMap<Vec<O>, LinearMap<F>>,
    ) -> AlgebraResult<Self> {
        if let Some(unknown) = fibers.keys().find(|x| !category.contains(x)) {
            return Err(AlgebraError::UndefinedObject(unknown.to_string()));
        }
        let answer = Self::assemble(category, fibers, operations);
        for (word, operation) in &answer.operations {
            answer.check_operation(word, operation)?;
        }
        Ok(answer)
    }

    /// no shape checks, for constructions that are correct by design
    pub(crate) fn assemble(
        category: &'a A8Category<O, F>,
        fibers: BTreeMap<O, VectorSpace>,
        operations: BTreeMap<Vec<O>, LinearMap<F>>,
    ) -> Self {
        Self {
            category,
            fibers,
            operations,
        }
    }

    /// the module with every fiber zero
    #[must_use]
    pub fn zero(category: &'a A8Category<O, F>) -> Self {
        Self::assemble(category, BTreeMap::new(), BTreeMap::new())
    }

    fn check_operation(&self, word: &[O], operation: &LinearMap<F>) -> AlgebraResult<()> {
        if let Some(unknown) = word.iter().find(|x| !self.category.contains(x)) {
            return Err(AlgebraError::UndefinedObject(unknown.to_string()));
        }
        let Some(first) = word.first() else {
            return Err(AlgebraError::incompatible("A8Module", "empty word"));
        };
        if operation.source() != &self.op_source(word)
            || operation.target() != self.fiber(first)
            || operation.degree() != 2 - word_length(word)
        {
            return Err(AlgebraError::incompatible(
                "A8Module",
                format!(
                    "operation {} is not a map of degree {} into {}",
                    show_word(word),
                    2 - word_length(word),
                    self.fiber(first)
                ),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn category(&self) -> &'a A8Category<O, F> {
        self.category
    }

    /// `M(X)`, zero if nothing is stored
    #[must_use]
    pub fn fiber(&self, object: &O) -> &VectorSpace {
        self.fibers.get(object).unwrap_or(&ZERO_SPACE)
    }

    pub fn fibers(&self) -> impl Iterator<Item = (&O, &VectorSpace)> + '_ {
        self.fibers.iter()
    }

    pub fn operations(&self) -> impl Iterator<Item = (&Vec<O>, &LinearMap<F>)> + '_ {
        self.operations.iter()
    }

    /// `M(X_{d-1}) ⊗ hom(X_{d-2},X_{d-1}) ⊗ .. ⊗ hom(X_0,X_1)`,
    /// just the fiber for a word of length one
    #[must_use]
    pub fn op_source(&self, word: &[O]) -> VectorSpace {
        let Some(last) = word.last() else {
            return VectorSpace::zero_space();
        };
        let factors = core::iter::once(self.fiber(last))
            .chain(
                word.windows(2)
                    .rev()
                    .map(|pair| self.category.hom(&pair[0], &pair[1])),
            )
            .collect::<Vec<_>>();
        VectorSpace::tensor(&factors)
    }

    /// the stored operation or the zero map of the same shape
    #[must_use]
    pub fn mu(&self, word: &[O]) -> Cow<'_, LinearMap<F>> {
        match self.operations.get(word) {
            Some(operation) => Cow::Borrowed(operation),
            None => {
                let target = word
                    .first()
                    .map_or_else(VectorSpace::zero_space, |first| self.fiber(first).clone());
                Cow::Owned(LinearMap::zero(
                    self.op_source(word),
                    target,
                    2 - word_length(word),
                ))
            }
        }
    }

    /// words where a category operation feeds into a module operation
    /// or one module operation feeds into another
    #[must_use]
    pub fn super_words(&self) -> BTreeSet<Vec<O>> {
        let mut answer = all_splices(self.operations.keys(), self.category.operations().map(|(w, _)| w));
        for outer in self.operations.keys() {
            for inner in self.operations.keys() {
                answer.extend(concatenation(outer, inner));
            }
        }
        answer
    }

    /// Left hand side of the module A∞ relation at `word`.
    ///
    /// Terms with an inner category operation among the morphisms,
    /// then terms with an inner module operation eating the module element
    /// and the last morphisms.
    /// # Errors
    /// if `word` is empty
    pub fn relation(&self, word: &[O]) -> AlgebraResult<LinearMap<F>> {
        let (Some(first), Some(last)) = (word.first(), word.last()) else {
            return Err(AlgebraError::incompatible("relation", "empty word"));
        };
        let length = word.len();
        let hom_at = |i: usize| self.category.hom(&word[i - 1], &word[i]);
        let mut total = LinearMap::zero(
            self.op_source(word),
            self.fiber(first).clone(),
            3 - word_length(word),
        );
        let module_identity = LinearMap::identity(self.fiber(last));
        for start in 0..length.saturating_sub(1) {
            for inner_arity in 1..length - start {
                let inner = self.category.mu(&word[start..=start + inner_arity]);
                let after = (start + inner_arity + 1..length)
                    .rev()
                    .map(|i| LinearMap::identity(hom_at(i)))
                    .collect::<Vec<_>>();
                let before = (1..=start)
                    .rev()
                    .map(|i| LinearMap::sigma(hom_at(i)))
                    .collect::<Vec<_>>();
                let factors = core::iter::once(&module_identity)
                    .chain(after.iter())
                    .chain(core::iter::once(inner.as_ref()))
                    .chain(before.iter())
                    .collect::<Vec<_>>();
                let mut feed = LinearMap::tensor(&factors);
                if inner_arity > 1 {
                    feed = feed.flatten(length - start - inner_arity)?;
                }
                let outer = self.mu(&cut(word, start, inner_arity));
                total = total.checked_add(&outer.circ(&feed)?)?;
            }
        }
        for start in 0..length {
            let inner = self.mu(&word[start..]);
            let feed = if start == 0 {
                inner.into_owned()
            } else {
                let before = (1..=start)
                    .rev()
                    .map(|i| LinearMap::sigma(hom_at(i)))
                    .collect::<Vec<_>>();
                let factors = core::iter::once(inner.as_ref())
                    .chain(before.iter())
                    .collect::<Vec<_>>();
                let tensored = LinearMap::tensor(&factors);
                if length - start >= 2 {
                    tensored.flatten(0)?
                } else {
                    tensored
                }
            };
            let outer = self.mu(&word[..=start]);
            total = total.checked_add(&outer.circ(&feed)?)?;
        }
        Ok(total)
    }

    /// Checks every stored operation and the module A∞ relations on all super words.
    /// # Errors
    /// `InvariantViolation` naming the first word where something fails
    #[instrument(skip(self), fields(fibers = self.fibers.len(), operations = self.operations.len()))]
    pub fn verify(&self) -> AlgebraResult<()> {
        for (word, operation) in &self.operations {
            self.check_operation(word, operation).map_err(|e| {
                AlgebraError::violation("A8Module::verify", e.to_string())
            })?;
            operation.verify().map_err(|e| {
                AlgebraError::violation(format!("A8Module::verify {}", show_word(word)), e.to_string())
            })?;
        }
        let super_words = self.super_words();
        debug!(count = super_words.len(), "checking module relations");
        for word in &super_words {
            let relation = self.relation(word)?;
            if !relation.is_zero() {
                return Err(AlgebraError::violation(
                    "A8Module::verify",
                    format!(
                        "module relation fails at {} on {} basis vectors",
                        show_word(word),
                        relation.support_size()
                    ),
                ));
            }
            trace!(word = %show_word(word), "relation holds");
        }
        info!("module verified");
        Ok(())
    }

    /// `(M(object), mu(object))`
    /// # Errors
    /// if the stored differential has the wrong shape
    pub fn cpx(&self, object: &O) -> AlgebraResult<CochainComplex<F>> {
        CochainComplex::new(self.mu(core::slice::from_ref(object)).into_owned())
    }

    /// `Z ⊗ M` with `mu^1 = Id ⊗ mu^1_M + δ ⊗ σ` and `mu^d = Id ⊗ mu^d_M` otherwise,
    /// fiber keys are `(c, y)`
    /// # Errors
    /// only if the basis bookkeeping breaks
    pub fn ltimes(&self, complex: &CochainComplex<F>) -> AlgebraResult<Self> {
        let cochains = complex.cochains();
        let cochain_identity = LinearMap::identity(cochains);
        let fibers = self
            .fibers
            .iter()
            .map(|(x, fiber)| (x.clone(), VectorSpace::tensor(&[cochains, fiber])))
            .collect();
        let mut operations = BTreeMap::new();
        for (x, fiber) in &self.fibers {
            let word = vec![x.clone()];
            let internal = LinearMap::tensor(&[&cochain_identity, self.mu(&word).as_ref()]);
            let external = LinearMap::tensor(&[complex.differential(), &LinearMap::sigma(fiber)]);
            operations.insert(word, internal.checked_add(&external)?);
        }
        for (word, operation) in &self.operations {
            if word.len() > 1 {
                let tensored = LinearMap::tensor(&[&cochain_identity, operation])
                    .flatten(1)?
                    .unflatten(0, 2)?;
                operations.insert(word.clone(), tensored);
            }
        }
        Ok(Self::assemble(self.category, fibers, operations))
    }

    /// `M[m]`, every fiber shifted and every operation kept as it is.
    /// Agrees with `ltimes` by `CochainComplex::rank_one(-m)` up to relabelling the basis.
    #[must_use]
    pub fn shift(&self, how_much: Degree) -> Self {
        Self::assemble(
            self.category,
            self.fibers
                .iter()
                .map(|(x, fiber)| (x.clone(), fiber.shift(how_much)))
                .collect(),
            self.operations
                .iter()
                .map(|(word, operation)| (word.clone(), operation.shift(how_much)))
                .collect(),
        )
    }

    /// The twist of `self` around `object`, the cone of the evaluation
    /// `Y(object) ⊗ M(object) -> M` whose components are the operations of `self`
    /// ending at `object`.
    /// # Errors
    /// if `object` is not an object of the category
    #[instrument(skip_all, fields(object = %object))]
    pub fn twist(&self, object: &O) -> AlgebraResult<Self> {
        let yoneda = self.category.yoneda(object)?;
        let complex = self.cpx(object)?;
        let tensored = yoneda.ltimes(&complex)?;
        let mut evaluation = BTreeMap::new();
        for (word, operation) in &self.operations {
            if word.len() < 2 || word.last() != Some(object) {
                continue;
            }
            let inputs = &word[..word.len() - 1];
            let arity = inputs.len();
            let (reshaped, signs) = if arity == 1 {
                (
                    Cow::Borrowed(operation),
                    LinearMap::sigma(tensored.fiber(&inputs[0])),
                )
            } else {
                let sigmas = core::iter::once(LinearMap::sigma(tensored.fiber(&inputs[arity - 1])))
                    .chain(
                        (1..arity)
                            .rev()
                            .map(|i| LinearMap::sigma(self.category.hom(&inputs[i - 1], &inputs[i]))),
                    )
                    .collect::<Vec<_>>();
                (
                    Cow::Owned(operation.unflatten(0, 2)?),
                    LinearMap::tensor(&sigmas.iter().collect::<Vec<_>>()),
                )
            };
            evaluation.insert(inputs.to_vec(), -reshaped.circ(&signs)?);
        }
        debug!(components = evaluation.len(), "evaluation map");
        let evaluation = A8ModuleMap::new(&tensored, self, 0, evaluation)?;
        evaluation.cone()?.simplify()
    }

    /// twist around each object of `word` in turn, first letter first
    /// # Errors
    /// if some letter is not an object of the category
    pub fn twist_word(&self, word: &[O]) -> AlgebraResult<Self> {
        word.iter()
            .try_fold(self.clone(), |module, object| module.twist(object))
    }

    /// the same module with every fiber basis renamed to `Index(0), Index(1), ..`
    /// # Errors
    /// only if an operation refers to a basis key outside its fibers
    #[instrument(skip(self), level = "debug")]
    pub fn simplify(&self) -> AlgebraResult<Self> {
        let renaming = self
            .fibers
            .iter()
            .map(|(x, fiber)| {
                let table = fiber
                    .keys()
                    .enumerate()
                    .map(|(idx, key)| (key.clone(), BasisKey::Index(idx)))
                    .collect::<BTreeMap<_, _>>();
                (x.clone(), table)
            })
            .collect::<BTreeMap<_, _>>();
        let fibers = self
            .fibers
            .iter()
            .map(|(x, fiber)| {
                let basis = fiber
                    .basis()
                    .enumerate()
                    .map(|(idx, (_, degree))| (BasisKey::Index(idx), degree));
                (x.clone(), VectorSpace::from_basis(basis))
            })
            .collect();
        let mut simplified = Self::zero(self.category);
        simplified.fibers = fibers;
        let empty = BTreeMap::new();
        let mut operations = BTreeMap::new();
        for (word, operation) in &self.operations {
            let (Some(first), Some(last)) = (word.first(), word.last()) else {
                continue;
            };
            let first_table = renaming.get(first).unwrap_or(&empty);
            let last_table = renaming.get(last).unwrap_or(&empty);
            let rename = |table: &BTreeMap<BasisKey, BasisKey>, key: &BasisKey| {
                table
                    .get(key)
                    .cloned()
                    .ok_or_else(|| AlgebraError::MalformedKey {
                        operation: "simplify",
                        key: key.to_string(),
                    })
            };
            let renamed = operation.rekey(
                simplified.op_source(word),
                simplified.fiber(first).clone(),
                |key| {
                    if word.len() == 1 {
                        return rename(last_table, key);
                    }
                    match key.entries().and_then(<[BasisKey]>::split_first) {
                        Some((element, morphisms)) => Ok(BasisKey::tuple(
                            core::iter::once(rename(last_table, element)?)
                                .chain(morphisms.iter().cloned()),
                        )),
                        None => Err(AlgebraError::MalformedKey {
                            operation: "simplify",
                            key: key.to_string(),
                        }),
                    }
                },
                |key| rename(first_table, key),
            )?;
            operations.insert(word.clone(), renamed);
        }
        simplified.operations = operations;
        Ok(simplified)
    }

    /// direct sum, fiber keys of `self` tagged `Left`
    /// # Errors
    /// if the modules live over different categories
    pub fn oplus(&self, other: &Self) -> AlgebraResult<Self> {
        if !core::ptr::eq(self.category, other.category) {
            return Err(AlgebraError::incompatible(
                "oplus",
                "modules over different categories",
            ));
        }
        let objects = self.fibers.keys().chain(other.fibers.keys()).collect::<BTreeSet<_>>();
        let fibers = objects
            .into_iter()
            .map(|x| (x.clone(), self.fiber(x).oplus(other.fiber(x))))
            .collect();
        let words = self
            .operations
            .keys()
            .chain(other.operations.keys())
            .collect::<BTreeSet<_>>();
        let mut operations = BTreeMap::new();
        for word in words {
            let mine = self.mu(word);
            let theirs = other.mu(word);
            let upper_right = LinearMap::zero(
                theirs.source().clone(),
                mine.target().clone(),
                mine.degree(),
            );
            let lower_left = LinearMap::zero(
                mine.source().clone(),
                theirs.target().clone(),
                mine.degree(),
            );
            let mut summed = LinearMap::block(&*mine, &upper_right, &lower_left, &*theirs)?;
            if word.len() > 1 {
                summed = summed.distribute()?;
            }
            operations.insert(word.clone(), summed);
        }
        Ok(Self::assemble(self.category, fibers, operations))
    }

    /// dimensions of the cohomology of all the fibers together
    /// # Errors
    /// if some `mu^1` fails to be a differential
    pub fn total(&self) -> AlgebraResult<BTreeMap<Degree, usize>> {
        let mut answer: BTreeMap<Degree, usize> = BTreeMap::new();
        for object in self.category.objects() {
            for (degree, dimension) in self.cpx(object)?.cohomology()? {
                *answer.entry(degree).or_default() += dimension;
            }
        }
        Ok(answer)
    }

    /// lowest and highest degree of `total`, `None` when the cohomology vanishes
    /// # Errors
    /// if some `mu^1` fails to be a differential
    pub fn width(&self) -> AlgebraResult<Option<(Degree, Degree)>> {
        let total = self.total()?;
        Ok(total
            .keys()
            .next()
            .copied()
            .zip(total.keys().next_back().copied()))
    }

    /// sum of the dimensions of all fibers
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.fibers.values().map(VectorSpace::dimension).sum()
    }
}

mod test {

    #[allow(dead_code)]
    fn bp23<F: crate::base_ring::field_generals::Field + 'static>(
    ) -> super::A8Category<usize, F> {
        crate::a_infinity::dynkin::brieskorn_pham(2, 3, 2, 1).expect("valid parameters")
    }

    #[allow(dead_code)]
    fn bp34<F: crate::base_ring::field_generals::Field + 'static>(
    ) -> super::A8Category<usize, F> {
        crate::a_infinity::dynkin::brieskorn_pham(3, 4, 3, 1).expect("valid parameters")
    }

    #[test]
    fn yoneda_modules_verify() {
        use crate::base_ring::{finite_field::F3, rationals::Rational};
        let over_q = bp34::<Rational>();
        let over_f3 = bp34::<F3>();
        for object in 1..=6 {
            assert!(over_q.yoneda(&object).expect("object").verify().is_ok());
            assert!(over_f3.yoneda(&object).expect("object").verify().is_ok());
        }
    }

    #[test]
    fn shape_checks() {
        use super::A8Module;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::{linear_map::LinearMap, vector_space::VectorSpace};
        let category = bp23::<Rational>();
        let v = VectorSpace::build([(0, 1)]);
        let bad_degree = LinearMap::zero(v.clone(), v.clone(), 0);
        assert!(A8Module::new(
            &category,
            [(1, v.clone())].into_iter().collect(),
            [(vec![1], bad_degree)].into_iter().collect()
        )
        .is_err());
        assert!(A8Module::new(
            &category,
            [(7, v.clone())].into_iter().collect(),
            Default::default()
        )
        .is_err());
        let good = A8Module::new(
            &category,
            [(1, v.clone())].into_iter().collect(),
            [(vec![1], LinearMap::zero(v.clone(), v, 1))].into_iter().collect(),
        )
        .expect("well formed");
        assert!(good.verify().is_ok());
        assert_eq!(good.mu(&[2, 1]).degree(), 0);
        assert_eq!(good.mu(&[2, 1]).source().dimension(), 1);
    }

    #[test]
    fn total_yoneda_adds_up() {
        use crate::base_ring::rationals::Rational;
        let category = bp34::<Rational>();
        let total = category.total_yoneda().expect("same category");
        assert!(total.verify().is_ok());
        assert_eq!(
            total.total().expect("complexes").into_iter().collect::<Vec<_>>(),
            vec![(0, 6), (1, 10), (2, 10), (3, 6)]
        );
        let mut expected = 0;
        for object in 1..=6 {
            expected += category.yoneda(&object).expect("object").dimension();
        }
        assert_eq!(total.dimension(), expected);
    }

    #[test]
    fn shift_moves_width() {
        use crate::base_ring::finite_field::F2;
        let category = bp34::<F2>();
        let yoneda = category.yoneda(&2).expect("object");
        let (low, high) = yoneda.width().expect("complexes").expect("nonzero");
        for m in [-1, 1, 2] {
            let shifted = yoneda.shift(m);
            assert!(shifted.verify().is_ok());
            assert_eq!(
                shifted.width().expect("complexes"),
                Some((low - m, high - m))
            );
        }
    }

    #[test]
    fn ltimes_with_a_point() {
        use crate::base_ring::rationals::Rational;
        use crate::chain_complex::CochainComplex;
        let category = bp34::<Rational>();
        let yoneda = category.yoneda(&5).expect("object");
        let point = CochainComplex::rank_one(-1);
        let tensored = yoneda.ltimes(&point).expect("tensor");
        assert!(tensored.verify().is_ok());
        assert_eq!(tensored.width(), yoneda.shift(1).width());
        assert_eq!(tensored.total(), yoneda.shift(1).total());
        assert_eq!(tensored.dimension(), yoneda.dimension());
    }

    #[test]
    fn simplify_keeps_the_module() {
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::basis_key::BasisKey;
        let category = bp34::<Rational>();
        let twisted = category
            .yoneda(&1)
            .expect("object")
            .twist(&2)
            .expect("object");
        for (_, fiber) in twisted.fibers() {
            assert!(fiber
                .keys()
                .enumerate()
                .all(|(idx, key)| *key == BasisKey::Index(idx)));
        }
        let again = twisted.simplify().expect("flat keys");
        assert_eq!(again.total(), twisted.total());
        assert!(again.verify().is_ok());
    }

    #[test]
    fn twists_verify() {
        use crate::base_ring::{finite_field::F3, rationals::Rational};
        let category = bp34::<Rational>();
        let module = category.yoneda(&1).expect("object");
        let twisted = module.twist_word(&[6, 1, 6, 3]).expect("objects");
        assert!(twisted.verify().is_ok());
        let category = bp34::<F3>();
        let module = category.yoneda(&1).expect("object");
        let once = module.twist(&2).expect("object");
        assert!(once.verify().is_ok());
        let twice = once.twist(&5).expect("object");
        assert!(twice.verify().is_ok());
        assert!(module.twist(&9).is_err());
    }

    #[test]
    fn brieskorn_pham_23_widths_grow() {
        use crate::base_ring::finite_field::F2;
        let category = bp23::<F2>();
        assert!(category.verify().is_ok());
        let mut module = category.yoneda(&1).expect("object");
        assert!(module.verify().is_ok());
        assert_eq!(module.width(), Ok(Some((0, 2))));
        let mut previous_dimension = module.dimension();
        let mut spans = Vec::new();
        for _ in 0..3 {
            module = module.twist(&2).expect("object");
            assert!(module.verify().is_ok());
            let (low, high) = module.width().expect("complexes").expect("nonzero");
            spans.push(high - low);
            assert!(module.dimension() > previous_dimension);
            previous_dimension = module.dimension();
        }
        assert_eq!(spans, vec![2, 3, 4]);
        assert_eq!(
            module.total().expect("complexes").into_iter().collect::<Vec<_>>(),
            vec![(0, 1), (2, 1), (3, 1), (4, 1)]
        );
    }
}
