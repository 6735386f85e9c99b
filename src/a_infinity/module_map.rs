use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use super::module::A8Module;
use super::words::{show_word, word_length, ObjectLabel};
use crate::base_ring::field_generals::Field;
use crate::error::{AlgebraError, AlgebraResult};
use crate::linear_algebra::{
    linear_map::LinearMap,
    vector_space::{Degree, VectorSpace},
};

/// A pre-morphism of modules of a given degree.
///
/// The component at `(X_0, .., X_{d-1})` maps the source of `mu` at that word
/// into the target fiber `N(X_0)` with degree `1 + degree - d`.
/// Nothing forces it to be closed.
#[derive(Clone, Debug)]
pub struct A8ModuleMap<'m, 'a, O, F> {
    source: &'m A8Module<'a, O, F>,
    target: &'m A8Module<'a, O, F>,
    degree: Degree,
    components: BTreeMap<Vec<O>, LinearMap<F>>,
}

impl<'m, 'a, O: ObjectLabel, F: Field + 'static> A8ModuleMap<'m, 'a, O, F> {
    /// # Errors
    /// if the modules live over different categories or a component has the wrong shape
    pub fn new(
        source: &'m A8Module<'a, O, F>,
        target: &'m A8Module<'a, O, F>,
        degree: Degree,
        components: BTreeMap<Vec<O>, LinearMap<F>>,
    ) -> AlgebraResult<Self> {
        if !core::ptr::eq(source.category(), target.category()) {
            return Err(AlgebraError::incompatible(
                "A8ModuleMap",
                "modules over different categories",
            ));
        }
        let answer = Self {
            source,
            target,
            degree,
            components,
        };
        for (word, component) in &answer.components {
            let Some(first) = word.first() else {
                return Err(AlgebraError::incompatible("A8ModuleMap", "empty word"));
            };
            if component.source() != &source.op_source(word)
                || component.target() != target.fiber(first)
                || component.degree() != answer.component_degree(word)
            {
                return Err(AlgebraError::incompatible(
                    "A8ModuleMap",
                    format!(
                        "component {} is not a map of degree {} into {}",
                        show_word(word),
                        answer.component_degree(word),
                        target.fiber(first)
                    ),
                ));
            }
        }
        Ok(answer)
    }

    /// the identity of `module`, no higher components
    #[must_use]
    pub fn identity(module: &'m A8Module<'a, O, F>) -> Self {
        let components = module
            .fibers()
            .map(|(x, fiber)| (vec![x.clone()], LinearMap::identity(fiber)))
            .collect();
        Self {
            source: module,
            target: module,
            degree: 0,
            components,
        }
    }

    #[must_use]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    fn component_degree(&self, word: &[O]) -> Degree {
        1 + self.degree - word_length(word)
    }

    /// the stored component or the zero map of the same shape
    #[must_use]
    pub fn cpt(&self, word: &[O]) -> Cow<'_, LinearMap<F>> {
        match self.components.get(word) {
            Some(component) => Cow::Borrowed(component),
            None => {
                let target = word.first().map_or_else(
                    VectorSpace::zero_space,
                    |first| self.target.fiber(first).clone(),
                );
                Cow::Owned(LinearMap::zero(
                    self.source.op_source(word),
                    target,
                    self.component_degree(word),
                ))
            }
        }
    }

    /// The module `M[1] ⊕ N` with operations
    /// ```text
    /// ( mu_M  0    )
    /// ( t     mu_N )
    /// ```
    /// where the left column is moved onto `M[1]` with the Koszul signs of `σ`.
    /// It satisfies the module relations exactly when `t` is closed.
    /// Only maps of degree 0 have cones here, the grading of `M[1]` assumes it.
    /// # Errors
    /// `IncompatibleOperands` if the degree of `t` is not zero
    #[instrument(skip_all, fields(components = self.components.len()))]
    pub fn cone(&self) -> AlgebraResult<A8Module<'a, O, F>> {
        if self.degree != 0 {
            return Err(AlgebraError::incompatible(
                "cone",
                format!("cones are taken of degree 0 maps, not degree {}", self.degree),
            ));
        }
        let category = self.source.category();
        let objects = self
            .source
            .fibers()
            .chain(self.target.fibers())
            .map(|(x, _)| x)
            .collect::<BTreeSet<_>>();
        let fibers = objects
            .into_iter()
            .map(|x| {
                (
                    x.clone(),
                    self.source.fiber(x).shift(1).oplus(self.target.fiber(x)),
                )
            })
            .collect();
        let words = self
            .source
            .operations()
            .map(|(w, _)| w)
            .chain(self.target.operations().map(|(w, _)| w))
            .chain(self.components.keys())
            .collect::<BTreeSet<_>>();
        let mut operations = BTreeMap::new();
        for word in words {
            let length = word.len();
            let Some(last) = word.last() else {
                continue;
            };
            let source_mu = self.source.mu(word);
            let component = self.cpt(word);
            let (top_left, bottom_left) = if length == 1 {
                (source_mu.into_owned(), component.into_owned())
            } else {
                let signs = core::iter::once(LinearMap::identity(self.source.fiber(last)))
                    .chain(
                        (1..length)
                            .rev()
                            .map(|i| LinearMap::sigma(category.hom(&word[i - 1], &word[i]))),
                    )
                    .collect::<Vec<_>>();
                let signs = LinearMap::tensor(&signs.iter().collect::<Vec<_>>());
                (source_mu.circ(&signs)?, component.circ(&signs)?)
            };
            let sign = F::sign(word_length(word));
            let top_left = top_left.rejig_2(1).scale(&sign);
            let bottom_left = bottom_left.rejig_3(1).scale(&sign);
            let bottom_right = self.target.mu(word);
            let top_right = LinearMap::zero(
                bottom_right.source().clone(),
                top_left.target().clone(),
                bottom_right.degree(),
            );
            let mut block = LinearMap::block(&top_left, &top_right, &bottom_left, &*bottom_right)?;
            if length > 1 {
                block = block.distribute()?;
            }
            operations.insert(word.clone(), block);
        }
        debug!(operations = operations.len(), "cone assembled");
        Ok(A8Module::assemble(category, fibers, operations))
    }

    /// the map is closed exactly when its cone is a module
    /// # Errors
    /// as `cone` and `A8Module::verify`
    pub fn verify_closed(&self) -> AlgebraResult<()> {
        self.cone()?.verify()
    }
}

mod test {

    #[test]
    fn cone_of_identity() {
        use super::A8ModuleMap;
        use crate::a_infinity::dynkin::brieskorn_pham;
        use crate::base_ring::{finite_field::F2, rationals::Rational};
        let category = brieskorn_pham::<Rational>(3, 3, 3, 1).expect("valid parameters");
        for object in 1..=4 {
            let yoneda = category.yoneda(&object).expect("object");
            let identity = A8ModuleMap::identity(&yoneda);
            let cone = identity.cone().expect("degree 0");
            for (x, fiber) in yoneda.fibers() {
                assert_eq!(cone.fiber(x).dimension(), 2 * fiber.dimension());
            }
            assert!(cone.verify().is_ok());
            assert!(identity.verify_closed().is_ok());
            assert_eq!(cone.width(), Ok(None));
        }
        let category = brieskorn_pham::<F2>(3, 4, 3, 1).expect("valid parameters");
        let twisted = category
            .yoneda(&2)
            .expect("object")
            .twist(&5)
            .expect("object");
        let cone = A8ModuleMap::identity(&twisted).cone().expect("degree 0");
        assert!(cone.verify().is_ok());
        assert!(cone.total().expect("complexes").is_empty());
    }

    #[test]
    fn open_maps_have_bad_cones() {
        use super::A8ModuleMap;
        use crate::a_infinity::dynkin::brieskorn_pham;
        use crate::base_ring::rationals::Rational;
        let category = brieskorn_pham::<Rational>(3, 4, 3, 1).expect("valid parameters");
        let yoneda = category.yoneda(&1).expect("object");
        let identity = A8ModuleMap::identity(&yoneda);
        let mut components = identity.components.clone();
        let first = components
            .iter()
            .next()
            .map(|(w, c)| (w.clone(), c.scale(&Rational::from(2))));
        let Some((word, doubled)) = first else {
            panic!("Yoneda module of 1 has fibers");
        };
        components.insert(word, doubled);
        let doubled_somewhere =
            A8ModuleMap::new(&yoneda, &yoneda, 0, components).expect("right shapes");
        assert!(doubled_somewhere.verify_closed().is_err());
        let wrong_degree: Result<A8ModuleMap<'_, '_, usize, Rational>, _> = A8ModuleMap::new(
            &yoneda,
            &yoneda,
            1,
            identity.components.clone(),
        );
        assert!(wrong_degree.is_err());
        let shifted = A8ModuleMap::new(&yoneda, &yoneda, 1, Default::default())
            .expect("no components");
        assert!(matches!(
            shifted.cone(),
            Err(crate::error::AlgebraError::IncompatibleOperands {
                operation: "cone",
                ..
            })
        ));
        assert!(matches!(
            shifted.verify_closed(),
            Err(crate::error::AlgebraError::IncompatibleOperands { .. })
        ));
        assert_eq!(shifted.cpt(&[1]).degree(), 1);
    }
}
