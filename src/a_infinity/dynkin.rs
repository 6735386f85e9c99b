use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::category::A8Category;
use super::words::ObjectLabel;
use crate::base_ring::field_generals::Field;
use crate::error::{AlgebraError, AlgebraResult};
use crate::linear_algebra::{
    basis_key::BasisKey,
    linear_map::LinearMap,
    vector::Vector,
    vector_space::{Degree, VectorSpace},
};

/// A directed graph whose arrows carry degrees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynkinGraph<O: Ord> {
    vertices: BTreeSet<O>,
    arrows: BTreeMap<O, BTreeMap<O, Degree>>,
}

/// a product `b ∘ a` in a word `(X, Y, Z)` with `a: X -> Y` and `b: Y -> Z`
struct Composition<O> {
    word: [O; 3],
    later: usize,
    earlier: usize,
    result: usize,
}

const UNIT: usize = 0;
const TOP_CLASS: usize = 1;
const ARROW: usize = 0;

impl<O: ObjectLabel> DynkinGraph<O> {
    pub fn new(vertices: impl IntoIterator<Item = O>) -> Self {
        let vertices: BTreeSet<O> = vertices.into_iter().collect();
        let arrows = vertices.iter().map(|v| (v.clone(), BTreeMap::new())).collect();
        Self { vertices, arrows }
    }

    /// # Errors
    /// if an endpoint is missing, the arrow is a loop,
    /// or the two vertices are already joined
    pub fn add_arrow(&mut self, from: O, to: O, degree: Degree) -> AlgebraResult<()> {
        for vertex in [&from, &to] {
            if !self.vertices.contains(vertex) {
                return Err(AlgebraError::UndefinedObject(vertex.to_string()));
            }
        }
        if from == to || self.arrow(&from, &to).is_some() || self.arrow(&to, &from).is_some() {
            return Err(AlgebraError::incompatible(
                "add_arrow",
                format!("{from} and {to} cannot carry another arrow"),
            ));
        }
        self.arrows.entry(from).or_default().insert(to, degree);
        Ok(())
    }

    #[must_use]
    pub fn arrow(&self, from: &O, to: &O) -> Option<Degree> {
        self.arrows.get(from).and_then(|out| out.get(to)).copied()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &O> + '_ {
        self.vertices.iter()
    }

    fn arrows_out(&self, from: &O) -> impl Iterator<Item = (&O, Degree)> + '_ {
        self.arrows
            .get(from)
            .into_iter()
            .flat_map(|out| out.iter().map(|(to, degree)| (to, *degree)))
    }

    /// The Calabi-Yau `n` category of the graph.
    ///
    /// Every vertex has the cohomology of an `n`-sphere as endomorphisms.
    /// An arrow `X -> Y` of degree `k` gives `p` spanning `hom(X,Y)` in degree `k`
    /// and `p*` spanning `hom(Y,X)` in degree `n-k`, with `p* ∘ p` and `p ∘ p*`
    /// the top classes. A triangle `X -> Y -> Z` whose long edge `X -> Z` has
    /// the sum of the degrees composes `r ∘ p = t`, and cyclically `t* ∘ r = p*`
    /// and `p ∘ t* = r*`. Other triangles do not compose.
    /// The only operation is `mu^2(b, a) = (-1)^{|a|} b ∘ a`.
    /// # Errors
    /// only if the composition table is inconsistent with the gradings
    pub fn categorify<F: Field + 'static>(&self, n: Degree) -> AlgebraResult<A8Category<O, F>> {
        let mut homs = BTreeMap::new();
        for vertex in &self.vertices {
            homs.insert(
                (vertex.clone(), vertex.clone()),
                VectorSpace::from_basis([
                    (BasisKey::Index(UNIT), 0),
                    (BasisKey::Index(TOP_CLASS), n),
                ]),
            );
        }
        for x in &self.vertices {
            for (y, k) in self.arrows_out(x) {
                homs.insert(
                    (x.clone(), y.clone()),
                    VectorSpace::from_basis([(BasisKey::Index(ARROW), k)]),
                );
                homs.insert(
                    (y.clone(), x.clone()),
                    VectorSpace::from_basis([(BasisKey::Index(ARROW), n - k)]),
                );
            }
        }
        let compositions = self.composition_table();
        debug!(compositions = compositions.len(), "composition table");
        let hom = |x: &O, y: &O| {
            homs.get(&(x.clone(), y.clone()))
                .cloned()
                .unwrap_or_default()
        };
        let mut operations: BTreeMap<Vec<O>, LinearMap<F>> = BTreeMap::new();
        for Composition {
            word,
            later,
            earlier,
            result,
        } in compositions
        {
            let [x, y, z] = word;
            let earlier_space = hom(&x, &y);
            let earlier_degree = earlier_space
                .degree_of(&BasisKey::Index(earlier))
                .ok_or_else(|| AlgebraError::UndefinedObject(format!("{earlier} in hom({x},{y})")))?;
            let operation = operations
                .entry(vec![x.clone(), y.clone(), z.clone()])
                .or_insert_with(|| {
                    LinearMap::zero(
                        VectorSpace::tensor(&[&hom(&y, &z), &earlier_space]),
                        hom(&x, &z),
                        0,
                    )
                });
            operation.insert_image(
                BasisKey::tuple([BasisKey::Index(later), BasisKey::Index(earlier)]),
                Vector::from_terms([(F::sign(earlier_degree), BasisKey::Index(result))]),
            )?;
        }
        A8Category::new(self.vertices.clone(), homs, operations)
    }

    fn composition_table(&self) -> Vec<Composition<O>> {
        let compose = |word: [&O; 3], later, earlier, result| Composition {
            word: word.map(Clone::clone),
            later,
            earlier,
            result,
        };
        let mut table = Vec::new();
        for x in &self.vertices {
            table.push(compose([x, x, x], UNIT, UNIT, UNIT));
            table.push(compose([x, x, x], TOP_CLASS, UNIT, TOP_CLASS));
            table.push(compose([x, x, x], UNIT, TOP_CLASS, TOP_CLASS));
        }
        for x in &self.vertices {
            for (y, _) in self.arrows_out(x) {
                table.push(compose([x, y, y], UNIT, ARROW, ARROW));
                table.push(compose([x, x, y], ARROW, UNIT, ARROW));
                table.push(compose([y, x, x], UNIT, ARROW, ARROW));
                table.push(compose([y, y, x], ARROW, UNIT, ARROW));
                table.push(compose([x, y, x], ARROW, ARROW, TOP_CLASS));
                table.push(compose([y, x, y], ARROW, ARROW, TOP_CLASS));
            }
        }
        for x in &self.vertices {
            for (y, first) in self.arrows_out(x) {
                for (z, second) in self.arrows_out(y) {
                    if self.arrow(x, z) == Some(first + second) {
                        table.push(compose([x, y, z], ARROW, ARROW, ARROW));
                        table.push(compose([y, z, x], ARROW, ARROW, ARROW));
                        table.push(compose([z, x, y], ARROW, ARROW, ARROW));
                    }
                }
            }
        }
        table
    }
}

impl DynkinGraph<usize> {
    /// The graph of `x^p + y^q` on the vertices `1..=(p-1)(q-1)`,
    /// arrows `m -> m+1` and `m -> m+p` of degree `d` and `m -> m+p+1` of degree `2d`.
    #[must_use]
    pub fn brieskorn_pham(p: usize, q: usize, d: Degree) -> Self {
        let milnor = p.saturating_sub(1) * q.saturating_sub(1);
        let mut graph = Self::new(1..=milnor);
        for m in 1..=milnor {
            for (to, degree) in [(m + 1, d), (m + p, d), (m + p + 1, 2 * d)] {
                if to <= milnor && graph.arrow(&m, &to).is_none() && graph.arrow(&to, &m).is_none() {
                    graph.arrows.entry(m).or_default().insert(to, degree);
                }
            }
        }
        graph
    }
}

/// the Calabi-Yau `n` category of the Brieskorn-Pham graph of `(p, q)` with arrow degree `d`
/// # Errors
/// as [`DynkinGraph::categorify`]
pub fn brieskorn_pham<F: Field + 'static>(
    p: usize,
    q: usize,
    n: Degree,
    d: Degree,
) -> AlgebraResult<A8Category<usize, F>> {
    DynkinGraph::brieskorn_pham(p, q, d).categorify(n)
}

mod test {

    #[test]
    fn graph_building() {
        use super::DynkinGraph;
        let mut graph = DynkinGraph::new(['a', 'b', 'c']);
        assert!(graph.add_arrow('a', 'b', 1).is_ok());
        assert!(graph.add_arrow('b', 'a', 1).is_err());
        assert!(graph.add_arrow('a', 'a', 0).is_err());
        assert!(graph.add_arrow('a', 'z', 0).is_err());
        assert_eq!(graph.arrow(&'a', &'b'), Some(1));
        assert_eq!(graph.arrow(&'b', &'a'), None);
    }

    #[test]
    fn brieskorn_pham_graphs() {
        use super::DynkinGraph;
        let a2 = DynkinGraph::brieskorn_pham(2, 3, 1);
        assert_eq!(a2.vertices().count(), 2);
        assert_eq!(a2.arrow(&1, &2), Some(1));
        let e6 = DynkinGraph::brieskorn_pham(3, 4, 1);
        assert_eq!(e6.vertices().count(), 6);
        assert_eq!(e6.arrow(&1, &4), Some(1));
        assert_eq!(e6.arrow(&1, &5), Some(2));
        assert_eq!(e6.arrow(&3, &4), Some(1));
        assert_eq!(e6.arrow(&6, &7), None);
    }

    #[test]
    fn categories_verify() {
        use super::brieskorn_pham;
        use crate::base_ring::{
            finite_field::{F2, F3},
            rationals::Rational,
        };
        for (p, q) in [(2, 3), (3, 3), (3, 4), (2, 5)] {
            for (n, d) in [(2, 1), (3, 1), (2, 0), (4, 1)] {
                assert!(brieskorn_pham::<Rational>(p, q, n, d)
                    .expect("consistent")
                    .verify()
                    .is_ok());
                assert!(brieskorn_pham::<F2>(p, q, n, d)
                    .expect("consistent")
                    .verify()
                    .is_ok());
                assert!(brieskorn_pham::<F3>(p, q, n, d)
                    .expect("consistent")
                    .verify()
                    .is_ok());
            }
        }
    }

    #[test]
    fn hom_spaces_pair_up() {
        use super::brieskorn_pham;
        use crate::base_ring::rationals::Rational;
        use crate::linear_algebra::basis_key::BasisKey;
        let category = brieskorn_pham::<Rational>(3, 4, 3, 1).expect("consistent");
        assert_eq!(category.hom(&1, &5).graded_dimensions().into_iter().collect::<Vec<_>>(), vec![(2, 1)]);
        assert_eq!(category.hom(&5, &1).graded_dimensions().into_iter().collect::<Vec<_>>(), vec![(1, 1)]);
        assert_eq!(category.hom(&1, &6).dimension(), 0);
        assert_eq!(
            category.hom(&4, &4).graded_dimensions().into_iter().collect::<Vec<_>>(),
            vec![(0, 1), (3, 1)]
        );
        let composite = category
            .mu(&[1, 2, 5])
            .image(&BasisKey::tuple([BasisKey::Index(0), BasisKey::Index(0)]));
        assert_eq!(composite.support_size(), 1);
        assert!(!category.mu(&[2, 5, 6]).is_zero());
        // 1 -> 2 -> 3 has a long edge of degree 1, not 1 + 1
        let skipped = brieskorn_pham::<Rational>(2, 5, 2, 1).expect("consistent");
        assert_eq!(skipped.hom(&1, &3).dimension(), 1);
        assert!(skipped
            .mu(&[1, 2, 3])
            .image(&BasisKey::tuple([BasisKey::Index(0), BasisKey::Index(0)]))
            .is_zero());
    }
}
