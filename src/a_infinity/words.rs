//! Words of objects index the operations of categories, modules and module maps.
//! `(X_0, .., X_d)` labels an operation with inputs along `X_0 -> X_1 -> .. -> X_d`.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::linear_algebra::vector_space::Degree;

/// object labels usable in words
pub trait ObjectLabel: Ord + Clone + core::fmt::Debug + core::fmt::Display {}

impl<T: Ord + Clone + core::fmt::Debug + core::fmt::Display> ObjectLabel for T {}

/// the length of a word as a degree
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn word_length(word: &[impl ObjectLabel]) -> Degree {
    word.len() as Degree
}

pub(crate) fn show_word<O: ObjectLabel>(word: &[O]) -> String {
    format!("({})", word.iter().join(","))
}

/// `outer` with `inner` spliced into every slot whose endpoints match those of `inner`
pub(crate) fn splices<'w, O: ObjectLabel>(
    outer: &'w [O],
    inner: &'w [O],
) -> impl Iterator<Item = Vec<O>> + 'w {
    let endpoints = inner.first().zip(inner.last());
    outer.windows(2).enumerate().filter_map(move |(slot, pair)| {
        let (first, last) = endpoints?;
        if pair[0] != *first || pair[1] != *last {
            return None;
        }
        Some(
            outer[..slot]
                .iter()
                .chain(inner)
                .chain(&outer[slot + 2..])
                .cloned()
                .collect(),
        )
    })
}

/// `outer` followed by `inner` when `inner` starts where `outer` ends
pub(crate) fn concatenation<O: ObjectLabel>(outer: &[O], inner: &[O]) -> Option<Vec<O>> {
    match (outer.last(), inner.split_first()) {
        (Some(end), Some((start, rest))) if end == start => {
            Some(outer.iter().chain(rest).cloned().collect())
        }
        _ => None,
    }
}

/// every splice of one word of `inners` into one word of `outers`
pub(crate) fn all_splices<'w, O: ObjectLabel + 'w>(
    outers: impl Iterator<Item = &'w Vec<O>> + Clone,
    inners: impl Iterator<Item = &'w Vec<O>>,
) -> BTreeSet<Vec<O>> {
    let mut answer = BTreeSet::new();
    for inner in inners {
        for outer in outers.clone() {
            answer.extend(splices(outer, inner));
        }
    }
    answer
}

/// `w[..=n] ++ w[n+m..]`, the outer word left after cutting out `w[n..=n+m]`
pub(crate) fn cut<O: ObjectLabel>(word: &[O], start: usize, inner_arity: usize) -> Vec<O> {
    word[..=start]
        .iter()
        .chain(&word[start + inner_arity..])
        .cloned()
        .collect()
}

mod test {

    #[test]
    fn splicing() {
        use super::splices;
        let outer = [1, 2, 3];
        let inner = [2, 5, 3];
        assert_eq!(splices(&outer, &inner).collect::<Vec<_>>(), vec![vec![1, 2, 5, 3]]);
        let loop_inner = [1, 1];
        assert!(splices(&outer, &loop_inner).next().is_none());
        let repeated = [1, 2, 1, 2];
        assert_eq!(
            splices(&repeated, &[1, 4, 2]).collect::<Vec<_>>(),
            vec![vec![1, 4, 2, 1, 2], vec![1, 2, 1, 4, 2]]
        );
    }

    #[test]
    fn concatenating() {
        use super::concatenation;
        assert_eq!(concatenation(&[1, 2], &[2, 3, 4]), Some(vec![1, 2, 3, 4]));
        assert_eq!(concatenation(&[1, 2], &[3, 4]), None);
        assert_eq!(concatenation::<i32>(&[], &[3]), None);
    }

    #[test]
    fn cutting_and_showing() {
        use super::{cut, show_word};
        let word = ['a', 'b', 'c', 'd', 'e'];
        assert_eq!(cut(&word, 1, 2), vec!['a', 'b', 'd', 'e']);
        assert_eq!(cut(&word, 0, 4), vec!['a', 'e']);
        assert_eq!(show_word(&word[..3]), "(a,b,c)");
    }
}
