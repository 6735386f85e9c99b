use core::fmt;
use either::Either;

use crate::error::{AlgebraError, AlgebraResult};

/// Labels of basis vectors.
///
/// Plain spaces use `Index`, tensor products use `Tuple` (one entry per factor)
/// and direct sums tag with `Summand` (`Left` for the first summand).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasisKey {
    Index(usize),
    Tuple(Vec<BasisKey>),
    Summand(Either<Box<BasisKey>, Box<BasisKey>>),
}

impl From<usize> for BasisKey {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl BasisKey {
    #[must_use]
    pub fn left(key: BasisKey) -> Self {
        Self::Summand(Either::Left(Box::new(key)))
    }

    #[must_use]
    pub fn right(key: BasisKey) -> Self {
        Self::Summand(Either::Right(Box::new(key)))
    }

    #[must_use]
    pub fn tuple(entries: impl IntoIterator<Item = BasisKey>) -> Self {
        Self::Tuple(entries.into_iter().collect())
    }

    fn malformed(&self, operation: &'static str) -> AlgebraError {
        AlgebraError::MalformedKey {
            operation,
            key: self.to_string(),
        }
    }

    /// `(a, (b, c), d)` with `position = 1` becomes `(a, b, c, d)`
    /// # Errors
    /// if `self` is not a tuple whose entry at `position` is a tuple
    pub fn flatten(&self, position: usize) -> AlgebraResult<Self> {
        let Self::Tuple(entries) = self else {
            return Err(self.malformed("flatten"));
        };
        let Some(Self::Tuple(inner)) = entries.get(position) else {
            return Err(self.malformed("flatten"));
        };
        let mut flat = Vec::with_capacity(entries.len() + inner.len());
        flat.extend_from_slice(&entries[..position]);
        flat.extend_from_slice(inner);
        flat.extend_from_slice(&entries[position + 1..]);
        Ok(Self::Tuple(flat))
    }

    /// regroup the entries in `[start, end)` into a nested tuple,
    /// `(a, b, c, d)` with `[1,3)` becomes `(a, (b, c), d)`
    /// # Errors
    /// if `self` is not a tuple or the range is not inside it
    pub fn unflatten(&self, start: usize, end: usize) -> AlgebraResult<Self> {
        let Self::Tuple(entries) = self else {
            return Err(self.malformed("unflatten"));
        };
        if start > end || end > entries.len() {
            return Err(self.malformed("unflatten"));
        }
        let mut grouped = Vec::with_capacity(entries.len() + 1 + start - end);
        grouped.extend_from_slice(&entries[..start]);
        grouped.push(Self::Tuple(entries[start..end].to_vec()));
        grouped.extend_from_slice(&entries[end..]);
        Ok(Self::Tuple(grouped))
    }

    /// a summand of a tuple becomes a tuple whose first entry is the summand,
    /// `Left((b, a1, a2))` becomes `(Left(b), a1, a2)`
    /// # Errors
    /// if `self` is not a summand of a nonempty tuple
    pub fn distribute(&self) -> AlgebraResult<Self> {
        let Self::Summand(side) = self else {
            return Err(self.malformed("distribute"));
        };
        let (is_left, inner) = match side {
            Either::Left(k) => (true, &**k),
            Either::Right(k) => (false, &**k),
        };
        let Self::Tuple(entries) = inner else {
            return Err(self.malformed("distribute"));
        };
        let Some((first, rest)) = entries.split_first() else {
            return Err(self.malformed("distribute"));
        };
        let first = if is_left {
            Self::left(first.clone())
        } else {
            Self::right(first.clone())
        };
        Ok(Self::Tuple(
            core::iter::once(first).chain(rest.iter().cloned()).collect(),
        ))
    }

    /// entries of a tuple key, `None` for the other shapes
    #[must_use]
    pub fn entries(&self) -> Option<&[BasisKey]> {
        match self {
            Self::Tuple(entries) => Some(entries),
            _ => None,
        }
    }
}

impl fmt::Display for BasisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Tuple(entries) => {
                write!(f, "(")?;
                for (idx, entry) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{entry}")?;
                }
                write!(f, ")")
            }
            Self::Summand(Either::Left(k)) => write!(f, "a:{k}"),
            Self::Summand(Either::Right(k)) => write!(f, "b:{k}"),
        }
    }
}

mod test {

    #[allow(dead_code)]
    fn idx(i: usize) -> super::BasisKey {
        super::BasisKey::Index(i)
    }

    #[test]
    fn flatten_unflatten_inverse() {
        use super::BasisKey;
        let nested = BasisKey::tuple([idx(0), BasisKey::tuple([idx(1), idx(2)]), idx(3)]);
        let flat = nested.flatten(1).expect("entry 1 is a tuple");
        assert_eq!(flat, BasisKey::tuple([idx(0), idx(1), idx(2), idx(3)]));
        assert_eq!(flat.unflatten(1, 3), Ok(nested));
        let grouped_front = flat.unflatten(0, 2).expect("range inside");
        assert_eq!(
            grouped_front,
            BasisKey::tuple([BasisKey::tuple([idx(0), idx(1)]), idx(2), idx(3)])
        );
        assert_eq!(grouped_front.flatten(0), Ok(flat));
    }

    #[test]
    fn malformed_keys() {
        use super::BasisKey;
        assert!(idx(4).flatten(0).is_err());
        assert!(BasisKey::tuple([idx(0), idx(1)]).flatten(1).is_err());
        assert!(BasisKey::tuple([idx(0), idx(1)]).flatten(2).is_err());
        assert!(BasisKey::tuple([idx(0)]).unflatten(0, 2).is_err());
        assert!(BasisKey::left(idx(0)).distribute().is_err());
        assert!(BasisKey::tuple([]).distribute().is_err());
    }

    #[test]
    fn distribute_summand() {
        use super::BasisKey;
        let key = BasisKey::right(BasisKey::tuple([idx(5), idx(1), idx(0)]));
        assert_eq!(
            key.distribute(),
            Ok(BasisKey::tuple([BasisKey::right(idx(5)), idx(1), idx(0)]))
        );
        assert_eq!(format!("{key}"), "b:(5,1,0)");
    }

    #[test]
    fn empty_group() {
        use super::BasisKey;
        let key = BasisKey::tuple([idx(7)]);
        assert_eq!(
            key.unflatten(1, 1),
            Ok(BasisKey::tuple([idx(7), BasisKey::tuple([])]))
        );
    }
}
