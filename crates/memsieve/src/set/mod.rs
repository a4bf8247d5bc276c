//! Candidate address sets.
//!
//! A [`CandidateSet`] is a sorted, deduplicated vector of addresses plus a
//! complement flag. Only the finite side is ever stored, so "every address
//! except these" costs the same as "only these", even over a 64-bit space.
//!
//! Union, intersection and difference are rewritten through De Morgan onto
//! three merge primitives:
//!
//! | A     | B     | A ∪ B          | A ∩ B         | A − B          |
//! |-------|-------|----------------|---------------|----------------|
//! | plain | plain | ∪(A,B)         | ∩(A,B)        | −(A,B)         |
//! | plain | compl | ¬−(B,A)        | −(A,B)        | ∩(A,B)         |
//! | compl | plain | ¬−(A,B)        | −(B,A)        | ¬∪(A,B)        |
//! | compl | compl | ¬∩(A,B)        | ¬∪(A,B)       | −(B,A)         |
//!
//! Sets are values: every operation returns a new set.

mod iter;
mod merge;

use std::fs;
use std::ops::{BitAnd, BitOr, Not, Sub};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use iter::Elements;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SetRepr")]
pub struct CandidateSet {
    elements: Vec<u64>,
    complemented: bool,
}

/// On-disk shape; normalized on the way in so hand-edited files keep the
/// sort invariant.
#[derive(Deserialize)]
struct SetRepr {
    #[serde(default)]
    elements: Vec<u64>,
    #[serde(default)]
    complemented: bool,
}

impl From<SetRepr> for CandidateSet {
    fn from(repr: SetRepr) -> Self {
        let mut set = Self::from_addresses(repr.elements);
        set.complemented = repr.complemented;
        set
    }
}

impl CandidateSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn universal() -> Self {
        Self {
            elements: Vec::new(),
            complemented: true,
        }
    }

    /// Build a plain set from addresses in any order, with duplicates.
    pub fn from_addresses<I: IntoIterator<Item = u64>>(addresses: I) -> Self {
        let mut elements: Vec<u64> = addresses.into_iter().collect();
        elements.sort_unstable();
        elements.dedup();
        elements.shrink_to_fit();
        Self {
            elements,
            complemented: false,
        }
    }

    /// Build a plain set from a vector that is already ascending and
    /// duplicate-free (scan output).
    pub(crate) fn from_sorted(elements: Vec<u64>) -> Self {
        Self::with_flag(elements, false)
    }

    fn with_flag(mut elements: Vec<u64>, complemented: bool) -> Self {
        debug_assert!(merge::is_normalized(&elements), "unsorted candidate set");
        elements.shrink_to_fit();
        Self {
            elements,
            complemented,
        }
    }

    pub fn is_complemented(&self) -> bool {
        self.complemented
    }

    /// True only for a plain set with no elements
    pub fn is_empty(&self) -> bool {
        !self.complemented && self.elements.is_empty()
    }

    /// True only for a complemented set with no excluded elements
    pub fn is_universal(&self) -> bool {
        self.complemented && self.elements.is_empty()
    }

    pub fn contains(&self, address: u64) -> bool {
        self.complemented ^ self.elements.binary_search(&address).is_ok()
    }

    /// Cardinality. A complemented set is counted against a universe of
    /// `universe` addresses.
    pub fn size(&self, universe: u64) -> u64 {
        let stored = self.elements.len() as u64;
        if self.complemented {
            universe.saturating_sub(stored)
        } else {
            stored
        }
    }

    /// The explicitly stored addresses: members of a plain set, exclusions
    /// of a complemented one.
    pub fn explicit(&self) -> &[u64] {
        &self.elements
    }

    /// Lazy ascending iteration over every member.
    ///
    /// For a complemented set this enumerates the 64-bit address space
    /// minus the exclusions; prefer [`CandidateSet::elements_in`].
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(&self.elements, self.complemented, 0, u64::MAX)
    }

    /// Lazy ascending iteration over the members in `[base, base + size)`.
    pub fn elements_in(&self, base: u64, size: u64) -> Elements<'_> {
        if size == 0 {
            return Elements::empty();
        }
        let last = base.saturating_add(size - 1);
        Elements::new(&self.elements, self.complemented, base, last)
    }

    /// Every member, materialized.
    ///
    /// Fails for complemented sets, which have no bounded table.
    pub fn as_table(&self) -> Result<Vec<u64>> {
        if self.complemented {
            return Err(Error::UnboundedSet(self.elements.len()));
        }
        Ok(self.elements.clone())
    }

    /// Plain set of the members inside `[base, base + size)`.
    pub fn restrict(&self, base: u64, size: u64) -> Self {
        Self::from_sorted(self.elements_in(base, size).collect())
    }

    pub fn complement(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            complemented: !self.complemented,
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        let (a, b) = (&self.elements, &other.elements);
        match (self.complemented, other.complemented) {
            (false, false) => Self::with_flag(merge::union(a, b), false),
            (false, true) => Self::with_flag(merge::difference(b, a), true),
            (true, false) => Self::with_flag(merge::difference(a, b), true),
            (true, true) => Self::with_flag(merge::intersection(a, b), true),
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let (a, b) = (&self.elements, &other.elements);
        match (self.complemented, other.complemented) {
            (false, false) => Self::with_flag(merge::intersection(a, b), false),
            (false, true) => Self::with_flag(merge::difference(a, b), false),
            (true, false) => Self::with_flag(merge::difference(b, a), false),
            (true, true) => Self::with_flag(merge::union(a, b), true),
        }
    }

    pub fn difference(&self, other: &Self) -> Self {
        let (a, b) = (&self.elements, &other.elements);
        match (self.complemented, other.complemented) {
            (false, false) => Self::with_flag(merge::difference(a, b), false),
            (false, true) => Self::with_flag(merge::intersection(a, b), false),
            (true, false) => Self::with_flag(merge::union(a, b), true),
            (true, true) => Self::with_flag(merge::difference(b, a), false),
        }
    }
}

impl FromIterator<u64> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self::from_addresses(iter)
    }
}

impl Not for &CandidateSet {
    type Output = CandidateSet;

    fn not(self) -> CandidateSet {
        self.complement()
    }
}

impl BitOr for &CandidateSet {
    type Output = CandidateSet;

    fn bitor(self, rhs: Self) -> CandidateSet {
        self.union(rhs)
    }
}

impl BitAnd for &CandidateSet {
    type Output = CandidateSet;

    fn bitand(self, rhs: Self) -> CandidateSet {
        self.intersection(rhs)
    }
}

impl Sub for &CandidateSet {
    type Output = CandidateSet;

    fn sub(self, rhs: Self) -> CandidateSet {
        self.difference(rhs)
    }
}

pub fn load_set<P: AsRef<Path>>(path: P) -> Result<CandidateSet> {
    let content = fs::read_to_string(&path)?;
    let set = serde_json::from_str(&content)?;
    Ok(set)
}

pub fn save_set<P: AsRef<Path>>(path: P, set: &CandidateSet) -> Result<()> {
    let content = serde_json::to_string_pretty(set)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(addresses: &[u64]) -> CandidateSet {
        CandidateSet::from_addresses(addresses.iter().copied())
    }

    #[test]
    fn test_empty_and_universal() {
        let empty = CandidateSet::empty();
        let universal = CandidateSet::universal();
        assert!(empty.is_empty());
        assert!(universal.is_universal());
        assert!(!empty.contains(0));
        assert!(universal.contains(u64::MAX));
        assert_eq!(empty.complement(), universal);
    }

    #[test]
    fn test_from_addresses_normalizes() {
        let s = set(&[5, 1, 5, 3]);
        assert_eq!(s.explicit(), &[1, 3, 5]);
        assert!(!s.is_complemented());
    }

    #[test]
    fn test_complement_does_not_mutate() {
        let a = set(&[1, 2]);
        let b = a.complement();
        assert!(!a.is_complemented());
        assert!(b.is_complemented());
        assert!(!b.contains(1));
        assert!(b.contains(3));
        assert_eq!(!&b, a);
    }

    #[test]
    fn test_size_relative_to_universe() {
        let a = set(&[1, 2, 3]);
        assert_eq!(a.size(100), 3);
        assert_eq!(a.complement().size(100), 97);
        assert_eq!(CandidateSet::universal().size(0x800), 0x800);
        assert_eq!(a.complement().size(2), 0);
    }

    #[test]
    fn test_table_rows() {
        let a = set(&[1, 2]);
        let b = set(&[2, 3]);
        let na = a.complement();
        let nb = b.complement();

        assert_eq!(&a | &b, set(&[1, 2, 3]));
        assert_eq!(&a & &b, set(&[2]));
        assert_eq!(&a - &b, set(&[1]));

        assert_eq!(&a | &nb, set(&[3]).complement());
        assert_eq!(&a & &nb, set(&[1]));
        assert_eq!(&a - &nb, set(&[2]));

        assert_eq!(&na | &b, set(&[1]).complement());
        assert_eq!(&na & &b, set(&[3]));
        assert_eq!(&na - &b, set(&[1, 2, 3]).complement());

        assert_eq!(&na | &nb, set(&[2]).complement());
        assert_eq!(&na & &nb, set(&[1, 2, 3]).complement());
        assert_eq!(&na - &nb, set(&[3]));
    }

    #[test]
    fn test_elements_in_complemented() {
        let s = set(&[0x1001]).complement();
        let members: Vec<_> = s.elements_in(0x1000, 4).collect();
        assert_eq!(members, vec![0x1000, 0x1002, 0x1003]);
        assert_eq!(s.elements_in(0x1000, 0).count(), 0);
        assert_eq!(s.restrict(0x1000, 4), set(&[0x1000, 0x1002, 0x1003]));
    }

    #[test]
    fn test_as_table() {
        assert_eq!(set(&[3, 1]).as_table().unwrap(), vec![1, 3]);
        assert!(matches!(
            CandidateSet::universal().as_table(),
            Err(Error::UnboundedSet(0))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.json");

        let original = set(&[0x1000, 0x2000]).complement();
        save_set(&path, &original).unwrap();
        assert_eq!(load_set(&path).unwrap(), original);
    }

    #[test]
    fn test_load_normalizes_hand_edited_file() {
        let loaded: CandidateSet =
            serde_json::from_str(r#"{"elements": [9, 3, 3, 1]}"#).unwrap();
        assert_eq!(loaded.explicit(), &[1, 3, 9]);
        assert!(!loaded.is_complemented());
    }

    fn arb_set() -> impl Strategy<Value = CandidateSet> {
        (prop::collection::vec(0u64..64, 0..24), any::<bool>()).prop_map(|(addrs, flip)| {
            let s = CandidateSet::from_addresses(addrs);
            if flip { s.complement() } else { s }
        })
    }

    proptest! {
        #[test]
        fn prop_double_complement(a in arb_set()) {
            prop_assert_eq!(a.complement().complement(), a);
        }

        #[test]
        fn prop_complement_laws(a in arb_set()) {
            prop_assert!(a.union(&a.complement()).is_universal());
            prop_assert!(a.intersection(&a.complement()).is_empty());
        }

        #[test]
        fn prop_membership_laws(a in arb_set(), b in arb_set(), x in 0u64..80) {
            prop_assert_eq!(a.union(&b).contains(x), a.contains(x) || b.contains(x));
            prop_assert_eq!(a.intersection(&b).contains(x), a.contains(x) && b.contains(x));
            prop_assert_eq!(a.difference(&b).contains(x), a.contains(x) && !b.contains(x));
            prop_assert_eq!(a.complement().contains(x), !a.contains(x));
        }

        #[test]
        fn prop_results_stay_sorted(a in arb_set(), b in arb_set()) {
            for s in [a.union(&b), a.intersection(&b), a.difference(&b)] {
                prop_assert!(merge::is_normalized(s.explicit()));
            }
        }

        #[test]
        fn prop_enumeration_matches_contains(addrs in prop::collection::vec(0u64..64, 0..24)) {
            let s = CandidateSet::from_addresses(addrs);
            let listed: Vec<u64> = s.elements().collect();
            let expected: Vec<u64> = (0..64).filter(|&x| s.contains(x)).collect();
            prop_assert_eq!(&listed, &expected);
            prop_assert_eq!(s.as_table().unwrap(), expected);
        }

        #[test]
        fn prop_elements_in_matches_contains(a in arb_set(), base in 0u64..32, size in 0u64..48) {
            let listed: Vec<u64> = a.elements_in(base, size).collect();
            let expected: Vec<u64> = (base..base + size).filter(|&x| a.contains(x)).collect();
            prop_assert_eq!(listed, expected);
        }
    }
}
