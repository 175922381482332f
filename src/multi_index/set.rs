//! MultiIndexSet — sorted, deduplicated collection of equal-length multi-indices.
//!
//! Purpose
//! -------
//! Hold the term set `S` of a polynomial expansion. Positions in the set are
//! the positions of the matching coefficients, so the set must be in a
//! canonical order that does not depend on how it was assembled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every member has the same `length` as the set.
//! - Members are strictly increasing under the [`MultiIndex`] total order
//!   (sorted and free of duplicates), so [`MultiIndexSet::index_of`] is a
//!   binary search.
use crate::multi_index::{
    errors::{MultiIndexError, MultiIndexResult},
    index::MultiIndex,
};

/// Canonically ordered set of multi-indices sharing one length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiIndexSet {
    length: usize,
    indices: Vec<MultiIndex>,
}

impl MultiIndexSet {
    /// Build a set from arbitrary multi-indices of length `length`.
    ///
    /// The input is sorted by the multi-index total order and duplicates are
    /// dropped.
    ///
    /// # Errors
    /// - [`MultiIndexError::LengthMismatch`] naming the first input position
    ///   whose length differs from `length`.
    pub fn from_indices<I>(length: usize, indices: I) -> MultiIndexResult<Self>
    where
        I: IntoIterator<Item = MultiIndex>,
    {
        let mut collected = Vec::new();
        for (position, idx) in indices.into_iter().enumerate() {
            if idx.length() != length {
                return Err(MultiIndexError::LengthMismatch {
                    position,
                    expected: length,
                    found: idx.length(),
                });
            }
            collected.push(idx);
        }
        collected.sort();
        collected.dedup();
        Ok(MultiIndexSet { length, indices: collected })
    }

    /// All multi-indices of `length` components with total order `<= max_order`.
    ///
    /// The set has `C(length + max_order, max_order)` members. For `length == 0`
    /// it holds only the empty multi-index.
    pub fn create_total_order(length: usize, max_order: u32) -> Self {
        let mut out = Vec::new();
        let mut current = vec![0u32; length];
        fill_total_order(&mut current, 0, max_order, &mut out);
        out.sort();
        MultiIndexSet { length, indices: out }
    }

    /// Length shared by every member.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MultiIndex> {
        self.indices.iter()
    }

    /// Member at `position`.
    ///
    /// # Errors
    /// - [`MultiIndexError::PositionOutOfRange`] if `position >= len()`.
    pub fn get(&self, position: usize) -> MultiIndexResult<&MultiIndex> {
        self.indices
            .get(position)
            .ok_or(MultiIndexError::PositionOutOfRange { position, size: self.indices.len() })
    }

    /// Position of `idx` in the set, if present.
    pub fn index_of(&self, idx: &MultiIndex) -> Option<usize> {
        self.indices.binary_search(idx).ok()
    }

    /// Largest value taken by each dimension across the set.
    pub fn max_degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.length];
        for idx in &self.indices {
            for (dim, value) in idx.nonzeros() {
                degrees[dim] = degrees[dim].max(value);
            }
        }
        degrees
    }
}

impl<'a> IntoIterator for &'a MultiIndexSet {
    type Item = &'a MultiIndex;
    type IntoIter = std::slice::Iter<'a, MultiIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

fn fill_total_order(current: &mut [u32], dim: usize, budget: u32, out: &mut Vec<MultiIndex>) {
    if dim == current.len() {
        out.push(MultiIndex::from_dense(current));
        return;
    }
    for value in 0..=budget {
        current[dim] = value;
        fill_total_order(current, dim + 1, budget - value, out);
    }
    current[dim] = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Canonical ordering and deduplication in `from_indices`.
    // - Cardinality and ordering of total-order sets.
    // - Lookup helpers (`get`, `index_of`, `max_degrees`).
    // -------------------------------------------------------------------------

    fn binomial(n: u64, k: u64) -> u64 {
        (1..=k).fold(1, |acc, i| acc * (n + 1 - i) / i)
    }

    #[test]
    // Purpose
    // -------
    // A total-order set has the expected size and is strictly increasing.
    //
    // Given
    // -----
    // - Small (length, order) pairs including the degenerate length 0.
    //
    // Expect
    // ------
    // - `len() == C(d + p, p)`; every member has `sum() <= p`; consecutive
    //   members are strictly increasing.
    fn total_order_set_has_binomial_size_and_is_sorted() {
        for (d, p) in [(0usize, 3u32), (1, 4), (2, 3), (3, 2), (4, 3)] {
            let set = MultiIndexSet::create_total_order(d, p);

            assert_eq!(set.len() as u64, binomial(d as u64 + p as u64, p as u64), "d={d} p={p}");
            assert!(set.iter().all(|idx| idx.sum() <= u64::from(p) && idx.length() == d));
            for pair in set.indices.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn total_order_set_starts_with_constant_term() {
        let set = MultiIndexSet::create_total_order(3, 2);
        assert_eq!(set.get(0).unwrap().vector(), vec![0, 0, 0]);
        assert_eq!(set.index_of(&MultiIndex::from([0, 0, 0])), Some(0));
    }

    #[test]
    // Purpose
    // -------
    // Assembly order does not affect the resulting set.
    //
    // Expect
    // ------
    // - Shuffled input with duplicates yields the same set as sorted input.
    fn from_indices_sorts_and_deduplicates() {
        let shuffled = vec![
            MultiIndex::from([1, 1]),
            MultiIndex::from([0, 0]),
            MultiIndex::from([2, 0]),
            MultiIndex::from([1, 1]),
            MultiIndex::from([0, 1]),
        ];
        let sorted = vec![
            MultiIndex::from([0, 0]),
            MultiIndex::from([0, 1]),
            MultiIndex::from([1, 1]),
            MultiIndex::from([2, 0]),
        ];

        let a = MultiIndexSet::from_indices(2, shuffled).unwrap();
        let b = MultiIndexSet::from_indices(2, sorted).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert_eq!(a.index_of(&MultiIndex::from([1, 1])), Some(2));
        assert_eq!(a.index_of(&MultiIndex::from([0, 2])), None);
    }

    #[test]
    fn from_indices_rejects_wrong_length() {
        let err = MultiIndexSet::from_indices(
            2,
            vec![MultiIndex::from([0, 0]), MultiIndex::from([1, 0, 0])],
        )
        .unwrap_err();
        assert_eq!(err, MultiIndexError::LengthMismatch { position: 1, expected: 2, found: 3 });
    }

    #[test]
    fn max_degrees_and_out_of_range_get() {
        let set = MultiIndexSet::from_indices(
            3,
            vec![MultiIndex::from([3, 0, 0]), MultiIndex::from([0, 1, 2])],
        )
        .unwrap();

        assert_eq!(set.max_degrees(), vec![3, 1, 2]);
        assert_eq!(set.get(2), Err(MultiIndexError::PositionOutOfRange { position: 2, size: 2 }));
        assert!(MultiIndexSet::default().is_empty());
    }
}
