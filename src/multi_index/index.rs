//! MultiIndex — sparse exponent vector with a canonical total order.
//!
//! Purpose
//! -------
//! Represent one multivariate polynomial exponent vector `j = [j_1, …, j_D]`
//! while storing only its nonzero components. Expansions used by transport
//! maps are usually dominated by low-order, low-interaction terms, so the
//! sparse layout keeps both memory and per-term evaluation proportional to
//! the number of active dimensions.
//!
//! Key behaviors
//! -------------
//! - Build from a dense slice, a fixed-size array, or `(length, fill)`.
//! - Cache the ℓ1 norm (`sum`, the total order) and the ℓ∞ norm
//!   (`max_degree`) and keep both consistent on every mutation through
//!   [`MultiIndex::set`].
//! - Order multi-indices by length, then total order, then max value, then
//!   lexicographically on the dense vector; sets rely on this order for
//!   sorting, deduplication, and binary search.
//!
//! Invariants & assumptions
//! ------------------------
//! - `nz_inds` is strictly increasing, every entry is `< length`, and
//!   `nz_vals[k] != 0` for every stored entry.
//! - `total_order == nz_vals.sum()` and `max_value == nz_vals.max()` (0 when
//!   there are no nonzeros).
//! - Storage is canonical, so structural equality of the nonzero lists is
//!   exactly equality of the dense vectors.
//!
//! Conventions
//! -----------
//! - Components are `u32`, dimensions are 0-based `usize`. The total order
//!   is accumulated in `u64` so sums of large components cannot wrap.
//! - Read access to the nonzero pattern is provided by
//!   [`MultiIndex::nonzeros`]; nothing outside this file writes the storage.
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use crate::multi_index::errors::{MultiIndexError, MultiIndexResult};

/// Sparse nonnegative integer vector used to index polynomial terms.
#[derive(Debug, Clone, Default)]
pub struct MultiIndex {
    length: usize,
    nz_inds: Vec<usize>,
    nz_vals: Vec<u32>,
    max_value: u32,
    total_order: u64,
}

impl MultiIndex {
    /// Create a multi-index of `length` components, all equal to `fill`.
    ///
    /// A zero `fill` yields the all-zero index with no stored entries.
    pub fn new(length: usize, fill: u32) -> Self {
        if fill == 0 {
            return MultiIndex { length, ..Default::default() };
        }
        MultiIndex {
            length,
            nz_inds: (0..length).collect(),
            nz_vals: vec![fill; length],
            max_value: if length > 0 { fill } else { 0 },
            total_order: u64::from(fill) * length as u64,
        }
    }

    /// Extract the nonzero components of a dense vector.
    pub fn from_dense(dense: &[u32]) -> Self {
        let mut out = MultiIndex { length: dense.len(), ..Default::default() };
        for (index, &value) in dense.iter().enumerate() {
            if value != 0 {
                out.nz_inds.push(index);
                out.nz_vals.push(value);
                out.total_order += u64::from(value);
                out.max_value = out.max_value.max(value);
            }
        }
        out
    }

    /// Number of components (the polynomial dimension).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Total order: the ℓ1 norm. O(1).
    pub fn sum(&self) -> u64 {
        self.total_order
    }

    /// Maximum component: the ℓ∞ norm. O(1).
    pub fn max_degree(&self) -> u32 {
        self.max_value
    }

    /// Number of stored nonzero components.
    pub fn num_nz(&self) -> usize {
        self.nz_inds.len()
    }

    /// Component `index`, or 0 when it is not stored.
    ///
    /// # Errors
    /// - [`MultiIndexError::IndexOutOfRange`] if `index >= length`.
    pub fn get(&self, index: usize) -> MultiIndexResult<u32> {
        self.check_index(index)?;
        Ok(match self.nz_inds.binary_search(&index) {
            Ok(pos) => self.nz_vals[pos],
            Err(_) => 0,
        })
    }

    /// Set component `index` to `value`, keeping the cached norms consistent.
    ///
    /// Returns `Ok(true)` when `index` already held a nonzero value before
    /// the call (whether it is updated or removed), `Ok(false)` otherwise.
    ///
    /// # Errors
    /// - [`MultiIndexError::IndexOutOfRange`] if `index >= length`.
    pub fn set(&mut self, index: usize, value: u32) -> MultiIndexResult<bool> {
        self.check_index(index)?;
        match self.nz_inds.binary_search(&index) {
            Ok(pos) => {
                let old = self.nz_vals[pos];
                if value == 0 {
                    self.nz_inds.remove(pos);
                    self.nz_vals.remove(pos);
                    self.total_order -= u64::from(old);
                    if old == self.max_value {
                        self.recompute_max();
                    }
                } else {
                    self.nz_vals[pos] = value;
                    self.total_order = self.total_order - u64::from(old) + u64::from(value);
                    if value >= self.max_value {
                        self.max_value = value;
                    } else if old == self.max_value {
                        self.recompute_max();
                    }
                }
                Ok(true)
            }
            Err(pos) => {
                if value != 0 {
                    self.nz_inds.insert(pos, index);
                    self.nz_vals.insert(pos, value);
                    self.total_order += u64::from(value);
                    self.max_value = self.max_value.max(value);
                }
                Ok(false)
            }
        }
    }

    /// Dense reconstruction of length [`MultiIndex::length`].
    pub fn vector(&self) -> Vec<u32> {
        let mut dense = vec![0; self.length];
        for (index, value) in self.nonzeros() {
            dense[index] = value;
        }
        dense
    }

    /// Nonzero `(dimension, value)` pairs in increasing dimension order.
    pub fn nonzeros(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.nz_inds.iter().copied().zip(self.nz_vals.iter().copied())
    }

    fn check_index(&self, index: usize) -> MultiIndexResult<()> {
        if index >= self.length {
            return Err(MultiIndexError::IndexOutOfRange { index, length: self.length });
        }
        Ok(())
    }

    fn recompute_max(&mut self) {
        self.max_value = self.nz_vals.iter().copied().max().unwrap_or(0);
    }

    /// Lexicographic comparison of the dense vectors, merged over the
    /// sparse patterns. Lengths are assumed equal.
    fn lex_cmp(&self, other: &Self) -> Ordering {
        let mut lhs = self.nonzeros().peekable();
        let mut rhs = other.nonzeros().peekable();
        loop {
            match (lhs.peek().copied(), rhs.peek().copied()) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((i, v)), Some((j, w))) => {
                    if i < j {
                        // `other` is zero at dimension i.
                        return Ordering::Greater;
                    }
                    if j < i {
                        return Ordering::Less;
                    }
                    match v.cmp(&w) {
                        Ordering::Equal => {
                            lhs.next();
                            rhs.next();
                        }
                        unequal => return unequal,
                    }
                }
            }
        }
    }
}

impl PartialEq for MultiIndex {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.nz_inds == other.nz_inds && self.nz_vals == other.nz_vals
    }
}

impl Eq for MultiIndex {}

impl Hash for MultiIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        self.nz_inds.hash(state);
        self.nz_vals.hash(state);
    }
}

impl Ord for MultiIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.length
            .cmp(&other.length)
            .then(self.total_order.cmp(&other.total_order))
            .then(self.max_value.cmp(&other.max_value))
            .then_with(|| self.lex_cmp(other))
    }
}

impl PartialOrd for MultiIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MultiIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (k, value) in self.vector().iter().enumerate() {
            if k > 0 {
                write!(f, ",")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

impl From<&[u32]> for MultiIndex {
    fn from(dense: &[u32]) -> Self {
        MultiIndex::from_dense(dense)
    }
}

impl From<Vec<u32>> for MultiIndex {
    fn from(dense: Vec<u32>) -> Self {
        MultiIndex::from_dense(&dense)
    }
}

impl<const N: usize> From<[u32; N]> for MultiIndex {
    fn from(dense: [u32; N]) -> Self {
        MultiIndex::from_dense(&dense)
    }
}
