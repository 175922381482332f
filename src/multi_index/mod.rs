//! multi_index — sparse polynomial exponent vectors and their term sets.
//!
//! Purpose
//! -------
//! Provide the indexing layer for polynomial expansions: a sparse
//! [`MultiIndex`] with cached norms and a canonical total order, and a
//! [`MultiIndexSet`] that keeps terms sorted so coefficient positions are
//! reproducible.
//!
//! Key behaviors
//! -------------
//! - [`MultiIndex`] stores only nonzero components and answers `sum()` and
//!   `max_degree()` in O(1).
//! - Multi-indices compare by length, then total order, then max value, then
//!   lexicographically; [`MultiIndexSet`] relies on this order for sorting,
//!   deduplication, and binary-search lookup.
//! - The nonzero pattern is exposed read-only through
//!   [`MultiIndex::nonzeros`], which is what polynomial evaluation consumes.
//!
//! Conventions
//! -----------
//! - Dimensions are 0-based; out-of-range access returns
//!   [`MultiIndexError`], never panics.
//!
//! Downstream usage
//! ----------------
//! - `map::monotone` builds a total-order set over the conditioning
//!   dimensions and evaluates one tensor-product basis term per member.

pub mod errors;
pub mod index;
pub mod set;

pub use self::errors::{MultiIndexError, MultiIndexResult};
pub use self::index::MultiIndex;
pub use self::set::MultiIndexSet;
