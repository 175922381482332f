//! transport_maps — monotone block-triangular transport maps.
//!
//! Purpose
//! -------
//! Build, evaluate, invert, and train maps `T: ℝ^N → ℝ^M` whose output
//! blocks each depend on a growing prefix of the input and are monotone in
//! their own trailing block. Such maps push samples of a target
//! distribution to a reference (measure transport) and give its density via
//! the Jacobian log-determinant.
//!
//! Key behaviors
//! -------------
//! - [`multi_index`]: sparse multi-indices with a total order, and sorted
//!   multi-index sets (total-order construction).
//! - [`basis`]: orthogonal Hermite families with derivatives.
//! - [`map`]: the component capability trait, identity and monotone
//!   polynomial components, triangular composition over a shared
//!   coefficient arena, and a factory.
//! - [`optimization`]: Argmin-backed coefficient training and the KL
//!   objective.
//!
//! Invariants & assumptions
//! ------------------------
//! - Point batches are `(dim, n_pts)` `ndarray` arrays, one sample per
//!   column, in host memory.
//! - Contract violations are returned as typed errors
//!   ([`multi_index::MultiIndexError`], [`map::MapError`],
//!   [`optimization::errors::OptError`]); library code does not panic on
//!   caller input.
//!
//! Downstream usage
//! ----------------
//! - `use transport_maps::prelude::*;` brings in the common surface.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; the end-to-end pipeline
//!   (factory, training, evaluation, inversion) is covered under `tests/`.

pub mod basis;
pub mod map;
pub mod multi_index;
pub mod optimization;

pub mod prelude {
    pub use crate::basis::{BasisType, OrthogonalPolynomial};
    pub use crate::map::prelude::*;
    pub use crate::multi_index::{MultiIndex, MultiIndexSet};
    pub use crate::optimization::prelude::*;
}
