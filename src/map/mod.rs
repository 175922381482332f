//! map — monotone block-triangular transport maps.
//!
//! Purpose
//! -------
//! Build, evaluate, differentiate, and invert maps
//! `T: ℝ^N → ℝ^M` assembled from conditional components, each depending on
//! a growing prefix of the input and invertible in its own trailing block.
//!
//! Key behaviors
//! -------------
//! - [`ConditionalMap`] is the capability trait every component implements
//!   (evaluate, log-determinant, input/coefficient adjoints, inverse, and
//!   log-determinant gradients).
//! - [`ParameterizedMap`] owns the coefficient arena and feeds each call the
//!   coefficients it needs; it is the only writer of coefficients.
//! - [`TriangularMap`] chains components and slices the arena into
//!   per-component [`coeffs::CoeffRange`]s.
//! - Concrete components: [`IdentityMap`] (no coefficients) and
//!   [`MonotonePolynomialMap`] (Hermite expansion plus a positive diagonal).
//! - [`factory`] builds common configurations from [`MapOptions`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Point batches are `(dim, n_pts)` arrays, one sample per column.
//! - Structural violations (shapes, chain dimensions, coefficient lengths)
//!   and unsupported capabilities are returned as [`MapError`]; nothing in
//!   this module panics on caller input.
//! - Inversion is a hard failure on the first column that does not
//!   converge.
//!
//! Testing notes
//! -------------
//! - Each submodule checks its own contracts; analytic derivatives are
//!   verified against central finite differences in `monotone` and
//!   `triangular`.

pub mod coeffs;
pub mod component;
pub mod errors;
pub mod factory;
pub mod identity;
pub mod monotone;
pub mod options;
pub mod parameterized;
pub mod root_finding;
pub mod triangular;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::component::ConditionalMap;
pub use self::errors::{MapError, MapResult};
pub use self::factory::{create_component, create_identity, create_triangular};
pub use self::identity::IdentityMap;
pub use self::monotone::MonotonePolynomialMap;
pub use self::options::{InverseOptions, MapOptions, PosFuncType};
pub use self::parameterized::{ComponentView, ParameterizedMap};
pub use self::triangular::TriangularMap;

pub mod prelude {
    pub use super::component::ConditionalMap;
    pub use super::errors::{MapError, MapResult};
    pub use super::factory::{create_component, create_identity, create_triangular};
    pub use super::options::MapOptions;
    pub use super::parameterized::ParameterizedMap;
    pub use super::triangular::TriangularMap;
}
