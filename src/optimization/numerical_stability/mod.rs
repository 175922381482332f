//! numerical_stability — guarded scalar transforms.
//!
//! Purpose
//! -------
//! Centralize overflow-safe versions of the positivity transforms that keep
//! monotone components strictly increasing (`softplus` and its derivative
//! `logistic`), so map kernels can assume well-conditioned `f64` arithmetic.
//!
//! Conventions
//! -----------
//! - Pure functions on `f64`; no logging, no allocation, safe in per-point
//!   inner loops.
//! - Inputs are assumed finite; shape and domain validation happens in the
//!   map layer.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    SOFTPLUS_CUTOFF, safe_log_softplus, safe_logistic, safe_softplus,
};

pub mod prelude {
    pub use super::transformations::{safe_log_softplus, safe_logistic, safe_softplus};
}
