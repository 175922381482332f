//! trainer — argmin-powered coefficient training for transport maps.
//!
//! Purpose
//! -------
//! Fit the coefficients of a [`ParameterizedMap`](crate::map::ParameterizedMap)
//! by minimizing a caller-supplied [`MapObjective`]. Callers implement the
//! objective (or use [`KLObjective`](crate::optimization::objectives::KLObjective))
//! and invoke [`train_map`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes `J(θ)` and `∇J(θ)` to `argmin`,
//!   falling back to [`finite_diff`] when the objective has no gradient,
//!   and records the best iterate on the side.
//! - [`builders`] constructs L-BFGS (More–Thuente or Hager–Zhang line
//!   search) or steepest descent, each wrapped in a
//!   [`guard::ToleranceGuard`] that enforces `xtol_rel`, `ftol_rel`,
//!   `ftol_abs`, and the evaluation budget.
//! - [`run::run_solver`] applies the initial point, iteration cap, target
//!   cost, and timeout, and normalizes the result into a [`TrainOutcome`].
//! - [`status::TrainStatus`] classifies every ending into a fixed table of
//!   success and failure codes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are minimized; values and gradients must be finite.
//! - Solver failures are reported in the outcome, never as `Err`; the
//!   best coefficients seen are still written back.
//! - `argmin::core::Error` is converted to [`OptError`](crate::optimization::errors::OptError)
//!   at every boundary.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each submodule; `api` runs every algorithm on a
//!   weighted quadratic and exercises the failure path.
//! - End-to-end training with the KL objective lives in
//!   `tests/integration_transport_pipeline.rs`.
pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod guard;
pub mod run;
pub mod status;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::train_map;
pub use self::status::{FailureKind, SuccessKind, TrainStatus};
pub use self::traits::{MapObjective, TrainAlgorithm, TrainOptions, TrainOutcome};
pub use self::types::{Cost, FnEvalMap, Grad, Theta, DEFAULT_LBFGS_MEM};
