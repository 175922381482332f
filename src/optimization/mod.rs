//! optimization — coefficient training, objectives, and numerical helpers.
//!
//! Purpose
//! -------
//! Fit the coefficients of transport maps with an Argmin-backed training
//! loop, provide the standard KL objective, and collect the numerically
//! stable scalar transforms the map kernels rely on, behind one error
//! surface.
//!
//! Key behaviors
//! -------------
//! - [`trainer`]: [`train_map`](trainer::train_map) minimizes a
//!   [`MapObjective`](trainer::MapObjective) over a map's coefficients with
//!   L-BFGS or steepest descent, default-initializes unset coefficients,
//!   writes the best iterate back, and classifies the ending with a fixed
//!   status table.
//! - [`objectives`]: [`KLObjective`](objectives::KLObjective).
//! - [`numerical_stability`]: overflow-safe softplus/logistic transforms.
//! - [`errors`]: [`OptError`](errors::OptError) and
//!   [`OptResult`](errors::OptResult), with conversions from map and
//!   `argmin` errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are minimized and must return finite values and gradients;
//!   violations surface as `OptError`, not panics.
//! - Solver failures are not errors: they come back as a failed
//!   [`TrainOutcome`](trainer::TrainOutcome) after a `log::warn!`.
//!
//! Conventions
//! -----------
//! - Coefficient vectors and gradients use the `ndarray` aliases
//!   [`Theta`](trainer::Theta) and [`Grad`](trainer::Grad).
//! - Callers never see raw Argmin errors.
//!
//! Downstream usage
//! ----------------
//! - Typical use: build a map with [`crate::map::factory`], wrap samples in
//!   a [`KLObjective`](objectives::KLObjective), call
//!   [`train_map`](trainer::train_map), then evaluate or invert the trained
//!   map.
//! - Front-ends can import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule; end-to-end training is covered by
//!   `tests/integration_transport_pipeline.rs`.

pub mod errors;
pub mod numerical_stability;
pub mod objectives;
pub mod trainer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::objectives::KLObjective;
    pub use super::trainer::{
        train_map, MapObjective, TrainAlgorithm, TrainOptions, TrainOutcome, TrainStatus,
    };
}
