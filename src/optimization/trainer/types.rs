//! trainer::types — numeric aliases and solver type wiring.
//!
//! The coefficient vector of the map under training is the optimizer's
//! parameter vector; its objective value is the cost being minimized.
use argmin::solver::{
    gradientdescent::SteepestDescent,
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Coefficient vector `θ` of the map under training.
pub type Theta = Array1<f64>;

/// Gradient `∇J(θ)` of the objective, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value `J(θ)` (minimized).
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps counter names (e.g., `"cost_count"`, `"gradient_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to the trainer's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to the trainer's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Steepest descent with a More–Thuente line search.
pub type SteepestDescentMT = SteepestDescent<MoreThuenteLS>;
