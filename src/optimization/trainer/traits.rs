//! trainer::traits — objective boundary, training options, and outcome.
//!
//! Purpose
//! -------
//! Define what the training loop needs from the caller and what it hands
//! back:
//! - [`MapObjective`]: the scalar objective `J(θ)` of a map's coefficients,
//!   with an optional gradient.
//! - [`TrainAlgorithm`] / [`TrainOptions`]: solver choice and stopping
//!   criteria, validated on construction.
//! - [`TrainOutcome`]: trained coefficients, best value, status code, and
//!   evaluation counters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are minimized.
//! - When `grad` is `Some`, an objective must overwrite every entry.
//! - Objectives that cannot supply a gradient return
//!   [`OptError::GradientNotImplemented`]; the adapter then falls back to
//!   finite differences.
//!
//! Conventions
//! -----------
//! - Option enums parse case-insensitively via `FromStr` and report
//!   [`OptError::InvalidAlgorithm`] with the accepted spellings.
use std::{fmt, str::FromStr};

use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;

use crate::{
    map::ConditionalMap,
    optimization::{
        errors::{OptError, OptResult},
        trainer::{
            status::TrainStatus,
            types::{Cost, FnEvalMap, Grad, Theta, DEFAULT_LBFGS_MEM},
            validation::{
                validate_theta_hat, validate_value, verify_max_evals, verify_max_time,
                verify_stopval, verify_tolerance,
            },
        },
    },
};

/// Objective over the coefficients of a map.
///
/// `map` is the structure under training; `coeffs` is the trial coefficient
/// vector, of length `map.num_coeffs()`.
pub trait MapObjective {
    /// Evaluate `J(coeffs)`; when `grad` is `Some`, also write `∇J(coeffs)`.
    fn objective(
        &self, map: &dyn ConditionalMap, coeffs: &Theta, grad: Option<&mut Grad>,
    ) -> OptResult<Cost>;

    /// Structural check run once before optimization starts.
    fn check(&self, _map: &dyn ConditionalMap, _coeffs: &Theta) -> OptResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainAlgorithm {
    /// L-BFGS with a More–Thuente line search.
    #[default]
    LbfgsMoreThuente,
    /// L-BFGS with a Hager–Zhang line search.
    LbfgsHagerZhang,
    /// Steepest descent with a More–Thuente line search.
    SteepestDescent,
}

impl TrainAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            TrainAlgorithm::LbfgsMoreThuente => "L-BFGS (More-Thuente)",
            TrainAlgorithm::LbfgsHagerZhang => "L-BFGS (Hager-Zhang)",
            TrainAlgorithm::SteepestDescent => "Steepest descent (More-Thuente)",
        }
    }
}

impl fmt::Display for TrainAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrainAlgorithm {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lbfgs" | "ld_lbfgs" | "morethuente" => Ok(TrainAlgorithm::LbfgsMoreThuente),
            "hagerzhang" => Ok(TrainAlgorithm::LbfgsHagerZhang),
            "steepestdescent" | "gd" => Ok(TrainAlgorithm::SteepestDescent),
            _ => Err(OptError::InvalidAlgorithm {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'lbfgs', 'ld_lbfgs', \
                         'MoreThuente', 'HagerZhang', 'SteepestDescent' or 'gd'.",
            }),
        }
    }
}

/// Stopping criteria and solver choice for [`train_map`](crate::optimization::trainer::train_map).
///
/// - `stopval`: stop once `J(θ) <= stopval` (`-inf` disables).
/// - `xtol_rel`, `ftol_rel`, `ftol_abs`: change-based criteria, `0.0`
///   disables (see [`guard`](crate::optimization::trainer::guard)).
/// - `max_evals`: objective evaluation budget, also the iteration cap.
/// - `max_time`: wall-clock budget in seconds.
/// - `lbfgs_mem`: L-BFGS history size.
/// - `verbose`: log settings and result at info level.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub algorithm: TrainAlgorithm,
    pub stopval: f64,
    pub xtol_rel: f64,
    pub ftol_rel: f64,
    pub ftol_abs: f64,
    pub max_evals: u64,
    pub max_time: Option<f64>,
    pub lbfgs_mem: usize,
    pub verbose: bool,
}

impl TrainOptions {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        algorithm: TrainAlgorithm, stopval: f64, xtol_rel: f64, ftol_rel: f64, ftol_abs: f64,
        max_evals: u64, max_time: Option<f64>, lbfgs_mem: usize, verbose: bool,
    ) -> OptResult<Self> {
        let opts = Self {
            algorithm,
            stopval,
            xtol_rel,
            ftol_rel,
            ftol_abs,
            max_evals,
            max_time,
            lbfgs_mem,
            verbose,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check every field; fields are public, so the trainer validates
    /// again before running.
    pub fn validate(&self) -> OptResult<()> {
        verify_stopval(self.stopval)?;
        verify_tolerance("xtol_rel", self.xtol_rel)?;
        verify_tolerance("ftol_rel", self.ftol_rel)?;
        verify_tolerance("ftol_abs", self.ftol_abs)?;
        verify_max_evals(self.max_evals)?;
        verify_max_time(self.max_time)?;
        if self.lbfgs_mem == 0 {
            return Err(OptError::InvalidLBFGSMem {
                mem: self.lbfgs_mem,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(())
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            algorithm: TrainAlgorithm::default(),
            stopval: f64::NEG_INFINITY,
            xtol_rel: 1e-4,
            ftol_rel: 1e-3,
            ftol_abs: 1e-3,
            max_evals: 1000,
            max_time: None,
            lbfgs_mem: DEFAULT_LBFGS_MEM,
            verbose: false,
        }
    }
}

/// Result of a training run.
///
/// `coeffs` is what was written back into the map. `value` is the best
/// objective value seen (`+inf` when the run failed before any evaluation).
/// `message` is the status message, or the error text for runs that
/// aborted.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    pub coeffs: Theta,
    pub value: f64,
    pub status: TrainStatus,
    pub message: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl TrainOutcome {
    /// Outcome of a run that completed.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: &TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let coeffs = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let status = TrainStatus::from_termination(termination);
        let message = match termination {
            TerminationStatus::Terminated(TerminationReason::SolverExit(text))
                if !status.is_success() =>
            {
                format!("{}: {text}", status.message())
            }
            _ => status.message().to_string(),
        };
        Ok(Self {
            coeffs,
            value,
            status,
            message,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }

    /// Outcome of a run that aborted with `err`, keeping the best iterate
    /// seen before the failure.
    pub fn failed(coeffs: Theta, value: f64, err: &OptError, fn_evals: FnEvalMap) -> Self {
        Self {
            coeffs,
            value,
            status: TrainStatus::from_error(err),
            message: err.to_string(),
            iterations: 0,
            fn_evals,
            grad_norm: None,
        }
    }

    pub fn code(&self) -> i32 {
        self.status.code()
    }

    pub fn converged(&self) -> bool {
        self.status.is_success()
    }
}
