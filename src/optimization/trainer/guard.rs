//! trainer::guard — relative/absolute stopping criteria around any solver.
//!
//! Purpose
//! -------
//! `argmin` solvers stop on their own convergence tests, on `max_iters`,
//! on a target cost, and on a timeout. Training additionally needs
//! change-based criteria on the iterate and the objective and a budget on
//! objective evaluations. [`ToleranceGuard`] wraps an inner solver,
//! forwards `init`/`next_iter` unchanged, and adds those checks to
//! `terminate`.
//!
//! Key behaviors
//! -------------
//! - `ftol_abs`: stop when `|J_k − J_{k−1}| <= ftol_abs`.
//! - `ftol_rel`: stop when `|J_k − J_{k−1}| <= ftol_rel · |J_k|`.
//! - `xtol_rel`: stop when `‖θ_k − θ_{k−1}‖ <= xtol_rel · ‖θ_k‖`.
//! - `max_evals`: stop once the problem's `cost_count` reaches the budget.
//! - A tolerance of `0.0` disables its criterion.
//!
//! Conventions
//! -----------
//! - Guard exits are reported as `TerminationReason::SolverExit` carrying
//!   the [`ExitReason`] string, which
//!   [`TrainStatus::from_termination`](crate::optimization::trainer::status::TrainStatus::from_termination)
//!   parses back.
//! - The guard's checks run before the inner solver's own test so the more
//!   specific reason is reported.
use std::fmt;

use argmin::core::{
    Error, IterState, Problem, Solver, State, TerminationReason, TerminationStatus, KV,
};
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};

use crate::optimization::trainer::{
    traits::TrainOptions,
    types::{Cost, Grad, Theta},
};

type TrainState = IterState<Theta, Grad, (), (), (), Cost>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Ftol,
    Xtol,
    MaxEvals,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::Ftol => "ftol reached",
            ExitReason::Xtol => "xtol reached",
            ExitReason::MaxEvals => "maxeval reached",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        [ExitReason::Ftol, ExitReason::Xtol, ExitReason::MaxEvals]
            .into_iter()
            .find(|reason| reason.as_str() == text)
    }

    fn status(self) -> TerminationStatus {
        TerminationStatus::Terminated(TerminationReason::SolverExit(self.as_str().to_string()))
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceGuard<S> {
    inner: S,
    xtol_rel: f64,
    ftol_rel: f64,
    ftol_abs: f64,
    max_evals: u64,
}

impl<S> ToleranceGuard<S> {
    pub fn new(inner: S, opts: &TrainOptions) -> Self {
        Self {
            inner,
            xtol_rel: opts.xtol_rel,
            ftol_rel: opts.ftol_rel,
            ftol_abs: opts.ftol_abs,
            max_evals: opts.max_evals,
        }
    }

    /// Guard criteria evaluated on the state after an iteration.
    pub fn check(&self, state: &TrainState) -> Option<ExitReason> {
        let evals = state.get_func_counts().get("cost_count").copied().unwrap_or(0);
        if evals >= self.max_evals {
            return Some(ExitReason::MaxEvals);
        }

        let (cost, prev_cost) = (state.get_cost(), state.get_prev_cost());
        if cost.is_finite() && prev_cost.is_finite() {
            let df = (prev_cost - cost).abs();
            if (self.ftol_abs > 0.0 && df <= self.ftol_abs)
                || (self.ftol_rel > 0.0 && df <= self.ftol_rel * cost.abs())
            {
                return Some(ExitReason::Ftol);
            }
        }

        if self.xtol_rel > 0.0 {
            if let (Some(theta), Some(prev)) = (state.get_param(), state.get_prev_param()) {
                let dx = (theta - prev).l2_norm();
                if dx <= self.xtol_rel * theta.l2_norm() {
                    return Some(ExitReason::Xtol);
                }
            }
        }
        None
    }
}

impl<O, S> Solver<O, TrainState> for ToleranceGuard<S>
where
    S: Solver<O, TrainState>,
{
    const NAME: &'static str = <S as Solver<O, TrainState>>::NAME;

    fn init(
        &mut self, problem: &mut Problem<O>, state: TrainState,
    ) -> Result<(TrainState, Option<KV>), Error> {
        self.inner.init(problem, state)
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: TrainState,
    ) -> Result<(TrainState, Option<KV>), Error> {
        self.inner.next_iter(problem, state)
    }

    fn terminate(&mut self, state: &TrainState) -> TerminationStatus {
        if let Some(reason) = self.check(state) {
            return reason.status();
        }
        self.inner.terminate(state)
    }
}
