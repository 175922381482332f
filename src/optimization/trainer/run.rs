//! Execution helper that runs an `argmin` solver on a map objective and
//! returns a [`TrainOutcome`].
use std::time::Duration;

#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::OptResult,
    trainer::{
        adapter::ArgMinAdapter,
        traits::{MapObjective, TrainOptions, TrainOutcome},
        types::{Cost, Grad, Theta},
    },
};

/// Run `solver` on `problem` starting from `theta0`.
///
/// Wires the executor with:
/// - `theta0` as the initial parameter,
/// - `opts.max_evals` as the iteration cap,
/// - `opts.stopval` as the target cost,
/// - `opts.max_time` as the timeout, when set,
/// - the slog terminal observer when the `obs_slog` feature is enabled and
///   `opts.verbose` is set.
///
/// # Errors
/// Any error raised during the run (objective failures, line-search
/// failures, observer failures) converted to `OptError`, and validation
/// errors from [`TrainOutcome::new`].
pub fn run_solver<'a, O, S>(
    theta0: Theta, opts: &TrainOptions, problem: ArgMinAdapter<'a, O>, solver: S,
) -> OptResult<TrainOutcome>
where
    O: MapObjective,
    S: Solver<ArgMinAdapter<'a, O>, IterState<Theta, Grad, (), (), (), Cost>> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let (max_evals, stopval) = (opts.max_evals, opts.stopval);
    let mut executor = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(max_evals).target_cost(stopval));
    if let Some(seconds) = opts.max_time {
        executor = executor.timeout(Duration::from_secs_f64(seconds));
    }
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut result = executor.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    TrainOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        &termination,
        iterations,
        function_counts,
        grad,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<O>(theta0: &Theta, problem: &ArgMinAdapter<'_, O>) -> OptResult<()>
where
    O: MapObjective,
{
    let j0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    log::info!(
        "init: J(theta0) = {:.6}{}",
        j0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
