//! High-level entry point for training the coefficients of a map.
//!
//! Binds a [`MapObjective`] to the map's structure, selects a solver per
//! [`TrainOptions::algorithm`], runs it, and writes the best coefficients
//! back into the map whether or not the run succeeded.
use std::cell::RefCell;

use ndarray::Array1;

use crate::{
    map::{ConditionalMap, ParameterizedMap},
    optimization::{
        errors::{OptError, OptResult},
        trainer::{
            adapter::{ArgMinAdapter, TrainingRecord},
            builders::{build_lbfgs_hager_zhang, build_lbfgs_more_thuente, build_steepest_descent},
            run::run_solver,
            traits::{MapObjective, TrainAlgorithm, TrainOptions, TrainOutcome},
        },
    },
};

/// Minimize `objective` over the coefficients of `map`.
///
/// # Behavior
/// - Maps without coefficients are rejected.
/// - Unset coefficients are initialized to `1.0` first.
/// - `objective.check` runs once on the starting coefficients.
/// - With `opts.verbose`, settings and the result are logged at info level.
/// - Solver failures do not abort: the failure is logged with
///   `log::warn!`, the best iterate seen is kept, and the returned outcome
///   carries a failure status.
/// - The outcome's coefficients are always written back with
///   [`ParameterizedMap::set_coeffs`].
///
/// # Errors
/// - [`OptError::NoCoefficients`] if `map.num_coeffs() == 0`.
/// - Option validation errors from the solver builders.
/// - Errors from `objective.check`.
/// - [`OptError::Map`] if initialization or write-back fails.
pub fn train_map<M, O>(
    map: &mut ParameterizedMap<M>, objective: &O, opts: &TrainOptions,
) -> OptResult<TrainOutcome>
where
    M: ConditionalMap,
    O: MapObjective,
{
    let num_coeffs = map.num_coeffs();
    if num_coeffs == 0 {
        return Err(OptError::NoCoefficients);
    }
    if !map.has_coeffs() {
        log::info!("TrainMap: Initializing map coeffs to 1.");
        map.set_coeffs(Array1::<f64>::ones(num_coeffs).view())?;
    }
    let theta0 = map.coeff_view()?.to_owned();
    objective.check(map.map(), &theta0)?;
    if opts.verbose {
        log_settings(opts, num_coeffs);
    }

    let record = RefCell::new(TrainingRecord::default());
    let result = {
        let problem = ArgMinAdapter::new(map.map(), objective, &record);
        match opts.algorithm {
            TrainAlgorithm::LbfgsMoreThuente => {
                let solver = build_lbfgs_more_thuente(opts)?;
                run_solver(theta0.clone(), opts, problem, solver)
            }
            TrainAlgorithm::LbfgsHagerZhang => {
                let solver = build_lbfgs_hager_zhang(opts)?;
                run_solver(theta0.clone(), opts, problem, solver)
            }
            TrainAlgorithm::SteepestDescent => {
                let solver = build_steepest_descent(opts)?;
                run_solver(theta0.clone(), opts, problem, solver)
            }
        }
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            let record = record.into_inner();
            let fn_evals = record.fn_evals();
            let coeffs = record.best_theta.unwrap_or(theta0);
            TrainOutcome::failed(coeffs, record.best_value, &err, fn_evals)
        }
    };
    if !outcome.converged() {
        log::warn!("Optimization failed: {}", outcome.message);
    }
    if opts.verbose {
        let evals = outcome.fn_evals.get("cost_count").copied().unwrap_or(0);
        log::info!("Optimization result: {} ({})", outcome.message, outcome.code());
        log::info!("Optimization error: {}", outcome.value);
        log::info!("Optimization evaluations: {evals}");
    }

    map.set_coeffs(outcome.coeffs.view())?;
    Ok(outcome)
}

fn log_settings(opts: &TrainOptions, num_coeffs: usize) {
    log::info!("Optimization Settings:");
    log::info!("  Algorithm: {}", opts.algorithm);
    log::info!("  Optimization dimension: {num_coeffs}");
    log::info!("  Optimization Stopval: {:.2e}", opts.stopval);
    log::info!("  Max Function Evaluations: {}", opts.max_evals);
    match opts.max_time {
        Some(seconds) => log::info!("  Maximum Time: {seconds:.2e}s"),
        None => log::info!("  Maximum Time: unbounded"),
    }
    log::info!("  Relative X Tolerance: {:.2e}", opts.xtol_rel);
    log::info!("  Relative F Tolerance: {:.2e}", opts.ftol_rel);
    log::info!("  Absolute F Tolerance: {:.2e}", opts.ftol_abs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        map::{IdentityMap, MapOptions, MonotonePolynomialMap},
        optimization::trainer::types::{Cost, Grad, Theta},
    };
    use approx::assert_relative_eq;
    use std::{
        io,
        sync::{Arc, Mutex, OnceLock},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Rejection of coefficient-free maps.
    // - Default initialization and write-back on a flat objective.
    // - Convergence on a smooth bowl for every algorithm.
    // - Failure reporting with best-iterate write-back and a logged warning,
    //   for every algorithm.
    // -------------------------------------------------------------------------

    const ALGORITHMS: [TrainAlgorithm; 3] = [
        TrainAlgorithm::LbfgsMoreThuente,
        TrainAlgorithm::LbfgsHagerZhang,
        TrainAlgorithm::SteepestDescent,
    ];

    #[derive(Clone)]
    struct SharedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Warnings emitted by any test in this binary since the logger was
    /// installed.
    fn warnings() -> String {
        static LOG: OnceLock<SharedLog> = OnceLock::new();
        let log = LOG.get_or_init(|| {
            let log = SharedLog(Arc::new(Mutex::new(Vec::new())));
            let _ = env_logger::Builder::new()
                .filter_level(log::LevelFilter::Warn)
                .target(env_logger::Target::Pipe(Box::new(log.clone())))
                .try_init();
            log
        });
        String::from_utf8_lossy(&log.0.lock().unwrap()).into_owned()
    }

    struct Flat;

    impl MapObjective for Flat {
        fn objective(
            &self, _map: &dyn ConditionalMap, _coeffs: &Theta, grad: Option<&mut Grad>,
        ) -> OptResult<Cost> {
            if let Some(g) = grad {
                g.fill(0.0);
            }
            Ok(0.0)
        }
    }

    /// `J(θ) = Σ (i + 1)(θ_i − target_i)²`; unequal weights keep line
    /// searches from landing exactly on the minimizer.
    struct Bowl {
        target: Theta,
    }

    impl MapObjective for Bowl {
        fn objective(
            &self, _map: &dyn ConditionalMap, coeffs: &Theta, grad: Option<&mut Grad>,
        ) -> OptResult<Cost> {
            let diff = coeffs - &self.target;
            let weights = Theta::from_iter((0..diff.len()).map(|i| (i + 1) as f64));
            if let Some(g) = grad {
                g.assign(&(&diff * &weights * 2.0));
            }
            Ok((&diff * &diff * &weights).sum())
        }
    }

    fn small_component() -> ParameterizedMap<MonotonePolynomialMap> {
        let comp = MonotonePolynomialMap::total_order(2, 1, &MapOptions::default()).unwrap();
        ParameterizedMap::new(comp)
    }

    #[test]
    fn coefficient_free_map_is_rejected() {
        let mut map = ParameterizedMap::new(IdentityMap::new(2, 1).unwrap());
        let err = train_map(&mut map, &Flat, &TrainOptions::default()).unwrap_err();
        assert_eq!(err, OptError::NoCoefficients);
    }

    #[test]
    // Purpose
    // -------
    // Unset coefficients start at 1.0 and a flat objective leaves them
    // there.
    //
    // Given
    // -----
    // - A monotone component with coefficients unset.
    // - An objective that is 0 everywhere with zero gradient.
    //
    // Expect
    // ------
    // - Every written-back coefficient equals 1.0.
    fn flat_objective_keeps_default_initialization() {
        let mut map = small_component();
        assert!(!map.has_coeffs());

        let out = train_map(&mut map, &Flat, &TrainOptions::default()).unwrap();

        let coeffs = map.coeffs().unwrap();
        assert_eq!(coeffs.len(), map.num_coeffs());
        assert!(coeffs.iter().all(|&c| c == 1.0));
        assert_eq!(out.coeffs, coeffs.to_owned());
    }

    #[test]
    // Purpose
    // -------
    // Every algorithm reaches the minimizer of a bowl and writes it back.
    fn every_algorithm_minimizes_a_bowl() {
        for algorithm in ALGORITHMS {
            let mut map = small_component();
            let target = Theta::from_iter((0..map.num_coeffs()).map(|i| 0.5 - 0.25 * i as f64));
            let bowl = Bowl { target: target.clone() };
            let opts = TrainOptions {
                algorithm,
                xtol_rel: 1e-10,
                ftol_rel: 0.0,
                ftol_abs: 1e-12,
                max_evals: 500,
                ..TrainOptions::default()
            };

            let out = train_map(&mut map, &bowl, &opts).unwrap();

            assert!(out.converged(), "{algorithm}: {}", out.message);
            for (c, t) in map.coeffs().unwrap().iter().zip(target.iter()) {
                assert_relative_eq!(*c, *t, epsilon = 1e-4);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // An objective that starts failing mid-run yields a failure status, not
    // an error, and the best coefficients seen are written back.
    //
    // Given
    // -----
    // - A linear objective that errors once any coefficient drops below 0.9,
    //   so the first line search from θ = 1 runs off the cliff.
    //
    // Expect
    // ------
    // - For every algorithm: a negative code, `converged() == false`, the
    //   written-back coefficients stay on the feasible side, and the
    //   reported value is the objective at those coefficients.
    // - The failure is logged as a warning.
    fn failing_objective_reports_failure_and_keeps_best() {
        struct Cliff;
        impl MapObjective for Cliff {
            fn objective(
                &self, _map: &dyn ConditionalMap, coeffs: &Theta, grad: Option<&mut Grad>,
            ) -> OptResult<Cost> {
                if coeffs.iter().any(|&c| c < 0.9) {
                    return Err(OptError::NonFiniteCost { value: f64::NAN });
                }
                if let Some(g) = grad {
                    g.fill(1.0);
                }
                Ok(coeffs.sum())
            }
        }

        warnings();
        for algorithm in ALGORITHMS {
            let mut map = small_component();
            let opts = TrainOptions { algorithm, ..TrainOptions::default() };

            let out = train_map(&mut map, &Cliff, &opts).unwrap();

            assert!(!out.converged(), "{algorithm}: {}", out.message);
            assert!(out.code() < 0, "{algorithm}: code {}", out.code());
            let coeffs = map.coeffs().unwrap();
            assert!(coeffs.iter().all(|&c| c >= 0.9), "{algorithm}");
            assert_relative_eq!(out.value, coeffs.sum());
        }
        assert!(warnings().contains("Optimization failed"));
    }
}
