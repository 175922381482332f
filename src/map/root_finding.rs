//! Safeguarded Newton iteration for scalar increasing equations.
//!
//! Used by monotone components to invert their diagonal: given an
//! increasing `g` and a target `t`, find `y` with `g(y) = t`.
//!
//! 1. Bracket: start from `[−1, 1]` and step outward, doubling the step,
//!    until `g(lo) <= t <= g(hi)`.
//! 2. Refine: Newton steps from the bracket midpoint, falling back to
//!    bisection whenever a step leaves the bracket or the derivative is not
//!    positive. The bracket shrinks every iteration.
//!
//! Failures are hard errors naming the column.
use crate::map::{
    errors::{MapError, MapResult},
    options::InverseOptions,
};

/// Find `[lo, hi]` with `g(lo) <= target <= g(hi)` for increasing `g`.
///
/// # Errors
/// - [`MapError::BracketNotFound`] after `max_bracket_expansions` doublings
///   or when `g` produces a non-finite value.
pub fn bracket_increasing<G>(
    g: G, target: f64, opts: &InverseOptions, column: usize,
) -> MapResult<(f64, f64)>
where
    G: Fn(f64) -> f64,
{
    let fail = || MapError::BracketNotFound { column, target };
    let (mut lo, mut hi, mut step) = (-1.0_f64, 1.0_f64, 1.0_f64);
    let (mut g_lo, mut g_hi) = (g(lo), g(hi));
    for _ in 0..=opts.max_bracket_expansions {
        if !g_lo.is_finite() || !g_hi.is_finite() {
            return Err(fail());
        }
        if g_lo > target {
            step *= 2.0;
            hi = lo;
            g_hi = g_lo;
            lo -= step;
            g_lo = g(lo);
        } else if g_hi < target {
            step *= 2.0;
            lo = hi;
            g_lo = g_hi;
            hi += step;
            g_hi = g(hi);
        } else {
            return Ok((lo, hi));
        }
    }
    if g_lo <= target && target <= g_hi {
        return Ok((lo, hi));
    }
    Err(fail())
}

/// Solve `g(y) = target` for increasing `g`, with `g_and_dg` returning
/// `(g(y), g'(y))`.
///
/// # Errors
/// - [`MapError::BracketNotFound`] from [`bracket_increasing`].
/// - [`MapError::InverseNotConverged`] when neither `ftol` nor `xtol` is met
///   within `max_iter` iterations.
pub fn solve_increasing<G>(
    g_and_dg: G, target: f64, opts: &InverseOptions, column: usize,
) -> MapResult<f64>
where
    G: Fn(f64) -> (f64, f64),
{
    let (mut lo, mut hi) = bracket_increasing(|y| g_and_dg(y).0, target, opts, column)?;
    let mut y = 0.5 * (lo + hi);
    let mut residual = f64::INFINITY;
    for _ in 0..opts.max_iter {
        let (value, slope) = g_and_dg(y);
        residual = value - target;
        if !residual.is_finite() {
            break;
        }
        if residual.abs() <= opts.ftol {
            return Ok(y);
        }
        if residual < 0.0 {
            lo = y;
        } else {
            hi = y;
        }

        let newton = y - residual / slope;
        let next = if slope > 0.0 && newton.is_finite() && newton >= lo && newton <= hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        let scale = 1.0 + y.abs();
        if (next - y).abs() <= opts.xtol * scale || (hi - lo) <= opts.xtol * scale {
            return Ok(next);
        }
        y = next;
    }
    Err(MapError::InverseNotConverged {
        column,
        residual: residual.abs(),
        iterations: opts.max_iter,
    })
}
