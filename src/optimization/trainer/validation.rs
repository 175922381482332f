//! trainer::validation — checks on options, gradients, and trained output.
//!
//! Every helper returns `OptResult<()>` (or the validated value) and never
//! panics; callers propagate with `?`.
use crate::optimization::{
    errors::{OptError, OptResult},
    trainer::types::{Grad, Theta},
};

/// Stopping tolerances are finite and non-negative; `0.0` disables the
/// criterion.
pub fn verify_tolerance(name: &'static str, tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolerance { name, tol, reason: "Tolerance must be finite." });
    }
    if tol < 0.0 {
        return Err(OptError::InvalidTolerance {
            name,
            tol,
            reason: "Tolerance must be non-negative.",
        });
    }
    Ok(())
}

/// The stop value may be `-inf` (disabled) or any finite number.
pub fn verify_stopval(value: f64) -> OptResult<()> {
    if value.is_nan() || value == f64::INFINITY {
        return Err(OptError::InvalidStopval {
            value,
            reason: "Stop value must be finite or negative infinity.",
        });
    }
    Ok(())
}

pub fn verify_max_evals(max_evals: u64) -> OptResult<()> {
    if max_evals == 0 {
        return Err(OptError::InvalidMaxEvals {
            max_evals,
            reason: "Maximum evaluations must be greater than zero.",
        });
    }
    Ok(())
}

pub fn verify_max_time(seconds: Option<f64>) -> OptResult<()> {
    if let Some(seconds) = seconds {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(OptError::InvalidMaxTime {
                seconds,
                reason: "Time budget must be positive and finite.",
            });
        }
    }
    Ok(())
}

/// Gradient has the coefficient dimension and finite entries.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Trained coefficients must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
