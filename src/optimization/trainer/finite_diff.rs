//! trainer::finite_diff — finite-difference gradient fallback.
//!
//! Used by the adapter when an objective returns
//! [`OptError::GradientNotImplemented`](crate::optimization::errors::OptError::GradientNotImplemented).
//!
//! - Central differences first.
//! - If any cost evaluation inside the difference stencil failed, or the
//!   central gradient fails validation, retry once with forward
//!   differences.
//! - Errors raised by the cost are captured into a shared slot (the
//!   `finitediff` closures must return `f64`) and surfaced after the sweep.
use std::cell::RefCell;

use argmin::core::Error;
use finitediff::FiniteDiff;

use crate::optimization::trainer::{
    types::{Grad, Theta},
    validation::validate_grad,
};

/// Finite-difference gradient of `cost` at `theta`.
///
/// # Errors
/// - The first error raised by `cost` during the forward sweep.
/// - Validation errors if the forward gradient is not finite.
pub fn fd_gradient<C>(theta: &Theta, cost: C) -> Result<Grad, Error>
where
    C: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost_func = |theta: &Theta| -> f64 {
        match cost(theta) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };

    let central = theta.central_diff(&cost_func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, &cost_func, &closure_err)
}

/// Forward-difference gradient with error capture.
///
/// Clears `closure_err`, runs the sweep, returns the captured error if any,
/// then validates.
fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}
