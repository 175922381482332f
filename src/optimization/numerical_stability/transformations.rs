//! Numerical stability utilities.
//!
//! Guarded versions of the positivity transforms used by monotone map
//! components. Naïve `ln(1 + exp(x))` overflows for moderate positive `x`
//! and loses precision in the far negative tail; the helpers below switch
//! form at an explicit cutoff (`x > 20.0`) to stay well-conditioned in `f64`.
//!
//! # Provided items
//! - [`SOFTPLUS_CUTOFF`]: threshold above which `softplus(x) ≈ x`.
//! - [`safe_softplus(x)`]: `ln(1 + exp(x))`, ℝ → (0, ∞).
//! - [`safe_log_softplus(x)`]: `ln(softplus(x))`, finite for every finite `x`.
//! - [`safe_logistic(x)`]: `1 / (1 + exp(−x))`, the derivative of softplus.

/// Above this input, `softplus(x)` and `x` agree to `f64` precision.
pub const SOFTPLUS_CUTOFF: f64 = 20.0;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For `x > SOFTPLUS_CUTOFF`, returns `x`.
/// - Otherwise uses `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp().ln_1p() }
}

/// `ln(softplus(x))` without underflow in the negative tail.
///
/// - For `x < −SOFTPLUS_CUTOFF`, uses `ln(ln(1 + u)) = x − u/2 + O(u²)` with
///   `u = exp(x)`, which stays finite where `softplus(x)` rounds to zero.
/// - Otherwise takes the log of [`safe_softplus`].
pub fn safe_log_softplus(x: f64) -> f64 {
    if x < -SOFTPLUS_CUTOFF { x - 0.5 * x.exp() } else { safe_softplus(x).ln() }
}

/// Logistic sigmoid evaluated without overflow in either tail.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
