//! Hermite polynomial families.
//!
//! - [`ProbabilistHermite`]: `He_{k+1} = x He_k − k He_{k−1}`, orthogonal
//!   under the standard normal density.
//! - [`PhysicistHermite`]: `H_{k+1} = 2x H_k − 2k H_{k−1}`, orthogonal under
//!   `exp(−x²)`.
use crate::basis::OrthogonalPolynomial;

/// Probabilists' Hermite polynomials `He_k`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbabilistHermite;

/// Physicists' Hermite polynomials `H_k`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicistHermite;

impl OrthogonalPolynomial for ProbabilistHermite {
    fn recurrence(&self, k: u32) -> (f64, f64, f64) {
        (1.0, 0.0, k as f64)
    }
}

impl OrthogonalPolynomial for PhysicistHermite {
    fn recurrence(&self, k: u32) -> (f64, f64, f64) {
        (2.0, 0.0, 2.0 * k as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Closed-form checks for orders 0..=4 on a small grid, through both the
    // single-order and the all-orders entry points.
    // -------------------------------------------------------------------------

    const XS: [f64; 5] = [-1.0, -0.5, 0.0, 0.1, 1.0];
    const TOL: f64 = 1e-14;

    fn he(x: f64) -> [f64; 5] {
        [1.0, x, x * x - 1.0, x * x * x - 3.0 * x, x.powi(4) - 6.0 * x * x + 3.0]
    }

    fn he_d1(x: f64) -> [f64; 5] {
        [0.0, 1.0, 2.0 * x, 3.0 * x * x - 3.0, 4.0 * x.powi(3) - 12.0 * x]
    }

    #[test]
    // Purpose
    // -------
    // Probabilist Hermite values match `1, x, x²−1, x³−3x, x⁴−6x²+3`.
    fn probabilist_values_match_closed_form() {
        let poly = ProbabilistHermite;
        let mut all = [0.0; 5];
        for x in XS {
            let expected = he(x);
            poly.evaluate_all(&mut all, x);
            for k in 0..5 {
                assert_relative_eq!(poly.evaluate(k as u32, x), expected[k], epsilon = TOL);
                assert_relative_eq!(all[k], expected[k], epsilon = TOL);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // First derivatives agree through `derivative` and `evaluate_derivatives`.
    fn probabilist_first_derivatives_match_closed_form() {
        let poly = ProbabilistHermite;
        let (mut vals, mut derivs) = ([0.0; 5], [0.0; 5]);
        for x in XS {
            let (v, d) = (he(x), he_d1(x));
            poly.evaluate_derivatives(&mut vals, &mut derivs, x);
            for k in 0..5 {
                assert_relative_eq!(poly.derivative(k as u32, x), d[k], epsilon = TOL);
                assert_relative_eq!(vals[k], v[k], epsilon = TOL);
                assert_relative_eq!(derivs[k], d[k], epsilon = TOL);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Physicist Hermite values match `1, 2x, 4x²−2, 8x³−12x, 16x⁴−48x²+12`.
    fn physicist_values_match_closed_form() {
        let poly = PhysicistHermite;
        let mut all = [0.0; 5];
        for x in XS {
            let expected = [
                1.0,
                2.0 * x,
                4.0 * x * x - 2.0,
                8.0 * x.powi(3) - 12.0 * x,
                16.0 * x.powi(4) - 48.0 * x * x + 12.0,
            ];
            poly.evaluate_all(&mut all, x);
            for k in 0..5 {
                assert_relative_eq!(poly.evaluate(k as u32, x), expected[k], epsilon = TOL);
                assert_relative_eq!(all[k], expected[k], epsilon = TOL);
            }
        }
    }

    #[test]
    fn physicist_derivative_is_2k_times_previous_order() {
        let poly = PhysicistHermite;
        for x in XS {
            for k in 1..6u32 {
                let expected = 2.0 * k as f64 * poly.evaluate(k - 1, x);
                assert_relative_eq!(poly.derivative(k, x), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn empty_output_slices_are_left_untouched() {
        let mut vals: [f64; 0] = [];
        ProbabilistHermite.evaluate_all(&mut vals, 0.3);
        let mut d1 = [7.0; 3];
        ProbabilistHermite.evaluate_derivatives(&mut vals, &mut d1, 0.3);
        assert_eq!(d1, [7.0; 3]);
    }
}
