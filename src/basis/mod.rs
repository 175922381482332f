//! basis — univariate orthogonal polynomial families for map expansions.
//!
//! Purpose
//! -------
//! Supply the 1-D polynomials `H_k` that tensor-product terms
//! `Ψ_α(x) = Π_i H_{α_i}(x_i)` are built from, together with their first
//! derivatives evaluated in one sweep.
//!
//! Key behaviors
//! -------------
//! - Every family is defined by a three-term recurrence
//!   `p_{k+1}(x) = (a_k x + b_k) p_k(x) − c_k p_{k−1}(x)`, `p_0 = 1`,
//!   `p_{−1} = 0`. Derivatives follow by differentiating the recurrence, so
//!   a family only supplies its coefficients.
//! - "All orders" methods fill caller-provided slices, one entry per order
//!   `0..len`, so hot loops in the map kernels reuse scratch buffers.
//!
//! Conventions
//! -----------
//! - Orders are `u32`, matching multi-index components.
//! - When several output slices are passed, the shortest one sets the
//!   highest order filled.

pub mod hermite;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::map::errors::MapError;

pub use self::hermite::{PhysicistHermite, ProbabilistHermite};

/// Three-term-recurrence polynomial family.
pub trait OrthogonalPolynomial {
    /// Recurrence coefficients `(a_k, b_k, c_k)` producing `p_{k+1}` from
    /// `p_k` and `p_{k−1}`.
    fn recurrence(&self, k: u32) -> (f64, f64, f64);

    /// `p_order(x)`.
    fn evaluate(&self, order: u32, x: f64) -> f64 {
        let (mut prev, mut curr) = (0.0, 1.0);
        for k in 0..order {
            let (a, b, c) = self.recurrence(k);
            let next = (a * x + b) * curr - c * prev;
            prev = curr;
            curr = next;
        }
        curr
    }

    /// `p_0(x), …, p_{len−1}(x)` into `vals`.
    fn evaluate_all(&self, vals: &mut [f64], x: f64) {
        let n = vals.len();
        if n == 0 {
            return;
        }
        vals[0] = 1.0;
        for k in 1..n {
            let (a, b, c) = self.recurrence(k as u32 - 1);
            let before = if k >= 2 { vals[k - 2] } else { 0.0 };
            vals[k] = (a * x + b) * vals[k - 1] - c * before;
        }
    }

    /// `p'_order(x)`.
    fn derivative(&self, order: u32, x: f64) -> f64 {
        let (mut prev, mut curr) = (0.0, 1.0);
        let (mut dprev, mut dcurr) = (0.0, 0.0);
        for k in 0..order {
            let (a, b, c) = self.recurrence(k);
            let next = (a * x + b) * curr - c * prev;
            let dnext = a * curr + (a * x + b) * dcurr - c * dprev;
            prev = curr;
            curr = next;
            dprev = dcurr;
            dcurr = dnext;
        }
        dcurr
    }

    /// Values and first derivatives for orders `0..min(vals.len(), derivs.len())`.
    fn evaluate_derivatives(&self, vals: &mut [f64], derivs: &mut [f64], x: f64) {
        let n = vals.len().min(derivs.len());
        if n == 0 {
            return;
        }
        vals[0] = 1.0;
        derivs[0] = 0.0;
        for k in 1..n {
            let (a, b, c) = self.recurrence(k as u32 - 1);
            let (before, dbefore) = if k >= 2 { (vals[k - 2], derivs[k - 2]) } else { (0.0, 0.0) };
            vals[k] = (a * x + b) * vals[k - 1] - c * before;
            derivs[k] = a * vals[k - 1] + (a * x + b) * derivs[k - 1] - c * dbefore;
        }
    }
}

/// Polynomial family used by coefficient-bearing components.
///
/// Parsing is case-insensitive: `"ProbabilistHermite"` (also `"hermite"`)
/// and `"PhysicistHermite"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BasisType {
    #[default]
    ProbabilistHermite,
    PhysicistHermite,
}

impl OrthogonalPolynomial for BasisType {
    fn recurrence(&self, k: u32) -> (f64, f64, f64) {
        match self {
            BasisType::ProbabilistHermite => ProbabilistHermite.recurrence(k),
            BasisType::PhysicistHermite => PhysicistHermite.recurrence(k),
        }
    }
}

impl FromStr for BasisType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "probabilisthermite" | "hermite" => Ok(BasisType::ProbabilistHermite),
            "physicisthermite" => Ok(BasisType::PhysicistHermite),
            _ => Err(MapError::InvalidOption {
                name: "basis_type",
                value: s.to_string(),
                reason: "Valid options are case insensitive 'ProbabilistHermite' or 'PhysicistHermite'.",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_type_parses_case_insensitively() {
        assert_eq!("HERMITE".parse::<BasisType>().unwrap(), BasisType::ProbabilistHermite);
        assert_eq!("physicistHermite".parse::<BasisType>().unwrap(), BasisType::PhysicistHermite);
        assert!(matches!(
            "legendre".parse::<BasisType>(),
            Err(MapError::InvalidOption { name: "basis_type", .. })
        ));
    }

    #[test]
    fn enum_dispatch_matches_concrete_family() {
        for x in [-0.7, 0.0, 1.3] {
            for k in 0..6 {
                assert_eq!(
                    BasisType::PhysicistHermite.evaluate(k, x),
                    PhysicistHermite.evaluate(k, x)
                );
            }
        }
    }
}
