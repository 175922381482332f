//! Map configuration: basis family, positivity transform, diagonal terms,
//! and inversion tolerances.
//!
//! All option structs are validated on construction and provide `Default`;
//! enums parse case-insensitively from strings.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    basis::BasisType,
    map::errors::{MapError, MapResult},
    optimization::numerical_stability::{safe_log_softplus, safe_logistic, safe_softplus},
};

/// Transform keeping diagonal weights strictly positive.
///
/// Parsing accepts case-insensitive `"Exp"` and `"SoftPlus"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PosFuncType {
    Exp,
    #[default]
    SoftPlus,
}

impl PosFuncType {
    /// `(pos(w), pos'(w))`.
    pub fn eval_with_derivative(&self, w: f64) -> (f64, f64) {
        match self {
            PosFuncType::Exp => {
                let e = w.exp();
                (e, e)
            }
            PosFuncType::SoftPlus => (safe_softplus(w), safe_logistic(w)),
        }
    }

    pub fn eval(&self, w: f64) -> f64 {
        match self {
            PosFuncType::Exp => w.exp(),
            PosFuncType::SoftPlus => safe_softplus(w),
        }
    }

    /// `(ln pos(w), ln pos'(w))`, finite where `pos` itself underflows.
    pub fn ln_eval_with_derivative(&self, w: f64) -> (f64, f64) {
        match self {
            PosFuncType::Exp => (w, w),
            // ln logistic(w) = −softplus(−w)
            PosFuncType::SoftPlus => (safe_log_softplus(w), -safe_softplus(-w)),
        }
    }
}

impl FromStr for PosFuncType {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exp" => Ok(PosFuncType::Exp),
            "softplus" => Ok(PosFuncType::SoftPlus),
            _ => Err(MapError::InvalidOption {
                name: "pos_func_type",
                value: s.to_string(),
                reason: "Valid options are case insensitive 'Exp' or 'SoftPlus'.",
            }),
        }
    }
}

/// Tolerances for the per-column monotone root find used by `inverse`.
///
/// - `xtol`: stop when the step is below `xtol · (1 + |y|)`.
/// - `ftol`: stop when `|T(y) − r| <= ftol`.
/// - `max_iter`: Newton/bisection iteration budget per column.
/// - `max_bracket_expansions`: doublings of the initial `[−1, 1]` bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverseOptions {
    pub xtol: f64,
    pub ftol: f64,
    pub max_iter: usize,
    pub max_bracket_expansions: usize,
}

impl InverseOptions {
    /// # Errors
    /// - [`MapError::InvalidOption`] for non-finite or non-positive
    ///   tolerances, or a zero iteration budget.
    pub fn new(
        xtol: f64, ftol: f64, max_iter: usize, max_bracket_expansions: usize,
    ) -> MapResult<Self> {
        verify_positive("xtol", xtol)?;
        verify_positive("ftol", ftol)?;
        if max_iter == 0 {
            return Err(MapError::InvalidOption {
                name: "max_iter",
                value: max_iter.to_string(),
                reason: "Inverse iteration budget must be greater than zero.",
            });
        }
        Ok(InverseOptions { xtol, ftol, max_iter, max_bracket_expansions })
    }
}

impl Default for InverseOptions {
    fn default() -> Self {
        InverseOptions { xtol: 1e-12, ftol: 1e-10, max_iter: 100, max_bracket_expansions: 60 }
    }
}

/// Options consumed by the map factory.
///
/// Default:
/// - `basis_type`: `ProbabilistHermite`
/// - `pos_func_type`: `SoftPlus`
/// - `diag_terms`: `1` (the diagonal is `pos(w_0) · x_d`)
/// - `inverse`: [`InverseOptions::default`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    pub basis_type: BasisType,
    pub pos_func_type: PosFuncType,
    pub diag_terms: usize,
    pub inverse: InverseOptions,
}

impl MapOptions {
    /// # Errors
    /// - [`MapError::InvalidOption`] if `diag_terms == 0`.
    pub fn new(
        basis_type: BasisType, pos_func_type: PosFuncType, diag_terms: usize,
        inverse: InverseOptions,
    ) -> MapResult<Self> {
        if diag_terms == 0 {
            return Err(MapError::InvalidOption {
                name: "diag_terms",
                value: diag_terms.to_string(),
                reason: "At least one diagonal term is required for monotonicity.",
            });
        }
        Ok(MapOptions { basis_type, pos_func_type, diag_terms, inverse })
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            basis_type: BasisType::default(),
            pos_func_type: PosFuncType::default(),
            diag_terms: 1,
            inverse: InverseOptions::default(),
        }
    }
}

fn verify_positive(name: &'static str, value: f64) -> MapResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MapError::InvalidOption {
            name,
            value: value.to_string(),
            reason: "Tolerance must be finite and strictly positive.",
        });
    }
    Ok(())
}
