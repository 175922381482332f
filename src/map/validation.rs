//! Shape and length checks shared by the validated map entry points.
//!
//! Every public map operation runs these before dispatching to a kernel, so
//! kernels may index their inputs without further checks.
use ndarray::{ArrayView1, ArrayView2};

use crate::map::errors::{MapError, MapResult};

/// Require `arr.nrows() == expected`.
pub fn check_rows(what: &'static str, arr: &ArrayView2<f64>, expected: usize) -> MapResult<()> {
    if arr.nrows() != expected {
        return Err(MapError::DimensionMismatch { what, expected, found: arr.nrows() });
    }
    Ok(())
}

/// Require `arr.ncols() == expected`.
pub fn check_cols(what: &'static str, arr: &ArrayView2<f64>, expected: usize) -> MapResult<()> {
    if arr.ncols() != expected {
        return Err(MapError::DimensionMismatch { what, expected, found: arr.ncols() });
    }
    Ok(())
}

/// Require a coefficient view of exactly `expected` entries.
pub fn check_coeff_len(coeffs: &ArrayView1<f64>, expected: usize) -> MapResult<()> {
    if coeffs.len() != expected {
        return Err(MapError::CoeffLengthMismatch { expected, found: coeffs.len() });
    }
    Ok(())
}

/// Require `output_dim <= input_dim`.
pub fn check_dims(input_dim: usize, output_dim: usize) -> MapResult<()> {
    if output_dim > input_dim {
        return Err(MapError::OutputExceedsInput { input_dim, output_dim });
    }
    Ok(())
}
