//! IdentityMap — coefficient-free component copying its trailing block.
//!
//! `T(x) = x_{N−M:N}`. The Jacobian block is the identity, so the
//! log-determinant and its input gradient vanish. The map has no
//! coefficients, so coefficient adjoints are unsupported rather than empty.
use ndarray::{s, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::map::{
    component::ConditionalMap,
    errors::{MapError, MapResult},
    validation::check_dims,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityMap {
    input_dim: usize,
    output_dim: usize,
}

impl IdentityMap {
    /// # Errors
    /// - [`MapError::OutputExceedsInput`] if `output_dim > input_dim`.
    pub fn new(input_dim: usize, output_dim: usize) -> MapResult<Self> {
        check_dims(input_dim, output_dim)?;
        Ok(IdentityMap { input_dim, output_dim })
    }

    fn leading(&self) -> usize {
        self.input_dim - self.output_dim
    }
}

impl ConditionalMap for IdentityMap {
    fn name(&self) -> &'static str {
        "IdentityMap"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn num_coeffs(&self) -> usize {
        0
    }

    fn evaluate_impl(
        &self, _coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.assign(&pts.slice(s![self.leading().., ..]));
        Ok(())
    }

    fn log_determinant_impl(
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, mut out: ArrayViewMut1<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        Ok(())
    }

    fn inverse_impl(
        &self, _coeffs: ArrayView1<f64>, _x1: ArrayView2<f64>, r: ArrayView2<f64>,
        mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.assign(&r);
        Ok(())
    }

    fn gradient_impl(
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, sens: ArrayView2<f64>,
        mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        let leading = self.leading();
        out.slice_mut(s![..leading, ..]).fill(0.0);
        out.slice_mut(s![leading.., ..]).assign(&sens);
        Ok(())
    }

    fn coeff_grad_impl(
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, _sens: ArrayView2<f64>,
        _out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        Err(MapError::UnsupportedCapability { map: self.name(), operation: "coeff_grad" })
    }

    fn log_determinant_coeff_grad_impl(
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, _out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        Err(MapError::UnsupportedCapability {
            map: self.name(),
            operation: "log_determinant_coeff_grad",
        })
    }

    fn log_determinant_input_grad_impl(
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        Ok(())
    }
}
