//! ConditionalMap — capability trait for map components.
//!
//! Purpose
//! -------
//! Describe a conditional map `T: ℝ^N → ℝ^M` (`M <= N`) whose last `M`
//! inputs form the block it is invertible in. Triangular maps chain
//! components through this trait; training and objectives see maps only
//! through it.
//!
//! Key behaviors
//! -------------
//! - Implementors provide `*_impl` kernels. Kernels receive the coefficient
//!   slice explicitly and write into a pre-shaped output; they never own
//!   coefficient storage.
//! - The provided methods (`evaluate`, `log_determinant`, `gradient`, …)
//!   validate coefficient length, row counts, and column agreement, allocate
//!   the output, and dispatch to the kernel.
//! - Optional capabilities default to
//!   [`MapError::UnsupportedCapability`]; a component that cannot produce a
//!   quantity says so instead of writing zeros.
//!
//! Invariants & assumptions
//! ------------------------
//! - Points are column-major batches: shape `(dim, n_pts)`, one sample per
//!   column.
//! - Kernels may assume the shapes checked by the provided methods:
//!   `pts` is `(N, n)`, `sens` is `(M, n)`, `x1` is `(N − M, n)`, `r` is
//!   `(M, n)`, and `coeffs.len() == num_coeffs()`.
//! - Kernels are `&self`: evaluation never mutates a component, so batches
//!   can be processed in parallel and coefficient updates (`&mut`) cannot
//!   overlap with evaluation.
//!
//! Conventions
//! -----------
//! - `gradient` is the adjoint with respect to inputs:
//!   `out[:, i] = (∇ₓT(x_i))ᵀ sens[:, i]`.
//! - `coeff_grad` is the adjoint with respect to coefficients:
//!   `out[:, i] = (∇_c T(x_i))ᵀ sens[:, i]`, shape `(num_coeffs, n)`.
//! - `log_determinant` is `ln det ∂T_{N−M+1:N}/∂x_{N−M+1:N}` per column.
use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::map::{
    errors::{MapError, MapResult},
    validation::{check_coeff_len, check_cols, check_rows},
};

/// Block-invertible conditional map with externally owned coefficients.
pub trait ConditionalMap: fmt::Debug + Send + Sync {
    // ---- Metadata ----
    /// Short type name used in error messages.
    fn name(&self) -> &'static str;
    fn input_dim(&self) -> usize;
    fn output_dim(&self) -> usize;
    fn num_coeffs(&self) -> usize;

    /// Coefficient indices acting on the diagonal of the Jacobian block.
    fn diagonal_coeff_indices(&self) -> Vec<usize> {
        Vec::new()
    }

    /// Hook run after the owner replaces the coefficient buffer.
    fn wrap_coeffs(&mut self) {}

    // ---- Required kernels ----
    fn evaluate_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, out: ArrayViewMut2<f64>,
    ) -> MapResult<()>;

    fn log_determinant_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, out: ArrayViewMut1<f64>,
    ) -> MapResult<()>;

    fn inverse_impl(
        &self, coeffs: ArrayView1<f64>, x1: ArrayView2<f64>, r: ArrayView2<f64>,
        out: ArrayViewMut2<f64>,
    ) -> MapResult<()>;

    // ---- Optional kernels ----
    fn gradient_impl(
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, _sens: ArrayView2<f64>,
        _out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        Err(MapError::UnsupportedCapability { map: self.name(), operation: "gradient" })
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
        &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, _out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        Err(MapError::UnsupportedCapability {
            map: self.name(),
            operation: "log_determinant_input_grad",
        })
    }

    // ---- Validated entry points ----

    /// `T(pts)`, shape `(M, n)`.
    fn evaluate(&self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("pts", &pts, self.input_dim())?;
        let mut out = Array2::zeros((self.output_dim(), pts.ncols()));
        self.evaluate_impl(coeffs, pts, out.view_mut())?;
        Ok(out)
    }

    /// Per-column log-determinant of the diagonal Jacobian block.
    fn log_determinant(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>,
    ) -> MapResult<Array1<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("pts", &pts, self.input_dim())?;
        let mut out = Array1::zeros(pts.ncols());
        self.log_determinant_impl(coeffs, pts, out.view_mut())?;
        Ok(out)
    }

    /// Input adjoint, shape `(N, n)`.
    fn gradient(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
    ) -> MapResult<Array2<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("pts", &pts, self.input_dim())?;
        check_rows("sens", &sens, self.output_dim())?;
        check_cols("sens", &sens, pts.ncols())?;
        let mut out = Array2::zeros((self.input_dim(), pts.ncols()));
        self.gradient_impl(coeffs, pts, sens, out.view_mut())?;
        Ok(out)
    }

    /// Coefficient adjoint, shape `(num_coeffs, n)`.
    fn coeff_grad(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
    ) -> MapResult<Array2<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("pts", &pts, self.input_dim())?;
        check_rows("sens", &sens, self.output_dim())?;
        check_cols("sens", &sens, pts.ncols())?;
        let mut out = Array2::zeros((self.num_coeffs(), pts.ncols()));
        self.coeff_grad_impl(coeffs, pts, sens, out.view_mut())?;
        Ok(out)
    }

    /// Solve `T(x1, y) = r` for the trailing block `y`, shape `(M, n)`.
    fn inverse(
        &self, coeffs: ArrayView1<f64>, x1: ArrayView2<f64>, r: ArrayView2<f64>,
    ) -> MapResult<Array2<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("x1", &x1, self.input_dim().saturating_sub(self.output_dim()))?;
        check_rows("r", &r, self.output_dim())?;
        if self.input_dim() > self.output_dim() {
            check_cols("x1", &x1, r.ncols())?;
        }
        let mut out = Array2::zeros((self.output_dim(), r.ncols()));
        self.inverse_impl(coeffs, x1, r, out.view_mut())?;
        Ok(out)
    }

    /// Gradient of the log-determinant w.r.t. coefficients, shape `(num_coeffs, n)`.
    fn log_determinant_coeff_grad(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>,
    ) -> MapResult<Array2<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("pts", &pts, self.input_dim())?;
        let mut out = Array2::zeros((self.num_coeffs(), pts.ncols()));
        self.log_determinant_coeff_grad_impl(coeffs, pts, out.view_mut())?;
        Ok(out)
    }

    /// Gradient of the log-determinant w.r.t. inputs, shape `(N, n)`.
    fn log_determinant_input_grad(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>,
    ) -> MapResult<Array2<f64>> {
        check_coeff_len(&coeffs, self.num_coeffs())?;
        check_rows("pts", &pts, self.input_dim())?;
        let mut out = Array2::zeros((self.input_dim(), pts.ncols()));
        self.log_determinant_input_grad_impl(coeffs, pts, out.view_mut())?;
        Ok(out)
    }
}

// Boxed components (heterogeneous chains) forward every overridable method.
impl<T: ConditionalMap + ?Sized> ConditionalMap for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn input_dim(&self) -> usize {
        (**self).input_dim()
    }

    fn output_dim(&self) -> usize {
        (**self).output_dim()
    }

    fn num_coeffs(&self) -> usize {
        (**self).num_coeffs()
    }

    fn diagonal_coeff_indices(&self) -> Vec<usize> {
        (**self).diagonal_coeff_indices()
    }

    fn wrap_coeffs(&mut self) {
        (**self).wrap_coeffs()
    }

    fn evaluate_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        (**self).evaluate_impl(coeffs, pts, out)
    }

    fn log_determinant_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, out: ArrayViewMut1<f64>,
    ) -> MapResult<()> {
        (**self).log_determinant_impl(coeffs, pts, out)
    }

    fn inverse_impl(
        &self, coeffs: ArrayView1<f64>, x1: ArrayView2<f64>, r: ArrayView2<f64>,
        out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        (**self).inverse_impl(coeffs, x1, r, out)
    }

    fn gradient_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
        out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        (**self).gradient_impl(coeffs, pts, sens, out)
    }

    fn coeff_grad_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
        out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        (**self).coeff_grad_impl(coeffs, pts, sens, out)
    }

    fn log_determinant_coeff_grad_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        (**self).log_determinant_coeff_grad_impl(coeffs, pts, out)
    }

    fn log_determinant_input_grad_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        (**self).log_determinant_input_grad_impl(coeffs, pts, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Optional kernels report `UnsupportedCapability` with the map's name.
    // - The validated entry points reject bad coefficient lengths before
    //   reaching a kernel.
    // - `Box<dyn ConditionalMap>` forwards metadata and kernels.
    // -------------------------------------------------------------------------

    /// `T(x) = x + c`, implementing only the required kernels.
    #[derive(Debug)]
    struct Shift;

    impl ConditionalMap for Shift {
        fn name(&self) -> &'static str {
            "Shift"
        }

        fn input_dim(&self) -> usize {
            1
        }

        fn output_dim(&self) -> usize {
            1
        }

        fn num_coeffs(&self) -> usize {
            1
        }

        fn evaluate_impl(
            &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, mut out: ArrayViewMut2<f64>,
        ) -> MapResult<()> {
            out.assign(&pts.mapv(|x| x + coeffs[0]));
            Ok(())
        }

        fn log_determinant_impl(
            &self, _coeffs: ArrayView1<f64>, _pts: ArrayView2<f64>, mut out: ArrayViewMut1<f64>,
        ) -> MapResult<()> {
            out.fill(0.0);
            Ok(())
        }

        fn inverse_impl(
            &self, coeffs: ArrayView1<f64>, _x1: ArrayView2<f64>, r: ArrayView2<f64>,
            mut out: ArrayViewMut2<f64>,
        ) -> MapResult<()> {
            out.assign(&r.mapv(|y| y - coeffs[0]));
            Ok(())
        }
    }

    fn unsupported(err: MapError) -> &'static str {
        match err {
            MapError::UnsupportedCapability { map: "Shift", operation } => operation,
            other => panic!("expected UnsupportedCapability, got {other}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A component without optional kernels refuses them instead of writing
    // zeros.
    fn optional_kernels_default_to_unsupported() {
        let c = array![0.5];
        let pts = array![[1.0, 2.0]];
        let sens = array![[1.0, 1.0]];

        assert_eq!(
            unsupported(Shift.gradient(c.view(), pts.view(), sens.view()).unwrap_err()),
            "gradient"
        );
        assert_eq!(
            unsupported(Shift.coeff_grad(c.view(), pts.view(), sens.view()).unwrap_err()),
            "coeff_grad"
        );
        assert_eq!(
            unsupported(Shift.log_determinant_coeff_grad(c.view(), pts.view()).unwrap_err()),
            "log_determinant_coeff_grad"
        );
        assert_eq!(
            unsupported(Shift.log_determinant_input_grad(c.view(), pts.view()).unwrap_err()),
            "log_determinant_input_grad"
        );
        assert!(Shift.diagonal_coeff_indices().is_empty());
    }

    #[test]
    fn entry_points_check_coefficient_length() {
        let err = Shift.evaluate(array![0.5, 1.0].view(), array![[1.0]].view()).unwrap_err();
        assert_eq!(err, MapError::CoeffLengthMismatch { expected: 1, found: 2 });
    }

    #[test]
    // Purpose
    // -------
    // A boxed trait object behaves exactly like the component it holds.
    fn boxed_component_forwards_everything() {
        let boxed: Box<dyn ConditionalMap> = Box::new(Shift);
        let c = array![0.5];
        let pts = array![[1.0, -2.0]];

        assert_eq!(boxed.name(), "Shift");
        assert_eq!((boxed.input_dim(), boxed.output_dim(), boxed.num_coeffs()), (1, 1, 1));

        let y = boxed.evaluate(c.view(), pts.view()).unwrap();
        assert_eq!(y, array![[1.5, -1.5]]);
        assert_eq!(boxed.log_determinant(c.view(), pts.view()).unwrap(), array![0.0, 0.0]);

        let empty = Array2::<f64>::zeros((0, 2));
        let back = boxed.inverse(c.view(), empty.view(), y.view()).unwrap();
        assert_eq!(back, pts);

        let sens = array![[1.0, 1.0]];
        assert_eq!(
            unsupported(boxed.gradient(c.view(), pts.view(), sens.view()).unwrap_err()),
            "gradient"
        );
    }
}
