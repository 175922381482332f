//! KL-divergence objective for fitting a map from samples.
//!
//! Given samples `x_i` of a target, a map `T` pushing the target to the
//! standard normal reference `η` is fit by minimizing the sample estimate of
//! `KL(π ‖ T^♯ η)` up to a constant:
//!
//! ```text
//! J(θ)  = −(1/n) Σ_i [ Σ_j ln φ(T_j(x_i; θ)) + ln det ∇T(x_i; θ) ]
//! ∇J(θ) =  (1/n) Σ_i [ ∂_θ T(x_i)ᵀ T(x_i) − ∂_θ ln det ∇T(x_i) ]
//! ```
//!
//! The first gradient term is the map's coefficient adjoint with
//! sensitivity `T(x_i)` (since `∂ ln φ(z)/∂z = −z`).
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use statrs::distribution::{Continuous, Normal};

use crate::{
    map::{ConditionalMap, ParameterizedMap},
    optimization::{
        errors::{OptError, OptResult},
        trainer::{
            traits::MapObjective,
            types::{Cost, Grad, Theta},
        },
    },
};

#[derive(Debug, Clone)]
pub struct KLObjective {
    train: Array2<f64>,
    test: Option<Array2<f64>>,
    reference: Normal,
}

impl KLObjective {
    /// Objective over `train` samples, shape `(dim, n)`, with optional
    /// held-out `test` samples of the same dimension.
    ///
    /// # Errors
    /// - [`OptError::InvalidSamples`] for empty or non-finite sample sets, or
    ///   a test set whose dimension differs from the training set.
    pub fn new(train: Array2<f64>, test: Option<Array2<f64>>) -> OptResult<Self> {
        validate_samples(train.view())?;
        if let Some(test) = &test {
            validate_samples(test.view())?;
            if test.nrows() != train.nrows() {
                return Err(OptError::InvalidSamples {
                    reason: "Test samples must have the same dimension as training samples.",
                });
            }
        }
        let reference =
            Normal::new(0.0, 1.0).map_err(|e| OptError::BackendError { text: e.to_string() })?;
        Ok(Self { train, test, reference })
    }

    pub fn train_samples(&self) -> ArrayView2<'_, f64> {
        self.train.view()
    }

    pub fn test_samples(&self) -> Option<ArrayView2<'_, f64>> {
        self.test.as_ref().map(|t| t.view())
    }

    /// Objective value of `map` (with its current coefficients) on the
    /// training samples.
    pub fn train_error<M: ConditionalMap>(&self, map: &ParameterizedMap<M>) -> OptResult<f64> {
        self.value(map.map(), map.coeff_view()?, self.train.view())
    }

    /// Objective value of `map` on the test samples.
    ///
    /// # Errors
    /// - [`OptError::InvalidSamples`] if no test set was supplied.
    pub fn test_error<M: ConditionalMap>(&self, map: &ParameterizedMap<M>) -> OptResult<f64> {
        let test = self.test.as_ref().ok_or(OptError::InvalidSamples {
            reason: "No test samples were supplied.",
        })?;
        self.value(map.map(), map.coeff_view()?, test.view())
    }

    fn value(
        &self, map: &dyn ConditionalMap, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>,
    ) -> OptResult<Cost> {
        let pushed = map.evaluate(coeffs, pts)?;
        self.value_from_pushed(map, coeffs, pts, &pushed)
    }

    fn value_from_pushed(
        &self, map: &dyn ConditionalMap, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>,
        pushed: &Array2<f64>,
    ) -> OptResult<Cost> {
        let log_det = map.log_determinant(coeffs, pts)?;
        let ref_ll: f64 = pushed.iter().map(|&z| self.reference.ln_pdf(z)).sum();
        Ok(-(ref_ll + log_det.sum()) / pts.ncols() as f64)
    }
}

impl MapObjective for KLObjective {
    fn objective(
        &self, map: &dyn ConditionalMap, coeffs: &Theta, grad: Option<&mut Grad>,
    ) -> OptResult<Cost> {
        let pts = self.train.view();
        let pushed = map.evaluate(coeffs.view(), pts)?;
        let value = self.value_from_pushed(map, coeffs.view(), pts, &pushed)?;
        if let Some(grad) = grad {
            let n = pts.ncols() as f64;
            let push_grad = map.coeff_grad(coeffs.view(), pts, pushed.view())?;
            let det_grad = map.log_determinant_coeff_grad(coeffs.view(), pts)?;
            grad.assign(&((push_grad - det_grad).sum_axis(Axis(1)) / n));
        }
        Ok(value)
    }

    fn check(&self, map: &dyn ConditionalMap, _coeffs: &Theta) -> OptResult<()> {
        if map.input_dim() != self.train.nrows() {
            return Err(OptError::InvalidSamples {
                reason: "Sample dimension must match the map input dimension.",
            });
        }
        Ok(())
    }
}

fn validate_samples(pts: ArrayView2<f64>) -> OptResult<()> {
    if pts.nrows() == 0 || pts.ncols() == 0 {
        return Err(OptError::InvalidSamples { reason: "Sample sets must be non-empty." });
    }
    if pts.iter().any(|v| !v.is_finite()) {
        return Err(OptError::InvalidSamples { reason: "Samples must be finite." });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{create_triangular, MapOptions, MonotonePolynomialMap};
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};
    use std::f64::consts::PI;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Closed-form value for an affine 1-D map.
    // - Analytic gradient against central finite differences on a 2-D
    //   triangular map.
    // - Sample validation and train/test errors.
    // -------------------------------------------------------------------------

    fn affine_component(shift: f64, w0: f64) -> ParameterizedMap<MonotonePolynomialMap> {
        let comp = MonotonePolynomialMap::total_order(1, 0, &MapOptions::default()).unwrap();
        ParameterizedMap::with_coeffs(comp, array![shift, w0]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // For `T(x) = c + s·x` the objective is
    // `½ mean(T²) + ½ ln 2π − ln s`.
    fn affine_map_value_matches_closed_form() {
        let train = array![[-1.0, 0.0, 0.5, 2.0]];
        let kl = KLObjective::new(train.clone(), None).unwrap();
        let map = affine_component(0.3, 0.7);

        let s = MapOptions::default().pos_func_type.eval(0.7);
        let pushed = train.row(0).mapv(|x| 0.3 + s * x);
        let expected = 0.5 * pushed.mapv(|z| z * z).mean().unwrap() + 0.5 * (2.0 * PI).ln() - s.ln();

        assert_relative_eq!(kl.train_error(&map).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient matches central differences of the value.
    //
    // Given
    // -----
    // - A 2-D triangular map of total order 2 with varied coefficients.
    // - Five fixed training points.
    fn gradient_matches_finite_differences() {
        let mut map = create_triangular(2, 2, 2, &MapOptions::default()).unwrap();
        let n = map.num_coeffs();
        let theta = Array1::from_iter((0..n).map(|i| 0.2 + 0.1 * ((i % 5) as f64) - 0.05 * i as f64));
        map.set_coeffs(theta.view()).unwrap();
        let train = array![[-1.2, -0.3, 0.1, 0.8, 1.5], [0.4, -0.9, 1.1, 0.0, -0.6]];
        let kl = KLObjective::new(train, None).unwrap();

        let mut grad = Array1::zeros(n);
        kl.objective(map.map(), &theta, Some(&mut grad)).unwrap();

        let h = 1e-6;
        for k in 0..n {
            let (mut up, mut down) = (theta.clone(), theta.clone());
            up[k] += h;
            down[k] -= h;
            let fd = (kl.objective(map.map(), &up, None).unwrap()
                - kl.objective(map.map(), &down, None).unwrap())
                / (2.0 * h);
            assert_relative_eq!(grad[k], fd, epsilon = 1e-6, max_relative = 1e-5);
        }
    }

    #[test]
    fn rejects_bad_samples() {
        assert!(KLObjective::new(Array2::zeros((1, 0)), None).is_err());
        assert!(KLObjective::new(array![[f64::NAN]], None).is_err());
        assert!(KLObjective::new(array![[1.0]], Some(array![[1.0], [2.0]])).is_err());
    }

    #[test]
    fn test_error_requires_test_samples() {
        let map = affine_component(0.0, 0.5);
        let without = KLObjective::new(array![[0.5, -0.5]], None).unwrap();
        assert!(matches!(without.test_error(&map), Err(OptError::InvalidSamples { .. })));

        let with = KLObjective::new(array![[0.5, -0.5]], Some(array![[0.5, -0.5]])).unwrap();
        assert_relative_eq!(with.test_error(&map).unwrap(), with.train_error(&map).unwrap());
    }

    #[test]
    fn check_rejects_dimension_mismatch() {
        let map = affine_component(0.0, 1.0);
        let kl = KLObjective::new(array![[0.0], [1.0]], None).unwrap();
        let theta = map.coeffs().unwrap().to_owned();
        assert!(kl.check(map.map(), &theta).is_err());
    }
}
