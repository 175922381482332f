//! ParameterizedMap — a component paired with the coefficient buffer it reads.
//!
//! Purpose
//! -------
//! Own the single coefficient arena of a map. Components are coefficient-free
//! kernels ([`ConditionalMap`]); this wrapper supplies their coefficients on
//! every call and is the only place coefficients are written.
//!
//! Key behaviors
//! -------------
//! - Coefficients start unset (`None`) unless provided at construction.
//!   Operations on an unset map fail with [`MapError::CoefficientsNotSet`],
//!   except for maps with zero coefficients, which always see an empty slice.
//! - [`ParameterizedMap::set_coeffs`] checks the length, copies into the
//!   arena, and calls the component's `wrap_coeffs` hook so composite maps
//!   can re-slice.
//!
//! Invariants & assumptions
//! ------------------------
//! - When set, `coeffs.len() == map.num_coeffs()`.
//! - Reads (`&self`) and writes (`&mut self`) never overlap; no interior
//!   mutability is involved.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::map::{
    component::ConditionalMap,
    errors::{MapError, MapResult},
    validation::check_coeff_len,
};

/// A map together with its (possibly unset) coefficient arena.
#[derive(Debug, Clone)]
pub struct ParameterizedMap<M> {
    map: M,
    coeffs: Option<Array1<f64>>,
}

impl<M: ConditionalMap> ParameterizedMap<M> {
    /// Wrap `map` with unset coefficients.
    pub fn new(map: M) -> Self {
        ParameterizedMap { map, coeffs: None }
    }

    /// Wrap `map` with an initial coefficient vector.
    ///
    /// # Errors
    /// - [`MapError::CoeffLengthMismatch`] if `coeffs.len() != map.num_coeffs()`.
    pub fn with_coeffs(map: M, coeffs: Array1<f64>) -> MapResult<Self> {
        check_coeff_len(&coeffs.view(), map.num_coeffs())?;
        let mut out = ParameterizedMap { map, coeffs: Some(coeffs) };
        out.map.wrap_coeffs();
        Ok(out)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn input_dim(&self) -> usize {
        self.map.input_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.map.output_dim()
    }

    pub fn num_coeffs(&self) -> usize {
        self.map.num_coeffs()
    }

    /// Current coefficients, `None` while unset.
    pub fn coeffs(&self) -> Option<ArrayView1<'_, f64>> {
        self.coeffs.as_ref().map(|c| c.view())
    }

    /// `true` once coefficients have been provided.
    pub fn has_coeffs(&self) -> bool {
        self.coeffs.is_some()
    }

    /// Replace the coefficient vector and notify the component.
    ///
    /// # Errors
    /// - [`MapError::CoeffLengthMismatch`] if the length differs from
    ///   `num_coeffs()`.
    pub fn set_coeffs(&mut self, coeffs: ArrayView1<f64>) -> MapResult<()> {
        check_coeff_len(&coeffs, self.map.num_coeffs())?;
        match self.coeffs.as_mut() {
            Some(buf) => buf.assign(&coeffs),
            None => self.coeffs = Some(coeffs.to_owned()),
        }
        self.map.wrap_coeffs();
        Ok(())
    }

    /// Coefficient slice handed to the kernels.
    pub fn coeff_view(&self) -> MapResult<ArrayView1<'_, f64>> {
        match &self.coeffs {
            Some(c) => Ok(c.view()),
            None if self.map.num_coeffs() == 0 => Ok(ArrayView1::from(&[] as &[f64])),
            None => Err(MapError::CoefficientsNotSet { map: self.map.name() }),
        }
    }

    pub fn evaluate(&self, pts: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.evaluate(self.coeff_view()?, pts)
    }

    pub fn log_determinant(&self, pts: ArrayView2<f64>) -> MapResult<Array1<f64>> {
        self.map.log_determinant(self.coeff_view()?, pts)
    }

    pub fn gradient(&self, pts: ArrayView2<f64>, sens: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.gradient(self.coeff_view()?, pts, sens)
    }

    pub fn coeff_grad(
        &self, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
    ) -> MapResult<Array2<f64>> {
        self.map.coeff_grad(self.coeff_view()?, pts, sens)
    }

    pub fn inverse(&self, x1: ArrayView2<f64>, r: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.inverse(self.coeff_view()?, x1, r)
    }

    pub fn log_determinant_coeff_grad(&self, pts: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.log_determinant_coeff_grad(self.coeff_view()?, pts)
    }

    pub fn log_determinant_input_grad(&self, pts: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.log_determinant_input_grad(self.coeff_view()?, pts)
    }

    /// Split into the component and its coefficients.
    pub fn into_parts(self) -> (M, Option<Array1<f64>>) {
        (self.map, self.coeffs)
    }
}

impl<M: ConditionalMap + 'static> ParameterizedMap<M> {
    /// Erase the component type so it can join a heterogeneous chain.
    pub fn boxed(self) -> ParameterizedMap<Box<dyn ConditionalMap>> {
        ParameterizedMap { map: Box::new(self.map), coeffs: self.coeffs }
    }
}

/// Read-only view of one component of a composite map with the
/// coefficients it currently sees.
#[derive(Debug, Clone, Copy)]
pub struct ComponentView<'a> {
    pub(crate) map: &'a dyn ConditionalMap,
    pub(crate) coeffs: Option<ArrayView1<'a, f64>>,
}

impl<'a> ComponentView<'a> {
    pub fn map(&self) -> &'a dyn ConditionalMap {
        self.map
    }

    pub fn coeffs(&self) -> Option<ArrayView1<'a, f64>> {
        self.coeffs
    }

    pub fn input_dim(&self) -> usize {
        self.map.input_dim()
    }

    pub fn output_dim(&self) -> usize {
        self.map.output_dim()
    }

    pub fn num_coeffs(&self) -> usize {
        self.map.num_coeffs()
    }

    fn coeff_view(&self) -> MapResult<ArrayView1<'a, f64>> {
        match self.coeffs {
            Some(c) => Ok(c),
            None if self.map.num_coeffs() == 0 => Ok(ArrayView1::from(&[] as &[f64])),
            None => Err(MapError::CoefficientsNotSet { map: self.map.name() }),
        }
    }

    pub fn evaluate(&self, pts: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.evaluate(self.coeff_view()?, pts)
    }

    pub fn log_determinant(&self, pts: ArrayView2<f64>) -> MapResult<Array1<f64>> {
        self.map.log_determinant(self.coeff_view()?, pts)
    }

    pub fn inverse(&self, x1: ArrayView2<f64>, r: ArrayView2<f64>) -> MapResult<Array2<f64>> {
        self.map.inverse(self.coeff_view()?, x1, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::identity::IdentityMap;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Zero-coefficient maps work without ever setting coefficients.
    fn zero_coefficient_map_needs_no_coeffs() {
        let map = ParameterizedMap::new(IdentityMap::new(2, 1).unwrap());

        assert!(!map.has_coeffs());
        let y = map.evaluate(array![[1.0], [4.0]].view()).unwrap();
        assert_eq!(y, array![[4.0]]);
    }

    #[test]
    fn set_coeffs_checks_length() {
        let mut map = ParameterizedMap::new(IdentityMap::new(1, 1).unwrap());

        assert_eq!(
            map.set_coeffs(array![1.0].view()),
            Err(MapError::CoeffLengthMismatch { expected: 0, found: 1 })
        );
        assert!(map.set_coeffs(Array1::<f64>::zeros(0).view()).is_ok());
        assert!(map.has_coeffs());
    }

    #[test]
    fn boxed_map_keeps_behavior() {
        let boxed = ParameterizedMap::new(IdentityMap::new(2, 2).unwrap()).boxed();
        assert_eq!(boxed.input_dim(), 2);
        assert_eq!(boxed.map().name(), "IdentityMap");
        let y = boxed.evaluate(array![[1.0], [2.0]].view()).unwrap();
        assert_eq!(y, array![[1.0], [2.0]]);
    }
}
