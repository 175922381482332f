//! TriangularMap — block-triangular composition of conditional components.
//!
//! Purpose
//! -------
//! Chain components `T_1, …, T_K` into one map `T: ℝ^N → ℝ^M`. Component
//! `k` reads the input prefix `x_{0:N_k}` and writes output rows
//! `[off_k, off_k + M_k)`, so the Jacobian is block lower-triangular and
//! every block is invertible on its own.
//!
//! Key behaviors
//! -------------
//! - **Coefficients**: one arena, owned by the enclosing
//!   [`ParameterizedMap`]; component `k` reads the contiguous range
//!   `ranges[k]` of it. Ranges are laid out in component order.
//! - **Construction** via [`TriangularMap::assemble`]:
//!   - `move_coeffs = true` concatenates every component's existing
//!     coefficients into the arena; components read the arena from then on.
//!   - `move_coeffs = false` leaves the arena unset and keeps each
//!     component's stand-alone coefficients visible through
//!     [`ParameterizedMap::component`] until the first `set_coeffs`.
//! - **Log-determinant** is the sum of component log-determinants.
//! - **Adjoints**: input gradients of all components are added into one
//!   `N`-row buffer; coefficient gradients fill disjoint row bands, skipping
//!   components without coefficients.
//! - **Inverse** runs in forward order: component 1 first, each later
//!   component using `x1` plus all previously solved blocks as its prefix.
//!
//! Invariants & assumptions
//! ------------------------
//! - `N_1 >= M_1` and `N_k = N_{k−1} + M_k` for `k > 1`; hence
//!   `N = N_K`, `M = Σ M_k`, and the trailing block of component `k`
//!   occupies input rows `[N_k − M_k, N_k)`.
//! - Inversion is all-or-nothing: the first column that fails to converge
//!   aborts the call with an error naming it; no partial output is
//!   returned.
//!
//! Downstream usage
//! ----------------
//! - `map::factory::create_triangular` assembles maps of
//!   [`crate::map::monotone::MonotonePolynomialMap`] components.
//! - The trainer sees the map only as a [`ConditionalMap`] plus its flat
//!   coefficient vector.
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};

use crate::map::{
    coeffs::{CoeffLayout, CoeffRange},
    component::ConditionalMap,
    errors::{MapError, MapResult},
    parameterized::{ComponentView, ParameterizedMap},
    validation::{check_cols, check_dims, check_rows},
};

#[derive(Debug)]
pub struct TriangularMap {
    components: Vec<Box<dyn ConditionalMap>>,
    layout: CoeffLayout,
    output_offsets: Vec<usize>,
    detached: Vec<Option<Array1<f64>>>,
    moved: bool,
    input_dim: usize,
    output_dim: usize,
}

impl TriangularMap {
    /// Compose `components` into a triangular map owned by a
    /// [`ParameterizedMap`].
    ///
    /// # Errors
    /// - [`MapError::EmptyComponents`] if `components` is empty.
    /// - [`MapError::OutputExceedsInput`] if the first component has
    ///   `M_1 > N_1`.
    /// - [`MapError::ComponentChain`] if `N_k != N_{k−1} + M_k`.
    /// - [`MapError::CoefficientsNotSet`] if `move_coeffs` is `true` and a
    ///   coefficient-bearing component has no coefficients.
    pub fn assemble(
        components: Vec<ParameterizedMap<Box<dyn ConditionalMap>>>, move_coeffs: bool,
    ) -> MapResult<ParameterizedMap<TriangularMap>> {
        let first = components.first().ok_or(MapError::EmptyComponents)?;
        check_dims(first.input_dim(), first.output_dim())?;
        for (index, pair) in components.windows(2).enumerate() {
            let expected_input = pair[0].input_dim() + pair[1].output_dim();
            if pair[1].input_dim() != expected_input {
                return Err(MapError::ComponentChain {
                    index: index + 1,
                    expected_input,
                    found_input: pair[1].input_dim(),
                });
            }
        }

        let layout = CoeffLayout::from_counts(components.iter().map(|c| c.num_coeffs()));
        let input_dim = components.last().map_or(0, |c| c.input_dim());
        let mut output_offsets = Vec::with_capacity(components.len());
        let mut output_dim = 0;
        for comp in &components {
            output_offsets.push(output_dim);
            output_dim += comp.output_dim();
        }

        let (maps, coeffs): (Vec<_>, Vec<_>) =
            components.into_iter().map(ParameterizedMap::into_parts).unzip();

        if move_coeffs {
            let mut arena = Array1::zeros(layout.total());
            for (k, (map, own)) in maps.iter().zip(&coeffs).enumerate() {
                let range = layout.range(k)?;
                if range.is_empty() {
                    continue;
                }
                let own = own.as_ref().ok_or(MapError::CoefficientsNotSet { map: map.name() })?;
                range.view_mut(&mut arena)?.assign(own);
            }
            let tri = TriangularMap {
                detached: vec![None; maps.len()],
                components: maps,
                layout,
                output_offsets,
                moved: true,
                input_dim,
                output_dim,
            };
            ParameterizedMap::with_coeffs(tri, arena)
        } else {
            let tri = TriangularMap {
                components: maps,
                layout,
                output_offsets,
                detached: coeffs,
                moved: false,
                input_dim,
                output_dim,
            };
            Ok(ParameterizedMap::new(tri))
        }
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// `true` when the map was assembled with `move_coeffs = true`.
    pub fn coeffs_moved(&self) -> bool {
        self.moved
    }

    /// Coefficient range of component `index` inside the arena.
    pub fn coeff_range(&self, index: usize) -> MapResult<CoeffRange> {
        self.layout.range(index)
    }

    fn parts(
        &self,
    ) -> impl Iterator<Item = (usize, &dyn ConditionalMap, CoeffRange, usize)> + '_ {
        self.components
            .iter()
            .zip(self.layout.ranges())
            .zip(&self.output_offsets)
            .enumerate()
            .map(|(k, ((comp, &range), &off))| (k, comp.as_ref(), range, off))
    }

    /// Forward block-by-block solve on a full `(N, n)` buffer whose leading
    /// `N − M` rows hold `x1`.
    fn inverse_inplace_impl(
        &self, coeffs: ArrayView1<f64>, mut x: ArrayViewMut2<f64>, r: ArrayView2<f64>,
    ) -> MapResult<()> {
        for (k, comp, range, off) in self.parts() {
            let (n_k, m_k) = (comp.input_dim(), comp.output_dim());
            let lead = n_k - m_k;
            let (prefix, mut rest) = x.view_mut().split_at(Axis(0), lead);
            comp.inverse_impl(
                range.sub_view(coeffs)?,
                prefix.view(),
                r.slice(s![off..off + m_k, ..]),
                rest.slice_mut(s![..m_k, ..]),
            )?;
            log::debug!("Inverted component {k} ({}) over {} columns", comp.name(), r.ncols());
        }
        Ok(())
    }
}

impl ConditionalMap for TriangularMap {
    fn name(&self) -> &'static str {
        "TriangularMap"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn num_coeffs(&self) -> usize {
        self.layout.total()
    }

    fn diagonal_coeff_indices(&self) -> Vec<usize> {
        self.parts()
            .flat_map(|(_, comp, range, _)| {
                comp.diagonal_coeff_indices().into_iter().map(move |i| i + range.start)
            })
            .collect()
    }

    fn wrap_coeffs(&mut self) {
        self.detached.iter_mut().for_each(|d| *d = None);
        self.components.iter_mut().for_each(|c| c.wrap_coeffs());
    }

    fn evaluate_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        for (_, comp, range, off) in self.parts() {
            comp.evaluate_impl(
                range.sub_view(coeffs)?,
                pts.slice(s![..comp.input_dim(), ..]),
                out.slice_mut(s![off..off + comp.output_dim(), ..]),
            )?;
        }
        Ok(())
    }

    fn log_determinant_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, mut out: ArrayViewMut1<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        let mut part = Array1::zeros(pts.ncols());
        for (_, comp, range, _) in self.parts() {
            comp.log_determinant_impl(
                range.sub_view(coeffs)?,
                pts.slice(s![..comp.input_dim(), ..]),
                part.view_mut(),
            )?;
            out += &part;
        }
        Ok(())
    }

    fn inverse_impl(
        &self, coeffs: ArrayView1<f64>, x1: ArrayView2<f64>, r: ArrayView2<f64>,
        mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        let lead = self.input_dim - self.output_dim;
        let mut full = Array2::zeros((self.input_dim, r.ncols()));
        if lead > 0 {
            full.slice_mut(s![..lead, ..]).assign(&x1);
        }
        self.inverse_inplace_impl(coeffs, full.view_mut(), r)?;
        out.assign(&full.slice(s![lead.., ..]));
        Ok(())
    }

    fn gradient_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
        mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        for (_, comp, range, off) in self.parts() {
            let n_k = comp.input_dim();
            let mut part = Array2::zeros((n_k, pts.ncols()));
            comp.gradient_impl(
                range.sub_view(coeffs)?,
                pts.slice(s![..n_k, ..]),
                sens.slice(s![off..off + comp.output_dim(), ..]),
                part.view_mut(),
            )?;
            let mut band = out.slice_mut(s![..n_k, ..]);
            band += &part;
        }
        Ok(())
    }

    fn coeff_grad_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, sens: ArrayView2<f64>,
        mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        for (_, comp, range, off) in self.parts() {
            if range.is_empty() {
                continue;
            }
            comp.coeff_grad_impl(
                range.sub_view(coeffs)?,
                pts.slice(s![..comp.input_dim(), ..]),
                sens.slice(s![off..off + comp.output_dim(), ..]),
                range.rows_mut(&mut out)?,
            )?;
        }
        Ok(())
    }

    fn log_determinant_coeff_grad_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        for (_, comp, range, _) in self.parts() {
            if range.is_empty() {
                continue;
            }
            comp.log_determinant_coeff_grad_impl(
                range.sub_view(coeffs)?,
                pts.slice(s![..comp.input_dim(), ..]),
                range.rows_mut(&mut out)?,
            )?;
        }
        Ok(())
    }

    fn log_determinant_input_grad_impl(
        &self, coeffs: ArrayView1<f64>, pts: ArrayView2<f64>, mut out: ArrayViewMut2<f64>,
    ) -> MapResult<()> {
        out.fill(0.0);
        for (_, comp, range, _) in self.parts() {
            let n_k = comp.input_dim();
            let mut part = Array2::zeros((n_k, pts.ncols()));
            comp.log_determinant_input_grad_impl(
                range.sub_view(coeffs)?,
                pts.slice(s![..n_k, ..]),
                part.view_mut(),
            )?;
            let mut band = out.slice_mut(s![..n_k, ..]);
            band += &part;
        }
        Ok(())
    }
}

impl ParameterizedMap<TriangularMap> {
    /// Solve for the trailing `M` rows of `x` in place, given its leading
    /// `N − M` rows and targets `r`.
    ///
    /// # Errors
    /// - Shape errors as for `inverse`; [`MapError::InverseNotConverged`] or
    ///   [`MapError::BracketNotFound`] from the first failing component.
    pub fn inverse_inplace(&self, x: ArrayViewMut2<f64>, r: ArrayView2<f64>) -> MapResult<()> {
        let tri = self.map();
        check_rows("x", &x.view(), tri.input_dim)?;
        check_rows("r", &r, tri.output_dim)?;
        check_cols("r", &r, x.ncols())?;
        tri.inverse_inplace_impl(self.coeff_view()?, x, r)
    }

    /// Component `index` with the coefficients it currently sees.
    ///
    /// # Errors
    /// - [`MapError::ComponentIndexOutOfRange`] if `index >= num_components()`.
    pub fn component(&self, index: usize) -> MapResult<ComponentView<'_>> {
        let tri = self.map();
        let comp = tri.components.get(index).ok_or(MapError::ComponentIndexOutOfRange {
            index,
            count: tri.components.len(),
        })?;
        let coeffs = match self.coeffs() {
            Some(arena) => Some(tri.layout.range(index)?.sub_view(arena)?),
            None => tri.detached[index].as_ref().map(|c| c.view()),
        };
        Ok(ComponentView { map: comp.as_ref(), coeffs })
    }

    pub fn num_components(&self) -> usize {
        self.map().num_components()
    }

    pub fn coeffs_moved(&self) -> bool {
        self.map().coeffs_moved()
    }

    pub fn diagonal_coeff_indices(&self) -> Vec<usize> {
        self.map().diagonal_coeff_indices()
    }
}
