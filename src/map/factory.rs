//! Map factory: ready-made components and triangular maps.
//!
//! - [`create_identity`]: an [`IdentityMap`] with no coefficients.
//! - [`create_component`]: a total-order [`MonotonePolynomialMap`] over
//!   `dim` inputs, coefficients unset.
//! - [`create_triangular`]: `output_dim` monotone components over growing
//!   prefixes of `input_dim` inputs, assembled without moving
//!   coefficients, so the map's coefficients start unset.
use crate::map::{
    component::ConditionalMap,
    errors::{MapError, MapResult},
    identity::IdentityMap,
    monotone::MonotonePolynomialMap,
    options::MapOptions,
    parameterized::ParameterizedMap,
    triangular::TriangularMap,
    validation::check_dims,
};

pub fn create_identity(
    input_dim: usize, output_dim: usize,
) -> MapResult<ParameterizedMap<IdentityMap>> {
    Ok(ParameterizedMap::new(IdentityMap::new(input_dim, output_dim)?))
}

/// Scalar monotone component `ℝ^dim → ℝ` with all off-diagonal terms of
/// total order `<= total_order`.
pub fn create_component(
    dim: usize, total_order: u32, opts: &MapOptions,
) -> MapResult<ParameterizedMap<Box<dyn ConditionalMap>>> {
    let comp = MonotonePolynomialMap::total_order(dim, total_order, opts)?;
    Ok(ParameterizedMap::new(comp).boxed())
}

/// Lower-triangular map `ℝ^input_dim → ℝ^output_dim`.
///
/// Component `k` (0-based) reads the first `input_dim − output_dim + k + 1`
/// inputs.
///
/// # Errors
/// - [`MapError::OutputExceedsInput`] if `output_dim > input_dim`.
/// - [`MapError::EmptyComponents`] if `output_dim == 0`.
pub fn create_triangular(
    input_dim: usize, output_dim: usize, total_order: u32, opts: &MapOptions,
) -> MapResult<ParameterizedMap<TriangularMap>> {
    check_dims(input_dim, output_dim)?;
    if output_dim == 0 {
        return Err(MapError::EmptyComponents);
    }
    let lead = input_dim - output_dim;
    let components = (0..output_dim)
        .map(|k| create_component(lead + k + 1, total_order, opts))
        .collect::<MapResult<Vec<_>>>()?;
    TriangularMap::assemble(components, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multi_index::MultiIndexSet;

    #[test]
    // Purpose
    // -------
    // The factory lays out components over growing prefixes.
    //
    // Expect
    // ------
    // - 3 components reading 3, 4, 5 inputs; coefficient count is the sum of
    //   component counts; coefficients start unset.
    fn triangular_components_grow_by_one_input() {
        let opts = MapOptions::default();
        let map = create_triangular(5, 3, 2, &opts).unwrap();

        assert_eq!((map.input_dim(), map.output_dim()), (5, 3));
        assert_eq!(map.num_components(), 3);
        assert!(!map.has_coeffs());
        let mut total = 0;
        for k in 0..3 {
            let comp = map.component(k).unwrap();
            assert_eq!(comp.input_dim(), 3 + k);
            let terms = MultiIndexSet::create_total_order(2 + k, 2).len();
            assert_eq!(comp.num_coeffs(), terms + opts.diag_terms);
            total += comp.num_coeffs();
        }
        assert_eq!(map.num_coeffs(), total);
        assert_eq!(map.diagonal_coeff_indices().len(), 3);
    }

    #[test]
    fn rejects_degenerate_shapes() {
        let opts = MapOptions::default();
        assert!(matches!(
            create_triangular(2, 3, 1, &opts),
            Err(MapError::OutputExceedsInput { .. })
        ));
        assert!(matches!(create_triangular(2, 0, 1, &opts), Err(MapError::EmptyComponents)));
        assert!(create_identity(1, 2).is_err());
        assert_eq!(create_component(3, 1, &opts).unwrap().num_coeffs(), 3 + 1);
    }
}
