//! Errors for map construction, evaluation, coefficient management, and inversion.
//!
//! Conventions
//! -----------
//! - Structural violations are reported at the violating call; no map
//!   operation panics on bad shapes or lengths.
//! - `what` fields name the argument that failed (`"pts"`, `"sens"`, `"x1"`,
//!   `"r"`, `"coeffs"`, …).
//! - Inversion failures name the column (sample) that failed.
/// Result alias for map operations that may produce [`MapError`].
pub type MapResult<T> = Result<T, MapError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    // ---- Shapes ----
    /// An input array has the wrong number of rows or columns.
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    /// Component `index` does not extend the input prefix of its predecessor.
    ComponentChain { index: usize, expected_input: usize, found_input: usize },

    /// A component declares more outputs than inputs.
    OutputExceedsInput { input_dim: usize, output_dim: usize },

    /// A triangular map needs at least one component.
    EmptyComponents,

    /// Component lookup past the end of a triangular map.
    ComponentIndexOutOfRange { index: usize, count: usize },

    // ---- Coefficients ----
    /// Coefficient vector length does not match the map's `num_coeffs`.
    CoeffLengthMismatch { expected: usize, found: usize },

    /// An operation needs coefficients that were never set.
    CoefficientsNotSet { map: &'static str },

    /// A coefficient range does not fit inside its buffer.
    CoeffRangeOutOfBounds { start: usize, end: usize, len: usize },

    // ---- Capabilities ----
    /// The component does not provide this operation.
    UnsupportedCapability { map: &'static str, operation: &'static str },

    // ---- Inversion ----
    /// Root finding did not meet tolerances within the iteration budget.
    InverseNotConverged { column: usize, residual: f64, iterations: usize },

    /// No sign change was found while expanding the search bracket.
    BracketNotFound { column: usize, target: f64 },

    // ---- Configuration ----
    /// A map option failed validation or parsing.
    InvalidOption { name: &'static str, value: String, reason: &'static str },
}

impl std::error::Error for MapError {}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch for '{what}': expected {expected}, found {found}")
            }
            MapError::ComponentChain { index, expected_input, found_input } => {
                write!(
                    f,
                    "Component {index} has input dimension {found_input}, expected {expected_input} \
                     (previous input dimension plus this component's output dimension)"
                )
            }
            MapError::OutputExceedsInput { input_dim, output_dim } => {
                write!(f, "Output dimension {output_dim} exceeds input dimension {input_dim}")
            }
            MapError::EmptyComponents => {
                write!(f, "A triangular map needs at least one component")
            }
            MapError::ComponentIndexOutOfRange { index, count } => {
                write!(f, "Component index {index} is out of range for {count} components")
            }
            MapError::CoeffLengthMismatch { expected, found } => {
                write!(f, "Coefficient vector has length {found}, expected {expected}")
            }
            MapError::CoefficientsNotSet { map } => {
                write!(f, "Coefficients of '{map}' have not been set")
            }
            MapError::CoeffRangeOutOfBounds { start, end, len } => {
                write!(f, "Coefficient range [{start}, {end}) exceeds buffer length {len}")
            }
            MapError::UnsupportedCapability { map, operation } => {
                write!(f, "'{map}' does not support {operation}")
            }
            MapError::InverseNotConverged { column, residual, iterations } => {
                write!(
                    f,
                    "Inverse did not converge for column {column} after {iterations} iterations \
                     (residual {residual:e})"
                )
            }
            MapError::BracketNotFound { column, target } => {
                write!(f, "Could not bracket the root for column {column} (target {target})")
            }
            MapError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid value '{value}' for option '{name}': {reason}")
            }
        }
    }
}
