//! Errors for multi-index construction, access, and set assembly.
//!
//! Conventions
//! -----------
//! - **Indices are 0-based**; a component index is valid iff `index < length`.
//! - Every set-level error names the offending position so callers can
//!   report the exact multi-index that broke the contract.

/// Result alias for multi-index operations that may produce [`MultiIndexError`].
pub type MultiIndexResult<T> = Result<T, MultiIndexError>;

/// Contract violations raised by [`MultiIndex`](super::MultiIndex) and
/// [`MultiIndexSet`](super::MultiIndexSet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiIndexError {
    /// Component index is not smaller than the multi-index length.
    IndexOutOfRange { index: usize, length: usize },

    /// A multi-index added to a set has the wrong length.
    LengthMismatch { position: usize, expected: usize, found: usize },

    /// Position lookup into a set past its end.
    PositionOutOfRange { position: usize, size: usize },
}

impl std::error::Error for MultiIndexError {}

impl std::fmt::Display for MultiIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultiIndexError::IndexOutOfRange { index, length } => {
                write!(f, "Multi-index component {index} is out of range for length {length}")
            }
            MultiIndexError::LengthMismatch { position, expected, found } => {
                write!(
                    f,
                    "Multi-index at position {position} has length {found}, expected {expected}"
                )
            }
            MultiIndexError::PositionOutOfRange { position, size } => {
                write!(f, "Position {position} is out of range for a set of size {size}")
            }
        }
    }
}
