//! Error type for the training layer.
//!
//! Covers option validation, objective/gradient contract violations,
//! wrapped [`MapError`]s raised while evaluating the map under training,
//! and the `argmin` backend errors. `argmin::core::Error` is converted at
//! the boundary and never leaks out of `optimization`.
use argmin::core::{ArgminError, Error};

use crate::map::MapError;

/// Result alias for training operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match coefficient dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- TrainOptions ----
    /// A relative or absolute tolerance is negative or non-finite.
    InvalidTolerance {
        name: &'static str,
        tol: f64,
        reason: &'static str,
    },
    /// Evaluation budget needs to be positive.
    InvalidMaxEvals {
        max_evals: u64,
        reason: &'static str,
    },
    /// Time budget needs to be positive and finite.
    InvalidMaxTime {
        seconds: f64,
        reason: &'static str,
    },
    /// Stop value cannot be NaN or +inf.
    InvalidStopval {
        value: f64,
        reason: &'static str,
    },
    /// Invalid algorithm name.
    InvalidAlgorithm {
        name: String,
        reason: &'static str,
    },
    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Training inputs ----
    /// The map under training has no coefficients.
    NoCoefficients,
    /// Training or test samples are unusable.
    InvalidSamples {
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Trained coefficients must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Map ----
    /// Error raised by the map while evaluating the objective or writing
    /// coefficients back.
    Map(MapError),

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- TrainOptions ----
            OptError::InvalidTolerance { name, tol, reason } => {
                write!(f, "Invalid {name} {tol}: {reason}")
            }
            OptError::InvalidMaxEvals { max_evals, reason } => {
                write!(f, "Invalid maximum evaluations {max_evals}: {reason}")
            }
            OptError::InvalidMaxTime { seconds, reason } => {
                write!(f, "Invalid maximum time {seconds}s: {reason}")
            }
            OptError::InvalidStopval { value, reason } => {
                write!(f, "Invalid stop value {value}: {reason}")
            }
            OptError::InvalidAlgorithm { name, reason } => {
                write!(f, "Invalid algorithm '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Training inputs ----
            OptError::NoCoefficients => {
                write!(f, "Map has no coefficients to train")
            }
            OptError::InvalidSamples { reason } => {
                write!(f, "Invalid samples: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid trained coefficient at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing trained coefficients")
            }

            // ---- Map ----
            OptError::Map(err) => write!(f, "Map error: {err}"),

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(source_err: Error) -> Self {
        // Errors raised by our own adapter travel through argmin untouched.
        let source_err = match source_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match source_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<MapError> for OptError {
    fn from(err: MapError) -> Self {
        OptError::Map(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Errors crossing the argmin boundary come back as the variant that was
    // raised, or as the matching argmin wrapper.
    fn argmin_errors_round_trip() {
        let ours: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();
        assert_eq!(OptError::from(ours), OptError::NonFiniteCost { value: f64::INFINITY });

        let theirs: Error = ArgminError::NotInitialized { text: "no param".into() }.into();
        assert_eq!(OptError::from(theirs), OptError::NotInitialized { text: "no param".into() });
    }

    #[test]
    fn map_errors_are_wrapped() {
        let err: OptError = MapError::CoefficientsNotSet { map: "TriangularMap" }.into();
        assert!(matches!(err, OptError::Map(MapError::CoefficientsNotSet { .. })));
        assert!(err.to_string().starts_with("Map error"));
    }
}
