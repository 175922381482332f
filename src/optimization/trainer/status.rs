//! trainer::status — fixed taxonomy of training outcomes.
//!
//! Purpose
//! -------
//! Report how a training run ended with a stable numeric code and message,
//! independent of the backend solver that produced it. Positive codes are
//! successes, negative codes failures.
//!
//! | code | status                     | message                               |
//! |------|----------------------------|---------------------------------------|
//! |  1   | `Success`                  | Generic success                       |
//! |  2   | `StopvalReached`           | stopval reached                       |
//! |  3   | `FtolReached`              | ftol reached                          |
//! |  4   | `XtolReached`              | xtol reached                          |
//! |  5   | `MaxEvalReached`           | maxeval reached                       |
//! |  6   | `MaxTimeReached`           | maxtime reached                       |
//! | −1   | `Generic`                  | generic failure                       |
//! | −2   | `InvalidArgs`              | invalid arguments                     |
//! | −3   | `OutOfMemory`              | out of memory                         |
//! | −4   | `RoundoffLimited`          | roundoff error limited progress       |
//! | −5   | `ForcedStop`               | forced termination                    |
//!
//! Key behaviors
//! -------------
//! - [`TrainStatus::from_termination`] maps an `argmin` termination status
//!   onto the taxonomy. Guard exits are recognized by their reason string
//!   (see [`crate::optimization::trainer::guard`]).
//! - [`TrainStatus::from_error`] classifies a run that aborted with an
//!   error.
//!
//! Conventions
//! -----------
//! - Lookups are pure functions of the enum; there is no shared table.
use std::fmt;

use argmin::core::{TerminationReason, TerminationStatus};

use crate::optimization::{errors::OptError, trainer::guard::ExitReason};

/// Prefix of the exit text `argmin` uses when a line search inside L-BFGS
/// fails.
const LINE_SEARCH_EXIT: &str = "Line search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuccessKind {
    Success,
    StopvalReached,
    FtolReached,
    XtolReached,
    MaxEvalReached,
    MaxTimeReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Generic,
    InvalidArgs,
    OutOfMemory,
    RoundoffLimited,
    ForcedStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainStatus {
    Succeeded(SuccessKind),
    Failed(FailureKind),
}

impl SuccessKind {
    pub fn code(self) -> i32 {
        match self {
            SuccessKind::Success => 1,
            SuccessKind::StopvalReached => 2,
            SuccessKind::FtolReached => 3,
            SuccessKind::XtolReached => 4,
            SuccessKind::MaxEvalReached => 5,
            SuccessKind::MaxTimeReached => 6,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SuccessKind::Success => "Generic success",
            SuccessKind::StopvalReached => "stopval reached",
            SuccessKind::FtolReached => "ftol reached",
            SuccessKind::XtolReached => "xtol reached",
            SuccessKind::MaxEvalReached => "maxeval reached",
            SuccessKind::MaxTimeReached => "maxtime reached",
        }
    }
}

impl FailureKind {
    pub fn code(self) -> i32 {
        match self {
            FailureKind::Generic => -1,
            FailureKind::InvalidArgs => -2,
            FailureKind::OutOfMemory => -3,
            FailureKind::RoundoffLimited => -4,
            FailureKind::ForcedStop => -5,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FailureKind::Generic => "generic failure",
            FailureKind::InvalidArgs => "invalid arguments",
            FailureKind::OutOfMemory => "out of memory",
            FailureKind::RoundoffLimited => "roundoff error limited progress",
            FailureKind::ForcedStop => "forced termination",
        }
    }
}

impl TrainStatus {
    pub fn code(self) -> i32 {
        match self {
            TrainStatus::Succeeded(kind) => kind.code(),
            TrainStatus::Failed(kind) => kind.code(),
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            TrainStatus::Succeeded(kind) => kind.message(),
            TrainStatus::Failed(kind) => kind.message(),
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, TrainStatus::Succeeded(_))
    }

    /// Classify a finished `argmin` run.
    ///
    /// Solver exits other than the guard's are failures: L-BFGS reports an
    /// aborted line search this way.
    pub fn from_termination(status: &TerminationStatus) -> Self {
        let reason = match status {
            TerminationStatus::NotTerminated => return TrainStatus::Failed(FailureKind::Generic),
            TerminationStatus::Terminated(reason) => reason,
        };
        match reason {
            TerminationReason::SolverConverged => TrainStatus::Succeeded(SuccessKind::Success),
            TerminationReason::TargetCostReached => {
                TrainStatus::Succeeded(SuccessKind::StopvalReached)
            }
            TerminationReason::MaxItersReached => {
                TrainStatus::Succeeded(SuccessKind::MaxEvalReached)
            }
            TerminationReason::Timeout => TrainStatus::Succeeded(SuccessKind::MaxTimeReached),
            TerminationReason::Interrupt => TrainStatus::Failed(FailureKind::ForcedStop),
            TerminationReason::SolverExit(text) => match ExitReason::parse(text) {
                Some(ExitReason::Ftol) => TrainStatus::Succeeded(SuccessKind::FtolReached),
                Some(ExitReason::Xtol) => TrainStatus::Succeeded(SuccessKind::XtolReached),
                Some(ExitReason::MaxEvals) => TrainStatus::Succeeded(SuccessKind::MaxEvalReached),
                None if text.starts_with(LINE_SEARCH_EXIT) => {
                    TrainStatus::Failed(FailureKind::RoundoffLimited)
                }
                None => TrainStatus::Failed(FailureKind::Generic),
            },
        }
    }

    /// Classify a run that aborted with `err`.
    pub fn from_error(err: &OptError) -> Self {
        match err {
            OptError::InvalidParameter { .. }
            | OptError::GradientDimMismatch { .. }
            | OptError::Map(_) => TrainStatus::Failed(FailureKind::InvalidArgs),
            // Line searches give up when no further decrease can be resolved.
            OptError::ConditionViolated { .. }
            | OptError::NonFiniteCost { .. }
            | OptError::InvalidGradient { .. } => {
                TrainStatus::Failed(FailureKind::RoundoffLimited)
            }
            _ => TrainStatus::Failed(FailureKind::Generic),
        }
    }
}

impl fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
