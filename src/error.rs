//! Crate-wide error taxonomy.
//!
//! Every failure is surfaced to the caller immediately. All inputs are
//! deterministic, so retrying a failed construction or solve cannot change
//! the outcome.

use thiserror::Error;

use crate::domain::Algorithm;

/// Errors produced by the flexibility engine.
#[derive(Debug, Error)]
pub enum FlexError {
    /// Malformed configuration value (horizon, growth, vertex cap, ...).
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// A device's hardware limits and usage schedule admit no operation point.
    #[error("resource '{id}' admits no feasible operation point")]
    InfeasibleResource { id: String },

    /// Structurally invalid call input (empty fleet, vertex-free polytope, ...).
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A vertex-generating algorithm was invoked without a direction set.
    #[error("algorithm {algorithm} requires a signal-vector set")]
    MissingSignalVectors { algorithm: Algorithm },

    /// The LP backend reported a non-optimal status.
    #[error("solver failure while {context}: {status}")]
    SolverFailure { status: String, context: String },

    /// Two entities disagree about the time horizon.
    #[error("dimension mismatch in {entity}: expected {expected} periods, got {actual}")]
    DimensionMismatch {
        entity: String,
        expected: usize,
        actual: usize,
    },
}

impl FlexError {
    pub(crate) fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension_mismatch(
        entity: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::DimensionMismatch {
            entity: entity.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlexError>;
