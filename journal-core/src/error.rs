//! Engine error kinds.
//!
//! Every engine mutation validates before it writes, so any `Err` returned
//! here means the position was left exactly as it was.

use crate::domain::{LegId, PositionStatus};
use thiserror::Error;

/// Errors from position and scale-out ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("{operation} is not allowed while the position is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: PositionStatus,
    },

    #[error("scale-out of {requested} exceeds available size {available}")]
    OverAllocation { requested: f64, available: f64 },

    #[error("scale-out leg {0} not found")]
    NotFound(LegId),

    #[error("scale-out leg {0} appears more than once")]
    DuplicateLeg(LegId),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}
