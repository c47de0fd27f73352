// Arithmetic precondition errors

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Compute error code constants
///
/// Error code range: 3001-3005
pub struct ComputeErrorCodes {}

impl ComputeErrorCodes {
    pub const NON_POSITIVE_MASS: i32 = 3001;
    pub const EMPTY_SERIES: i32 = 3002;
    pub const SERIES_TOO_SHORT: i32 = 3003;
    pub const INVALID_FILTER: i32 = 3004;
    pub const INVALID_CONFIG: i32 = 3005;
}

/// Log a compute error with structured context
pub fn log_compute_error(err: &ComputeError, context: &str) {
    error!(
        "Compute error in {}: code={}, component=Metrics, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Rejected inputs at the boundary of numeric helpers
///
/// Error code range: 3001-3005
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeError {
    NonPositiveMass { mass: f64 },

    /// `what` names the series that was empty
    EmptySeries { what: &'static str },

    SeriesTooShort {
        what: &'static str,
        len: usize,
        required: usize,
    },

    InvalidFilter { reason: String },

    /// Tuning values that would make a search meaningless or unbounded
    InvalidConfig { reason: String },
}

impl ErrorCode for ComputeError {
    fn code(&self) -> i32 {
        match self {
            ComputeError::NonPositiveMass { .. } => ComputeErrorCodes::NON_POSITIVE_MASS,
            ComputeError::EmptySeries { .. } => ComputeErrorCodes::EMPTY_SERIES,
            ComputeError::SeriesTooShort { .. } => ComputeErrorCodes::SERIES_TOO_SHORT,
            ComputeError::InvalidFilter { .. } => ComputeErrorCodes::INVALID_FILTER,
            ComputeError::InvalidConfig { .. } => ComputeErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            ComputeError::NonPositiveMass { mass } => {
                format!("Mass must be positive (got {})", mass)
            }
            ComputeError::EmptySeries { what } => format!("{} is empty", what),
            ComputeError::SeriesTooShort {
                what,
                len,
                required,
            } => format!("{} has {} samples, at least {} required", what, len, required),
            ComputeError::InvalidFilter { reason } => {
                format!("Invalid filter design: {}", reason)
            }
            ComputeError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComputeError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ComputeError {}
