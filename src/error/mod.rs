// Error types for the squat jump analyzer
//
// One enum per failure domain (input shape, landmark detection, arithmetic
// preconditions), each carrying a numeric code so callers can tell bad input
// from bad data without string matching.

mod compute;
mod detection;
mod input;

pub use compute::{log_compute_error, ComputeError, ComputeErrorCodes};
pub use detection::{log_detection_error, DetectionError, DetectionErrorCodes, Landmark};
pub use input::{log_input_error, InputError, InputErrorCodes};

use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library and the CLI exit status.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Failure domain of a [`PipelineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Detection,
    Compute,
}

/// Any failure that aborts a pipeline run
///
/// Wraps the domain errors so `?` can thread them through segmentation and
/// metrics without losing the original variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Input(InputError),
    Detection(DetectionError),
    Compute(ComputeError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(_) => ErrorKind::Input,
            PipelineError::Detection(_) => ErrorKind::Detection,
            PipelineError::Compute(_) => ErrorKind::Compute,
        }
    }
}

impl ErrorCode for PipelineError {
    fn code(&self) -> i32 {
        match self {
            PipelineError::Input(err) => err.code(),
            PipelineError::Detection(err) => err.code(),
            PipelineError::Compute(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            PipelineError::Input(err) => err.message(),
            PipelineError::Detection(err) => err.message(),
            PipelineError::Compute(err) => err.message(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Input(err) => err.fmt(f),
            PipelineError::Detection(err) => err.fmt(f),
            PipelineError::Compute(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Input(err) => Some(err),
            PipelineError::Detection(err) => Some(err),
            PipelineError::Compute(err) => Some(err),
        }
    }
}

impl From<InputError> for PipelineError {
    fn from(err: InputError) -> Self {
        PipelineError::Input(err)
    }
}

impl From<DetectionError> for PipelineError {
    fn from(err: DetectionError) -> Self {
        PipelineError::Detection(err)
    }
}

impl From<ComputeError> for PipelineError {
    fn from(err: ComputeError) -> Self {
        PipelineError::Compute(err)
    }
}

/// Log a pipeline error through the matching domain logger
pub fn log_pipeline_error(err: &PipelineError, context: &str) {
    match err {
        PipelineError::Input(inner) => log_input_error(inner, context),
        PipelineError::Detection(inner) => log_detection_error(inner, context),
        PipelineError::Compute(inner) => log_compute_error(inner, context),
    }
}
