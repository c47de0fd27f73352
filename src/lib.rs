// Squat Jump Analyzer - force-plate segmentation and jump metrics
// Batch pipeline: raw capture -> cleaned signal + phase table -> per-jump metrics

pub mod capture;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod metrics;
pub mod pipeline;
pub mod segmentation;

pub use capture::RawTable;
pub use config::AppConfig;
pub use error::{ErrorCode, PipelineError};
pub use pipeline::{process, AnalysisReport, PipelineOutput};

/// Plate sampling frequency (Hz)
pub const SAMPLE_RATE_HZ: f64 = 1000.0;

/// Time between samples (s)
pub const SAMPLE_PERIOD_S: f64 = 1.0 / SAMPLE_RATE_HZ;

/// Standard gravity (m/s^2), used for weight, kinematics and jump height
pub const GRAVITY: f64 = 9.80665;
