//! Configuration management for segmentation and metric tuning
//!
//! Thresholds used by the segmentation heuristics are loaded from a JSON
//! file so a lab can re-tune them against its own plate without
//! recompiling. Missing or malformed files fall back to the defaults,
//! which reproduce the reference protocol.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Input shape checks applied before any processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Exact number of columns in a raw capture
    pub expected_columns: usize,
    /// Shortest plausible three-jump capture (rows, inclusive)
    pub min_rows: usize,
    /// Longest plausible three-jump capture (rows, inclusive)
    pub max_rows: usize,
    /// Relative tolerance on each time delta
    pub time_rtol: f64,
    /// Absolute tolerance on each time delta (seconds)
    pub time_atol: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            expected_columns: 19,
            min_rows: 3000,
            max_rows: 30000,
            time_rtol: 1e-5,
            time_atol: 1e-8,
        }
    }
}

/// Filter, contact and landmark detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Butterworth order (even)
    pub filter_order: usize,
    /// Low-pass cutoff in Hz
    pub filter_cutoff_hz: f64,
    /// First in-air threshold tried (N)
    pub air_threshold_start_n: f64,
    /// Increment between sweep attempts (N)
    pub air_threshold_step_n: f64,
    /// Highest threshold tried before giving up (N)
    pub air_threshold_ceiling_n: f64,
    /// |dF/dt| below this counts as static support (N/s)
    pub static_rate_n_per_s: f64,
    /// dF/dt below the negated value counts as unloading (N/s)
    pub unloading_rate_n_per_s: f64,
    /// |dF/dt| below this marks landing completion (N/s)
    pub settle_rate_n_per_s: f64,
    /// Samples skipped after the last unloading transition before the settle search
    pub settle_offset_samples: usize,
    /// Samples kept clear before the eccentric start when scanning for unloading
    pub eccentric_guard_samples: usize,
    /// Samples skipped after the final landing before its unloading scan
    pub final_landing_offset_samples: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            filter_order: 4,
            filter_cutoff_hz: 5.0,
            air_threshold_start_n: 10.0,
            air_threshold_step_n: 5.0,
            air_threshold_ceiling_n: 100.0,
            static_rate_n_per_s: 200.0,
            unloading_rate_n_per_s: 200.0,
            settle_rate_n_per_s: 1.0,
            settle_offset_samples: 100,
            eccentric_guard_samples: 10,
            final_landing_offset_samples: 100,
        }
    }
}

/// Takeoff detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Relative slope change tolerated inside a free-fall run
    pub takeoff_slope_tolerance: f64,
    /// Consecutive constant-slope samples that confirm flight
    pub takeoff_run_samples: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            takeoff_slope_tolerance: 0.001,
            takeoff_run_samples: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
