// Takeoff velocity - isolate free fall in the velocity trace
//
// After the pre-takeoff velocity peak, free fall shows as a run of samples
// whose velocity slope stays constant (acceleration -g). The reference slope
// follows every rejected sample and the start of each new run; the value at
// the start of the first long enough run is the takeoff velocity.

use serde::Serialize;

use crate::error::DetectionError;
use crate::segmentation::phases::PhaseBounds;
use crate::segmentation::scan::{first_argmax, RunScanner, ScanState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TakeoffEstimate {
    /// Velocity at the start of the free-fall run (m/s)
    pub velocity: f64,
    /// Sample where the run starts
    pub index: usize,
    /// Pre-takeoff velocity peak
    pub peak_index: usize,
}

/// Search the trace after the peak inside `window`
///
/// # Arguments
/// * `velocity` - Whole kinematic velocity trace
/// * `window` - Event window of the jump; the peak is searched here
/// * `tolerance` - Relative slope change accepted inside a run
/// * `run_samples` - Consecutive samples that confirm free fall
/// * `jump` - 1-based jump number for the error
pub fn takeoff_velocity(
    velocity: &[f64],
    window: PhaseBounds,
    tolerance: f64,
    run_samples: usize,
    jump: usize,
) -> Result<TakeoffEstimate, DetectionError> {
    let peak_index =
        first_argmax(velocity, window.range()).ok_or(DetectionError::FlightNotFound { jump })?;

    let mut reference = if peak_index > 0 {
        velocity[peak_index] - velocity[peak_index - 1]
    } else {
        0.0
    };
    let mut takeoff = velocity[peak_index];
    let mut scanner = RunScanner::new(run_samples);

    for index in peak_index + 1..velocity.len() {
        let slope = velocity[index] - velocity[index - 1];
        // NaN (flat trace) never qualifies
        let qualifies = (slope - reference).abs() / slope.abs() < tolerance;

        if !qualifies || scanner.is_searching() {
            reference = slope;
            takeoff = velocity[index];
        }

        if let ScanState::Confirmed { start } = scanner.observe(index, qualifies) {
            log::debug!(
                "[Metrics] jump {} takeoff v={:.4} m/s at sample {} (peak at {})",
                jump,
                takeoff,
                start,
                peak_index
            );
            return Ok(TakeoffEstimate {
                velocity: takeoff,
                index: start,
                peak_index,
            });
        }
    }

    Err(DetectionError::FlightNotFound { jump })
}
