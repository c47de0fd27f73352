// Centre-of-pressure displacement per foot and axis

use serde::Serialize;

use crate::capture::{Channel, Foot, Sensor};
use crate::error::ComputeError;
use crate::segmentation::phases::PhaseBounds;
use crate::segmentation::CleanedSignal;

/// Horizontal plate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    /// Anterior-posterior
    X,
    /// Medial-lateral
    Z,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Z => "z",
        }
    }
}

/// Sensor and plate channel each (foot, axis) displacement is read from
pub fn cop_source(foot: Foot, axis: Axis) -> (Sensor, Channel) {
    match (foot, axis) {
        (Foot::Right, Axis::X) => (Sensor::One, Channel::Px),
        (Foot::Left, Axis::X) => (Sensor::Two, Channel::Px),
        (Foot::Right, Axis::Z) => (Sensor::One, Channel::Pz),
        (Foot::Left, Axis::Z) => (Sensor::Two, Channel::Pz),
    }
}

/// COP channel of one foot along one axis
pub fn cop_channel(signal: &CleanedSignal, foot: Foot, axis: Axis) -> &[f64] {
    let (sensor, _) = cop_source(foot, axis);
    let trace = signal.sensor(sensor);
    match axis {
        Axis::X => &trace.px,
        Axis::Z => &trace.pz,
    }
}

/// Signed displacement of largest magnitude from the window's first sample (cm)
pub fn cop_displacement_cm(channel: &[f64], window: PhaseBounds) -> Result<f64, ComputeError> {
    let end = window.end.min(channel.len());
    if window.start >= end {
        return Err(ComputeError::EmptySeries {
            what: "centre of pressure window",
        });
    }
    let origin = channel[window.start];
    let displacement = channel[window.start..end]
        .iter()
        .map(|value| value - origin)
        .fold(0.0_f64, |best, d| if d.abs() > best.abs() { d } else { best });
    Ok(displacement * 100.0)
}
