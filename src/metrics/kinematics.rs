// Body-centre kinematics from vertical ground reaction force
//
// a = F / m - g, then velocity and position by cumulative trapezoid
// integration. Integration restarts from rest at the start of every jump
// window; samples outside the windows carry no motion.

use crate::error::ComputeError;
use crate::segmentation::phases::PhaseBounds;
use crate::GRAVITY;

/// Net vertical acceleration of the body centre
pub fn force_to_acceleration(force: &[f64], mass_kg: f64) -> Result<Vec<f64>, ComputeError> {
    if force.is_empty() {
        return Err(ComputeError::EmptySeries { what: "force" });
    }
    if !(mass_kg > 0.0) {
        return Err(ComputeError::NonPositiveMass { mass: mass_kg });
    }
    Ok(force.iter().map(|&f| f / mass_kg - GRAVITY).collect())
}

/// Cumulative trapezoid integral starting at zero
pub fn integrate(values: &[f64], dt: f64) -> Result<Vec<f64>, ComputeError> {
    if values.is_empty() {
        return Err(ComputeError::EmptySeries {
            what: "integration input",
        });
    }
    let mut total = 0.0;
    let mut integral = Vec::with_capacity(values.len());
    integral.push(total);
    for pair in values.windows(2) {
        total += (pair[0] + pair[1]) / 2.0 * dt;
        integral.push(total);
    }
    Ok(integral)
}

/// Acceleration, velocity and position aligned with the cleaned signal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KinematicTrace {
    pub acceleration: Vec<f64>,
    pub velocity: Vec<f64>,
    pub position: Vec<f64>,
}

impl KinematicTrace {
    /// Integrate each window independently, zeros elsewhere
    pub fn from_windows(
        force: &[f64],
        mass_kg: f64,
        windows: &[PhaseBounds],
        dt: f64,
    ) -> Result<Self, ComputeError> {
        let len = force.len();
        let mut trace = Self {
            acceleration: vec![0.0; len],
            velocity: vec![0.0; len],
            position: vec![0.0; len],
        };

        for window in windows {
            let end = window.end.min(len);
            let start = window.start.min(end);
            let acceleration = force_to_acceleration(&force[start..end], mass_kg)?;
            let velocity = integrate(&acceleration, dt)?;
            let position = integrate(&velocity, dt)?;

            trace.acceleration[start..end].copy_from_slice(&acceleration);
            trace.velocity[start..end].copy_from_slice(&velocity);
            trace.position[start..end].copy_from_slice(&position);
        }

        Ok(trace)
    }

    pub fn len(&self) -> usize {
        self.acceleration.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acceleration.is_empty()
    }
}
