//! Deterministic synthetic triple-jump captures.
//!
//! The vertical force is assembled from raised-cosine ramps and holds:
//! quiet standing, an unloading dip, a propulsion peak, a ballistic flight
//! whose length follows from the takeoff velocity, and a landing that
//! cancels the landing momentum. Centre of pressure moves with the load.
//! The known takeoff velocities and flight lengths are kept as ground truth.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::capture::{raw_column_names, Channel, RawTable, Sensor, TIME_COLUMN};
use crate::error::InputError;
use crate::{GRAVITY, SAMPLE_PERIOD_S, SAMPLE_RATE_HZ};

/// Share of the load carried by sensor 1
const SENSOR_ONE_SHARE: f64 = 0.52;
const COP_NOISE_M: f64 = 0.0002;

const STAND_START_S: f64 = 2.0;
const STAND_BETWEEN_S: f64 = 1.5;
const STAND_END_S: f64 = 2.0;
const UNLOAD_S: f64 = 0.30;
const UNLOAD_RATIO: f64 = 0.45;
const RISE_S: f64 = 0.35;
const PEAK_HOLD_S: f64 = 0.15;
const PUSH_OFF_S: f64 = 0.30;
const IMPACT_S: f64 = 0.25;
const IMPACT_HOLD_S: f64 = 0.10;
const SETTLE_S: f64 = 0.30;
const STEP_OFF_S: f64 = 0.40;
const OFF_PLATE_S: f64 = 0.80;

/// Parameters of a synthetic capture
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticJumpSpec {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_mass_kg")]
    pub mass_kg: f64,
    /// Propulsion peak of each jump as a multiple of body weight
    #[serde(default = "default_peak_ratios")]
    pub peak_ratios: [f64; 3],
    /// Uniform noise amplitude on each vertical channel (N)
    #[serde(default = "default_noise_n")]
    pub noise_n: f64,
    /// Leave the plate after the last landing
    #[serde(default)]
    pub stepped_off: bool,
}

fn default_seed() -> u64 {
    0x5A5A_0003
}

fn default_mass_kg() -> f64 {
    75.0
}

fn default_peak_ratios() -> [f64; 3] {
    [2.2, 2.1, 2.15]
}

fn default_noise_n() -> f64 {
    2.0
}

impl Default for SyntheticJumpSpec {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            mass_kg: default_mass_kg(),
            peak_ratios: default_peak_ratios(),
            noise_n: default_noise_n(),
            stepped_off: false,
        }
    }
}

/// What the generator put into the capture
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SyntheticTruth {
    pub mass_kg: f64,
    pub takeoff_velocities: [f64; 3],
    pub flight_samples: [usize; 3],
    /// Largest of propulsion and landing peak per jump (N)
    pub peak_forces: [f64; 3],
    pub stepped_off: bool,
    pub rows: usize,
}

/// Generated capture plus its ground truth
#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    pub table: RawTable,
    pub truth: SyntheticTruth,
}

fn samples(seconds: f64) -> usize {
    (seconds * SAMPLE_RATE_HZ).round() as usize
}

/// Total vertical force assembled segment by segment
#[derive(Default)]
struct ForceProfile {
    force: Vec<f64>,
}

impl ForceProfile {
    fn hold(&mut self, level: f64, seconds: f64) {
        self.hold_samples(level, samples(seconds));
    }

    fn hold_samples(&mut self, level: f64, count: usize) {
        self.force.extend(std::iter::repeat(level).take(count));
    }

    /// Raised-cosine ramp ending exactly on `to`
    fn ease(&mut self, from: f64, to: f64, seconds: f64) {
        let count = samples(seconds).max(1);
        self.force.extend((1..=count).map(|step| {
            let progress = (1.0 - (PI * step as f64 / count as f64).cos()) / 2.0;
            from + (to - from) * progress
        }));
    }

    fn len(&self) -> usize {
        self.force.len()
    }
}

/// Velocity gained from rest over `force` (rectangle rule)
fn velocity_after(force: &[f64], mass_kg: f64) -> f64 {
    force
        .iter()
        .map(|f| (f / mass_kg - GRAVITY) * SAMPLE_PERIOD_S)
        .sum()
}

/// Generate a capture for `spec`
pub fn generate(spec: &SyntheticJumpSpec) -> Result<SyntheticCapture, InputError> {
    let mass = spec.mass_kg;
    let weight = mass * GRAVITY;
    let mut profile = ForceProfile::default();
    let mut takeoff_velocities = [0.0; 3];
    let mut flight_samples = [0; 3];
    let mut peak_forces = [0.0; 3];

    profile.hold(weight, STAND_START_S);
    for (jump, ratio) in spec.peak_ratios.iter().enumerate() {
        let peak = weight * ratio;
        let push_start = profile.len();
        profile.ease(weight, weight * UNLOAD_RATIO, UNLOAD_S);
        profile.ease(weight * UNLOAD_RATIO, peak, RISE_S);
        profile.hold(peak, PEAK_HOLD_S);
        profile.ease(peak, 0.0, PUSH_OFF_S);

        let takeoff = velocity_after(&profile.force[push_start..], mass);
        let flight = (2.0 * takeoff / GRAVITY * SAMPLE_RATE_HZ).round() as usize;
        profile.hold_samples(0.0, flight);

        // Impulse of the landing minus body weight cancels the landing momentum
        let landing_s = IMPACT_S + IMPACT_HOLD_S + SETTLE_S;
        let impact = (mass * takeoff + weight * (landing_s - SETTLE_S / 2.0))
            / (IMPACT_S / 2.0 + IMPACT_HOLD_S + SETTLE_S / 2.0);
        profile.ease(0.0, impact, IMPACT_S);
        profile.hold(impact, IMPACT_HOLD_S);
        profile.ease(impact, weight, SETTLE_S);
        profile.hold(weight, if jump < 2 { STAND_BETWEEN_S } else { STAND_END_S });

        takeoff_velocities[jump] = takeoff;
        flight_samples[jump] = flight;
        peak_forces[jump] = peak.max(impact);
    }
    if spec.stepped_off {
        profile.ease(weight, 0.0, STEP_OFF_S);
        profile.hold(0.0, OFF_PLATE_S);
    }

    let rows = profile.len();
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut noise = |amplitude: f64| {
        if amplitude > 0.0 {
            rng.gen_range(-amplitude..amplitude)
        } else {
            0.0
        }
    };

    let mut columns: Vec<(&'static str, Vec<f64>)> = raw_column_names()
        .into_iter()
        .map(|name| (name, Vec::with_capacity(rows)))
        .collect();
    let slot = |name: &str| columns.iter().position(|(candidate, _)| *candidate == name);
    let time_slot = slot(TIME_COLUMN);
    let sensor_slots: Vec<(Sensor, f64, [Option<usize>; 6])> = Sensor::ALL
        .into_iter()
        .map(|sensor| {
            let share = match sensor {
                Sensor::One => SENSOR_ONE_SHARE,
                Sensor::Two => 1.0 - SENSOR_ONE_SHARE,
            };
            (sensor, share, Channel::ALL.map(|channel| slot(sensor.column(channel))))
        })
        .collect();

    for (row, &total) in profile.force.iter().enumerate() {
        if let Some(index) = time_slot {
            columns[index].1.push(row as f64 / SAMPLE_RATE_HZ);
        }
        let load = total / weight - 1.0;
        for (sensor, share, slots) in &sensor_slots {
            let side = total * share;
            let base_x = match sensor {
                Sensor::One => 0.10,
                Sensor::Two => -0.10,
            };
            let values = [
                0.03 * side,
                side + noise(spec.noise_n),
                -0.02 * side,
                base_x + 0.01 * load + noise(COP_NOISE_M),
                0.0,
                0.15 - 0.005 * load + noise(COP_NOISE_M),
            ];
            for (value, index) in values.into_iter().zip(slots) {
                if let Some(index) = index {
                    columns[*index].1.push(value);
                }
            }
        }
    }
    // Torque columns stay at zero
    for (_, values) in &mut columns {
        values.resize(rows, 0.0);
    }

    log::debug!(
        "[Fixtures] Synthetic capture: {} rows, takeoff velocities {:?}",
        rows,
        takeoff_velocities
    );
    Ok(SyntheticCapture {
        table: RawTable::from_columns(columns)?,
        truth: SyntheticTruth {
            mass_kg: mass,
            takeoff_velocities,
            flight_samples,
            peak_forces,
            stepped_off: spec.stepped_off,
            rows,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::validate;
    use crate::config::ValidationConfig;

    #[test]
    fn test_default_capture_is_valid() {
        let capture = generate(&SyntheticJumpSpec::default()).unwrap();
        assert_eq!(capture.table.column_count(), 19);
        assert_eq!(capture.table.row_count(), capture.truth.rows);
        assert_eq!(validate(&capture.table, &ValidationConfig::default()), Ok(()));
    }

    #[test]
    fn test_flight_matches_takeoff_velocity() {
        let capture = generate(&SyntheticJumpSpec::default()).unwrap();
        for (velocity, flight) in capture
            .truth
            .takeoff_velocities
            .iter()
            .zip(capture.truth.flight_samples)
        {
            assert!(*velocity > 1.5 && *velocity < 3.5, "takeoff {}", velocity);
            let expected = 2.0 * velocity / GRAVITY * SAMPLE_RATE_HZ;
            assert!((flight as f64 - expected).abs() <= 0.5);
        }
    }

    #[test]
    fn test_same_seed_same_capture() {
        let spec = SyntheticJumpSpec::default();
        let first = generate(&spec).unwrap();
        let second = generate(&spec).unwrap();
        assert_eq!(first.table, second.table);

        let other = generate(&SyntheticJumpSpec { seed: 1, ..spec }).unwrap();
        assert_ne!(first.table, other.table);
    }

    #[test]
    fn test_sensors_share_the_load() {
        let capture = generate(&SyntheticJumpSpec {
            noise_n: 0.0,
            ..SyntheticJumpSpec::default()
        })
        .unwrap();
        let one = capture.table.column("ground_force1_vy").unwrap();
        let two = capture.table.column("ground_force2_vy").unwrap();
        let weight = 75.0 * GRAVITY;
        assert!((one[0] + two[0] - weight).abs() < 1e-9);
        assert!((one[0] / weight - SENSOR_ONE_SHARE).abs() < 1e-12);
        assert!(capture.table.column("ground_torque1_x").unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_step_off_ends_off_plate() {
        let capture = generate(&SyntheticJumpSpec {
            stepped_off: true,
            noise_n: 0.0,
            ..SyntheticJumpSpec::default()
        })
        .unwrap();
        let last = capture.table.row_count() - 1;
        assert_eq!(capture.table.column("ground_force1_vy").unwrap()[last], 0.0);
        assert!(capture.truth.stepped_off);
    }
}
