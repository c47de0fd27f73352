//! Metrics engine
//!
//! Reads a finished [`Segmentation`] and derives the body-centre kinematic
//! trace and the per-jump performance metrics. Every metric is a pure
//! function of one jump's phase bounds and the shared series, so each can be
//! checked on its own.

pub mod cop;
pub mod kinematics;
pub mod takeoff;

use serde::Serialize;

use crate::capture::Foot;
use crate::config::MetricsConfig;
use crate::error::{ComputeError, PipelineError};
use crate::segmentation::phases::{JumpPhases, PhaseBounds};
use crate::segmentation::Segmentation;
use crate::{GRAVITY, SAMPLE_PERIOD_S, SAMPLE_RATE_HZ};

use cop::{cop_channel, cop_displacement_cm, Axis};
use kinematics::KinematicTrace;
use takeoff::takeoff_velocity;

/// Jump height reached with a takeoff velocity (cm)
pub fn jump_height_cm(takeoff_velocity: f64) -> f64 {
    takeoff_velocity * takeoff_velocity / (2.0 * GRAVITY) * 100.0
}

/// Ballistic flight time implied by a takeoff velocity (s)
pub fn flight_time_s(takeoff_velocity: f64) -> f64 {
    2.0 * takeoff_velocity / GRAVITY
}

/// Length of a phase in seconds
pub fn duration_s(bounds: PhaseBounds) -> f64 {
    bounds.samples() as f64 / SAMPLE_RATE_HZ
}

fn window<'a>(series: &'a [f64], bounds: PhaseBounds, what: &'static str) -> Result<&'a [f64], ComputeError> {
    let end = bounds.end.min(series.len());
    if bounds.start >= end {
        return Err(ComputeError::EmptySeries { what });
    }
    Ok(&series[bounds.start..end])
}

/// Least-squares slope of force against time over the window (N/s)
pub fn eccentric_loading_rate(time: &[f64], force: &[f64], bounds: PhaseBounds) -> Result<f64, ComputeError> {
    let t = window(time, bounds, "eccentric window")?;
    let f = window(force, bounds, "eccentric window")?;
    let n = t.len().min(f.len());
    if n < 2 {
        return Err(ComputeError::SeriesTooShort {
            what: "eccentric window",
            len: n,
            required: 2,
        });
    }

    let mean_t = t[..n].iter().sum::<f64>() / n as f64;
    let mean_f = f[..n].iter().sum::<f64>() / n as f64;
    let (covariance, variance) = t[..n]
        .iter()
        .zip(&f[..n])
        .fold((0.0, 0.0), |(cov, var), (&ti, &fi)| {
            let dt = ti - mean_t;
            (cov + dt * (fi - mean_f), var + dt * dt)
        });
    if !(variance > 0.0) {
        return Err(ComputeError::SeriesTooShort {
            what: "eccentric time span",
            len: n,
            required: 2,
        });
    }
    Ok(covariance / variance)
}

/// Largest force in the window, never below zero (N)
pub fn peak_force(force: &[f64], bounds: PhaseBounds) -> Result<f64, ComputeError> {
    let f = window(force, bounds, "peak force window")?;
    Ok(f.iter().fold(0.0_f64, |peak, &value| peak.max(value)))
}

fn power<'a>(
    force: &'a [f64],
    velocity: &'a [f64],
    bounds: PhaseBounds,
    what: &'static str,
) -> Result<impl Iterator<Item = f64> + 'a, ComputeError> {
    let f = window(force, bounds, what)?;
    let v = window(velocity, bounds, what)?;
    Ok(f.iter().zip(v).map(|(force, velocity)| force * velocity))
}

/// Largest instantaneous power in the window, never below zero (W)
pub fn peak_power(force: &[f64], velocity: &[f64], bounds: PhaseBounds) -> Result<f64, ComputeError> {
    Ok(power(force, velocity, bounds, "peak power window")?.fold(0.0_f64, f64::max))
}

/// Mean instantaneous power over the window (W)
pub fn mean_power(force: &[f64], velocity: &[f64], bounds: PhaseBounds) -> Result<f64, ComputeError> {
    let (sum, count) = power(force, velocity, bounds, "concentric window")?
        .fold((0.0, 0usize), |(sum, count), p| (sum + p, count + 1));
    Ok(sum / count as f64)
}

/// Deepest body-centre position below the starting height (cm)
pub fn squat_depth_cm(position: &[f64], bounds: PhaseBounds) -> Result<f64, ComputeError> {
    let p = window(position, bounds, "squat window")?;
    let lowest = p.iter().fold(0.0_f64, |low, &value| low.min(value));
    Ok(lowest.abs() * 100.0)
}

/// Metrics of one jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JumpMetrics {
    pub jump: usize,
    pub takeoff_index: usize,
    pub jump_height_cm: f64,
    pub takeoff_velocity_m_s: f64,
    pub eccentric_loading_rate_n_s: f64,
    pub jump_time_s: f64,
    pub eccentric_time_s: f64,
    pub concentric_time_s: f64,
    pub peak_force_n: f64,
    pub peak_power_w: f64,
    pub mean_concentric_power_w: f64,
    pub squat_depth_cm: f64,
    pub cop_right_x_cm: f64,
    pub cop_left_x_cm: f64,
    pub cop_right_z_cm: f64,
    pub cop_left_z_cm: f64,
    pub flight_time_s: f64,
    pub airborne_time_s: f64,
}

/// Export column key and display label, in table order
pub const METRIC_COLUMNS: [(&str, &str); 17] = [
    ("weight(kg)", "Weight (kg)"),
    ("jump_height(cm)", "Jump Height (cm)"),
    ("takeoff_v(m/s)", "Takeoff Velocity (m/s)"),
    ("ecc_loading_rate(N/s)", "Eccentric Loading Rate (N/s)"),
    ("jump_time(s)", "Jump Time (s)"),
    ("ecce_time(s)", "Eccentric Time (s)"),
    ("conc_time(s)", "Concentric Time (s)"),
    ("peak_force(N)", "Peak Force (N)"),
    ("peak_power(W)", "Peak Power (W)"),
    ("avg_power_conc(W)", "Avg. Concentric Power (W)"),
    ("squat_depth(cm)", "Squat Depth (cm)"),
    ("cop_displace_right_x(cm)", "COP Displacement Right Ant.-Post. (cm)"),
    ("cop_displace_left_x(cm)", "COP Displacement Left Ant.-Post. (cm)"),
    ("cop_displace_right_z(cm)", "COP Displacement Right Med.-Lat. (cm)"),
    ("cop_displace_left_z(cm)", "COP Displacement Left Med.-Lat. (cm)"),
    ("flight_time(s)", "Flight Time (s)"),
    ("airborne_time(s)", "Airborne Time (s)"),
];

impl JumpMetrics {
    /// COP displacement of one foot along one axis (cm)
    pub fn cop(&self, foot: Foot, axis: Axis) -> f64 {
        match (foot, axis) {
            (Foot::Right, Axis::X) => self.cop_right_x_cm,
            (Foot::Left, Axis::X) => self.cop_left_x_cm,
            (Foot::Right, Axis::Z) => self.cop_right_z_cm,
            (Foot::Left, Axis::Z) => self.cop_left_z_cm,
        }
    }

    /// Row values matching [`METRIC_COLUMNS`]
    pub fn row(&self, weight_kg: f64) -> [f64; 17] {
        [
            weight_kg,
            self.jump_height_cm,
            self.takeoff_velocity_m_s,
            self.eccentric_loading_rate_n_s,
            self.jump_time_s,
            self.eccentric_time_s,
            self.concentric_time_s,
            self.peak_force_n,
            self.peak_power_w,
            self.mean_concentric_power_w,
            self.squat_depth_cm,
            self.cop_right_x_cm,
            self.cop_left_x_cm,
            self.cop_right_z_cm,
            self.cop_left_z_cm,
            self.flight_time_s,
            self.airborne_time_s,
        ]
    }
}

/// Metrics of a whole capture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub weight_kg: f64,
    pub jumps: [JumpMetrics; 3],
    #[serde(skip)]
    pub kinematics: KinematicTrace,
}

impl MetricsReport {
    pub fn column_keys() -> impl Iterator<Item = &'static str> {
        METRIC_COLUMNS.iter().map(|(key, _)| *key)
    }

    pub fn display_labels() -> impl Iterator<Item = &'static str> {
        METRIC_COLUMNS.iter().map(|(_, label)| *label)
    }

    /// One row per jump, columns as [`METRIC_COLUMNS`]
    pub fn rows(&self) -> Vec<[f64; 17]> {
        self.jumps.iter().map(|jump| jump.row(self.weight_kg)).collect()
    }
}

/// Shared per-sample series a jump's metrics read from
#[derive(Debug, Clone, Copy)]
pub struct JumpSeries<'a> {
    pub time: &'a [f64],
    pub force: &'a [f64],
    pub velocity: &'a [f64],
    pub position: &'a [f64],
}

/// Computes metrics for segmented captures
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn compute(&self, segmentation: &Segmentation) -> Result<MetricsReport, PipelineError> {
        let signal = &segmentation.signal;
        let mass_kg = segmentation.weight.mass_kg;
        let windows: Vec<PhaseBounds> = segmentation.phases.jumps.iter().map(|jump| jump.event).collect();
        let kinematics = KinematicTrace::from_windows(&signal.total_vy, mass_kg, &windows, SAMPLE_PERIOD_S)?;

        let series = JumpSeries {
            time: &signal.time,
            force: &signal.total_vy,
            velocity: &kinematics.velocity,
            position: &kinematics.position,
        };

        let measure = |phases: &JumpPhases| -> Result<JumpMetrics, PipelineError> {
            let cop = |foot: Foot, axis: Axis| {
                let displacement = cop_displacement_cm(cop_channel(signal, foot, axis), phases.concentric)?;
                log::trace!(
                    "[Metrics] jump {} COP {} {}: {:.2} cm",
                    phases.jump,
                    foot.label(),
                    axis.label(),
                    displacement
                );
                Ok(displacement)
            };
            let metrics = self.jump_metrics(phases, series, cop)?;
            log::info!(
                "[Metrics] jump {}: height {:.1} cm, takeoff {:.3} m/s, peak force {:.0} N",
                metrics.jump,
                metrics.jump_height_cm,
                metrics.takeoff_velocity_m_s,
                metrics.peak_force_n
            );
            Ok(metrics)
        };
        let [first, second, third] = &segmentation.phases.jumps;
        let jumps = [measure(first)?, measure(second)?, measure(third)?];

        Ok(MetricsReport {
            weight_kg: mass_kg,
            jumps,
            kinematics,
        })
    }

    /// Metrics of one jump from its phases and the shared series
    pub fn jump_metrics<F>(
        &self,
        phases: &JumpPhases,
        series: JumpSeries<'_>,
        cop: F,
    ) -> Result<JumpMetrics, PipelineError>
    where
        F: Fn(Foot, Axis) -> Result<f64, ComputeError>,
    {
        let takeoff = takeoff_velocity(
            series.velocity,
            phases.event,
            self.config.takeoff_slope_tolerance,
            self.config.takeoff_run_samples,
            phases.jump,
        )?;
        let squat_window = PhaseBounds::new(phases.event.start, phases.concentric.end);
        let airborne = PhaseBounds::new(phases.concentric.end, phases.landing.start);

        Ok(JumpMetrics {
            jump: phases.jump,
            takeoff_index: takeoff.index,
            jump_height_cm: jump_height_cm(takeoff.velocity),
            takeoff_velocity_m_s: takeoff.velocity,
            eccentric_loading_rate_n_s: eccentric_loading_rate(series.time, series.force, phases.eccentric)?,
            jump_time_s: duration_s(phases.jump_phase),
            eccentric_time_s: duration_s(phases.eccentric),
            concentric_time_s: duration_s(phases.concentric),
            peak_force_n: peak_force(series.force, phases.event)?,
            peak_power_w: peak_power(series.force, series.velocity, phases.event)?,
            mean_concentric_power_w: mean_power(series.force, series.velocity, phases.concentric)?,
            squat_depth_cm: squat_depth_cm(series.position, squat_window)?,
            cop_right_x_cm: cop(Foot::Right, Axis::X)?,
            cop_left_x_cm: cop(Foot::Left, Axis::X)?,
            cop_right_z_cm: cop(Foot::Right, Axis::Z)?,
            cop_left_z_cm: cop(Foot::Left, Axis::Z)?,
            flight_time_s: flight_time_s(takeoff.velocity),
            airborne_time_s: duration_s(airborne),
        })
    }
}
