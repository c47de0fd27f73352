// Contact detection - locate the four ground-contact intervals
//
// Samples with total vertical force below a threshold are "in air". A
// liftoff is recorded at the first in-air sample, a landing at the last
// in-air sample before force returns. A capture is segmented once it shows
// three landings and three or four liftoffs (the fourth meaning the subject
// stepped off the plate at the end). Until then the threshold is raised in
// fixed steps up to a ceiling.

use serde::Serialize;

use crate::config::SegmentationConfig;
use crate::error::{ComputeError, DetectionError};
use crate::segmentation::scan::{edges, Edge};

/// Inclusive `[start, end]` sample range of one ground contact
///
/// `start` is the last in-air sample before the contact (0 for the first
/// contact) and `end` the first in-air sample after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContactInterval {
    pub start: usize,
    pub end: usize,
}

impl ContactInterval {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// The four contacts of a three-jump capture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSet {
    pub contacts: [ContactInterval; 4],
    /// Subject left the plate after the final landing
    pub stepped_off: bool,
    /// Threshold that produced this segmentation (N)
    pub threshold_n: f64,
}

impl ContactSet {
    /// Contact by 1-based number
    pub fn get(&self, number: usize) -> ContactInterval {
        self.contacts[number - 1]
    }

    /// Upper bound for static support of samples at `index`
    ///
    /// A sample belongs to the latest contact that started at or before it;
    /// it can only be static while that contact has not ended.
    pub fn support_end(&self, index: usize) -> usize {
        let [c1, c2, c3, c4] = self.contacts;
        if index < c2.start {
            c1.end
        } else if index < c3.start {
            c2.end
        } else if index < c4.start {
            c3.end
        } else {
            c4.end
        }
    }

    /// In-air sample ranges between consecutive contacts (inclusive)
    pub fn flight_gaps(&self) -> [(usize, usize); 3] {
        let c = self.contacts;
        [
            (c[0].end, c[1].start),
            (c[1].end, c[2].start),
            (c[2].end, c[3].start),
        ]
    }
}

/// Liftoff and landing indices for one threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirTransitions {
    /// First in-air sample of each flight
    pub liftoffs: Vec<usize>,
    /// Last in-air sample of each flight
    pub landings: Vec<usize>,
}

impl AirTransitions {
    pub fn find(force: &[f64], threshold: f64) -> Self {
        let in_air: Vec<bool> = force.iter().map(|&value| value < threshold).collect();
        let liftoffs = edges(&in_air, 0..in_air.len(), Edge::Rising)
            .map(|i| i + 1)
            .collect();
        let landings = edges(&in_air, 0..in_air.len(), Edge::Falling).collect();
        Self { liftoffs, landings }
    }

    /// Three landings, three or four liftoffs, strictly alternating
    pub fn is_three_jump(&self) -> bool {
        let counts_ok = (self.liftoffs.len() == 3 || self.liftoffs.len() == 4)
            && self.landings.len() == 3;
        counts_ok
            && self.landings.iter().enumerate().all(|(k, &landing)| {
                self.liftoffs[k] < landing
                    && self.liftoffs.get(k + 1).map_or(true, |&next| landing < next)
            })
    }
}

/// Reject sweep settings that cannot reach the ceiling in a finite number of steps
pub fn validate_sweep(config: &SegmentationConfig) -> Result<(), ComputeError> {
    let start = config.air_threshold_start_n;
    let step = config.air_threshold_step_n;
    let ceiling = config.air_threshold_ceiling_n;

    let reason = if !(start.is_finite() && ceiling.is_finite()) {
        Some(format!("air threshold bounds must be finite (start {start}, ceiling {ceiling})"))
    } else if !(step.is_finite() && step > 0.0) {
        Some(format!("air threshold step must be positive (got {step})"))
    } else if start > ceiling {
        Some(format!("air threshold start {start} N exceeds ceiling {ceiling} N"))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ComputeError::InvalidConfig { reason }),
        None => Ok(()),
    }
}

/// Number of thresholds tried from start to ceiling, 0 for an invalid sweep
fn sweep_steps(config: &SegmentationConfig) -> usize {
    if validate_sweep(config).is_err() {
        return 0;
    }
    let span = (config.air_threshold_ceiling_n - config.air_threshold_start_n) / config.air_threshold_step_n;
    span.floor() as usize + 1
}

/// Sweep the in-air threshold until the capture splits into four contacts
pub fn detect_contacts(
    force: &[f64],
    config: &SegmentationConfig,
) -> Result<ContactSet, DetectionError> {
    let mut last = AirTransitions {
        liftoffs: Vec::new(),
        landings: Vec::new(),
    };

    for step in 0..sweep_steps(config) {
        let threshold = config.air_threshold_start_n + step as f64 * config.air_threshold_step_n;
        let transitions = AirTransitions::find(force, threshold);
        log::debug!(
            "[Contacts] threshold={} N liftoffs={:?} landings={:?}",
            threshold,
            transitions.liftoffs,
            transitions.landings
        );

        if transitions.is_three_jump() {
            let contacts = build_contacts(&transitions, force.len());
            log::info!(
                "[Contacts] Segmented at {} N: {:?} (stepped_off={})",
                threshold,
                contacts.contacts,
                contacts.stepped_off
            );
            return Ok(ContactSet {
                threshold_n: threshold,
                ..contacts
            });
        }

        last = transitions;
    }

    Err(DetectionError::ContactCount {
        ceiling_n: config.air_threshold_ceiling_n,
        liftoffs: last.liftoffs.len(),
        landings: last.landings.len(),
    })
}

fn build_contacts(transitions: &AirTransitions, len: usize) -> ContactSet {
    let up = &transitions.liftoffs;
    let down = &transitions.landings;
    let stepped_off = up.len() == 4;
    let final_end = if stepped_off { up[3] } else { len.saturating_sub(1) };

    ContactSet {
        contacts: [
            ContactInterval { start: 0, end: up[0] },
            ContactInterval { start: down[0], end: up[1] },
            ContactInterval { start: down[1], end: up[2] },
            ContactInterval {
                start: down[2],
                end: final_end,
            },
        ],
        stepped_off,
        threshold_n: 0.0,
    }
}

/// Zero every in-air sample between consecutive contacts
pub fn zero_flight_gaps(signal: &mut [f64], contacts: &ContactSet) {
    for (start, end) in contacts.flight_gaps() {
        let end = end.min(signal.len().saturating_sub(1));
        if start <= end {
            signal[start..=end].iter_mut().for_each(|value| *value = 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plateaus of `level` separated by flights of `gap` samples
    fn stepped_trace(level: f64, flights: &[(usize, usize)], len: usize) -> Vec<f64> {
        let mut trace = vec![level; len];
        for &(start, end) in flights {
            trace[start..end].iter_mut().for_each(|value| *value = 0.0);
        }
        trace
    }

    #[test]
    fn test_three_flights_on_plate_at_end() {
        let force = stepped_trace(700.0, &[(100, 150), (300, 360), (500, 540)], 700);
        let contacts = detect_contacts(&force, &SegmentationConfig::default()).unwrap();

        assert!(!contacts.stepped_off);
        assert_eq!(contacts.threshold_n, 10.0);
        assert_eq!(contacts.get(1), ContactInterval { start: 0, end: 100 });
        assert_eq!(contacts.get(2), ContactInterval { start: 149, end: 300 });
        assert_eq!(contacts.get(3), ContactInterval { start: 359, end: 500 });
        assert_eq!(contacts.get(4), ContactInterval { start: 539, end: 699 });
    }

    #[test]
    fn test_fourth_liftoff_marks_step_off() {
        let force = stepped_trace(700.0, &[(100, 150), (300, 360), (500, 540), (650, 700)], 700);
        let contacts = detect_contacts(&force, &SegmentationConfig::default()).unwrap();

        assert!(contacts.stepped_off);
        assert_eq!(contacts.get(4), ContactInterval { start: 539, end: 650 });
    }

    #[test]
    fn test_sweep_raises_threshold_past_flight_noise() {
        let mut force = stepped_trace(700.0, &[(100, 150), (300, 360), (500, 540)], 700);
        // A 12 N bump mid-flight splits the first flight at 10 N
        force[120..125].iter_mut().for_each(|value| *value = 12.0);
        let contacts = detect_contacts(&force, &SegmentationConfig::default()).unwrap();

        assert_eq!(contacts.threshold_n, 15.0);
        assert_eq!(contacts.get(2).start, 149);
    }

    #[test]
    fn test_constant_force_exhausts_sweep() {
        let force = vec![240.0; 4000];
        let err = detect_contacts(&force, &SegmentationConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DetectionError::ContactCount {
                ceiling_n: 100.0,
                liftoffs: 0,
                landings: 0
            }
        );
    }

    #[test]
    fn test_zero_step_sweep_terminates() {
        let config = SegmentationConfig {
            air_threshold_step_n: 0.0,
            ..SegmentationConfig::default()
        };
        let err = detect_contacts(&vec![240.0; 4000], &config).unwrap_err();
        assert!(matches!(err, DetectionError::ContactCount { liftoffs: 0, landings: 0, .. }));
    }

    #[test]
    fn test_invalid_sweep_settings_rejected() {
        assert_eq!(validate_sweep(&SegmentationConfig::default()), Ok(()));

        let with = |start: f64, step: f64, ceiling: f64| SegmentationConfig {
            air_threshold_start_n: start,
            air_threshold_step_n: step,
            air_threshold_ceiling_n: ceiling,
            ..SegmentationConfig::default()
        };
        for config in [
            with(10.0, 0.0, 100.0),
            with(10.0, -5.0, 100.0),
            with(10.0, f64::NAN, 100.0),
            with(10.0, 5.0, f64::INFINITY),
            with(120.0, 5.0, 100.0),
        ] {
            assert!(matches!(
                validate_sweep(&config),
                Err(ComputeError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_sweep_visits_ceiling() {
        assert_eq!(sweep_steps(&SegmentationConfig::default()), 19);
    }

    #[test]
    fn test_capture_starting_in_air_rejected() {
        let force = stepped_trace(700.0, &[(0, 50), (200, 250), (400, 450)], 600);
        assert!(!AirTransitions::find(&force, 10.0).is_three_jump());
    }

    #[test]
    fn test_zero_flight_gaps_clears_inclusive_range() {
        let mut force = stepped_trace(700.0, &[(100, 150), (300, 360), (500, 540)], 700);
        force[120] = 3.0;
        let contacts = detect_contacts(&force, &SegmentationConfig::default()).unwrap();
        zero_flight_gaps(&mut force, &contacts);

        assert!(force[100..150].iter().all(|&value| value == 0.0));
        assert_eq!(force[99], 700.0);
        assert_eq!(force[150], 700.0);
        assert_eq!(force.iter().filter(|&&value| value == 0.0).count(), 50 + 60 + 40);
    }
}
