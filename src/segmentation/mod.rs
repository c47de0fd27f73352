//! Segmentation engine
//!
//! Turns a validated raw capture into a cleaned signal, the four ground
//! contacts, the subject weight and the phase table of the three jumps.
//!
//! Steps, in order:
//! 1. Validate the capture shape
//! 2. Low-pass every force channel (zero-phase Butterworth)
//! 3. Sum the two vertical channels and sweep for the four contacts
//! 4. Zero the flights, derive ground angles
//! 5. Find static support per contact and estimate the weight
//! 6. Locate jump landmarks contact by contact and assemble the phase table
//! 7. Truncate the signal at the final contact's cutoff

pub mod contact;
pub mod filter;
pub mod phases;
pub mod scan;
pub mod statics;

use serde::Serialize;

use crate::capture::{self, raw_column_names, Channel, RawTable, Sensor, TIME_COLUMN};
use crate::config::AppConfig;
use crate::error::{InputError, PipelineError};
use crate::{SAMPLE_PERIOD_S, SAMPLE_RATE_HZ};

use contact::{detect_contacts, zero_flight_gaps, ContactSet};
use filter::ButterworthLowpass;
use phases::{LandmarkFinder, PhaseTable};
use statics::{contact_static_runs, estimate_weight, force_derivative, static_mask, StaticRun, WeightEstimate};

/// Cleaned channels of one sensor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorTrace {
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub vz: Vec<f64>,
    pub px: Vec<f64>,
    pub pz: Vec<f64>,
    /// Angle between vertical force and the horizontal plane (degrees)
    pub ground_angle: Vec<f64>,
}

impl SensorTrace {
    fn truncate(&mut self, len: usize) {
        for channel in [
            &mut self.vx,
            &mut self.vy,
            &mut self.vz,
            &mut self.px,
            &mut self.pz,
            &mut self.ground_angle,
        ] {
            channel.truncate(len);
        }
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            vx: self.vx[start..end].to_vec(),
            vy: self.vy[start..end].to_vec(),
            vz: self.vz[start..end].to_vec(),
            px: self.px[start..end].to_vec(),
            pz: self.pz[start..end].to_vec(),
            ground_angle: self.ground_angle[start..end].to_vec(),
        }
    }

    /// Channel by capture name; torque and py are not kept
    pub fn channel(&self, channel: Channel) -> Option<&[f64]> {
        match channel {
            Channel::Vx => Some(&self.vx),
            Channel::Vy => Some(&self.vy),
            Channel::Vz => Some(&self.vz),
            Channel::Px => Some(&self.px),
            Channel::Pz => Some(&self.pz),
            Channel::Py => None,
        }
    }
}

/// Angle of the resultant force against the plate, NaN mapped to 0
pub fn ground_angle(vx: f64, vy: f64, vz: f64) -> f64 {
    let angle = (vy / (vx * vx + vz * vz).sqrt()).atan().to_degrees();
    if angle.is_nan() {
        0.0
    } else {
        angle
    }
}

/// Filtered, flight-zeroed signal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedSignal {
    pub time: Vec<f64>,
    pub sensors: [SensorTrace; 2],
    /// Sum of both vertical channels (N)
    pub total_vy: Vec<f64>,
}

impl CleanedSignal {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn sensor(&self, sensor: Sensor) -> &SensorTrace {
        match sensor {
            Sensor::One => &self.sensors[0],
            Sensor::Two => &self.sensors[1],
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.time.truncate(len);
        self.total_vy.truncate(len);
        for sensor in &mut self.sensors {
            sensor.truncate(len);
        }
    }

    /// Rows of one jump's event window, `None` for an unknown jump number
    pub fn jump_slice(&self, phases: &PhaseTable, jump: usize) -> Option<CleanedSignal> {
        let event = phases.jump(jump)?.event;
        let end = event.end.min(self.len());
        let start = event.start.min(end);
        Some(CleanedSignal {
            time: self.time[start..end].to_vec(),
            sensors: [
                self.sensors[0].slice(start, end),
                self.sensors[1].slice(start, end),
            ],
            total_vy: self.total_vy[start..end].to_vec(),
        })
    }

    /// Rebuild a 19-column capture; dropped channels come back as zeros
    pub fn to_raw_table(&self) -> Result<RawTable, InputError> {
        let zeros = vec![0.0; self.len()];
        let mut columns = Vec::with_capacity(19);
        for name in raw_column_names() {
            let values = if name == TIME_COLUMN {
                self.time.clone()
            } else {
                Sensor::ALL
                    .into_iter()
                    .flat_map(|sensor| Channel::ALL.into_iter().map(move |channel| (sensor, channel)))
                    .find(|(sensor, channel)| sensor.column(*channel) == name)
                    .and_then(|(sensor, channel)| self.sensor(sensor).channel(channel))
                    .map_or_else(|| zeros.clone(), <[f64]>::to_vec)
            };
            columns.push((name, values));
        }
        RawTable::from_columns(columns)
    }
}

/// Everything the metrics engine reads
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub signal: CleanedSignal,
    pub contacts: ContactSet,
    /// Cutoff of each contact; contact 1 has none and reports 0
    pub cutoffs: [usize; 4],
    pub static_runs: [StaticRun; 4],
    pub weight: WeightEstimate,
    pub phases: PhaseTable,
}

/// Summary of a segmentation for reports
#[derive(Debug, Clone, Serialize)]
pub struct SegmentationSummary {
    pub rows: usize,
    pub threshold_n: f64,
    pub stepped_off: bool,
    pub contacts: ContactSet,
    pub cutoffs: [usize; 4],
    pub weight: WeightEstimate,
}

impl Segmentation {
    pub fn summary(&self) -> SegmentationSummary {
        SegmentationSummary {
            rows: self.signal.len(),
            threshold_n: self.contacts.threshold_n,
            stepped_off: self.contacts.stepped_off,
            contacts: self.contacts.clone(),
            cutoffs: self.cutoffs,
            weight: self.weight,
        }
    }
}

/// Runs the segmentation steps with one configuration
pub struct Segmenter {
    config: AppConfig,
    filter: ButterworthLowpass,
}

impl Segmenter {
    pub fn new(config: &AppConfig) -> Result<Self, PipelineError> {
        contact::validate_sweep(&config.segmentation)?;
        let filter = ButterworthLowpass::design(
            config.segmentation.filter_order,
            config.segmentation.filter_cutoff_hz,
            SAMPLE_RATE_HZ,
        )?;
        Ok(Self {
            config: config.clone(),
            filter,
        })
    }

    pub fn segment(&self, raw: &RawTable) -> Result<Segmentation, PipelineError> {
        capture::validate(raw, &self.config.validation)?;
        let seg = &self.config.segmentation;

        let time = raw.require(TIME_COLUMN)?.to_vec();
        let mut sensors = [self.clean_sensor(raw, Sensor::One)?, self.clean_sensor(raw, Sensor::Two)?];
        let mut total_vy: Vec<f64> = sensors[0]
            .vy
            .iter()
            .zip(&sensors[1].vy)
            .map(|(one, two)| one + two)
            .collect();

        let contacts = detect_contacts(&total_vy, seg)?;
        zero_flight_gaps(&mut total_vy, &contacts);
        for sensor in &mut sensors {
            zero_flight_gaps(&mut sensor.vy, &contacts);
            sensor.ground_angle = sensor
                .vx
                .iter()
                .zip(&sensor.vy)
                .zip(&sensor.vz)
                .map(|((&vx, &vy), &vz)| ground_angle(vx, vy, vz))
                .collect();
        }

        let derivative = force_derivative(&total_vy, SAMPLE_PERIOD_S)?;
        let mask = static_mask(&derivative, &contacts, seg.static_rate_n_per_s);
        let static_runs = contact_static_runs(&mask, &contacts)?;
        let weight = estimate_weight(&total_vy, &static_runs)?;
        log::info!(
            "[Segmentation] Weight {:.2} kg from contact {} samples {}..{}",
            weight.mass_kg,
            weight.contact,
            weight.run.start,
            weight.run.end
        );

        let final_cutoff = if contacts.stepped_off {
            static_runs[3].midpoint()
        } else {
            contacts.get(4).end
        };
        let cutoffs = [0, static_runs[1].midpoint(), static_runs[2].midpoint(), final_cutoff];

        let finder = LandmarkFinder::new(&total_vy, &derivative, seg);
        let first = finder.first_contact(contacts.get(1))?;
        let (end_1, second) = finder.middle_contact(2, contacts.get(2), cutoffs[1])?;
        let (end_2, third) = finder.middle_contact(3, contacts.get(3), cutoffs[2])?;
        let end_3 = finder.final_contact(4, contacts.get(4), cutoffs[3])?;
        let phases = PhaseTable::assemble(&contacts, &[first, second, third], &[end_1, end_2, end_3])?;

        let mut signal = CleanedSignal {
            time,
            sensors,
            total_vy,
        };
        signal.truncate(final_cutoff);
        log::info!(
            "[Segmentation] {} jumps segmented, signal truncated to {} samples",
            phases.jumps.len(),
            signal.len()
        );

        Ok(Segmentation {
            signal,
            contacts,
            cutoffs,
            static_runs,
            weight,
            phases,
        })
    }

    fn clean_sensor(&self, raw: &RawTable, sensor: Sensor) -> Result<SensorTrace, PipelineError> {
        let filtered = |channel: Channel| -> Result<Vec<f64>, PipelineError> {
            let values = raw.require(sensor.column(channel))?;
            Ok(self.filter.filtfilt(values)?)
        };
        Ok(SensorTrace {
            vx: filtered(Channel::Vx)?,
            vy: filtered(Channel::Vy)?,
            vz: filtered(Channel::Vz)?,
            px: raw.require(sensor.column(Channel::Px))?.to_vec(),
            pz: raw.require(sensor.column(Channel::Pz))?.to_vec(),
            ground_angle: Vec::new(),
        })
    }
}
