// Phase boundary detection
//
// Each contact is searched for the landmarks of the jump leaving it and of
// the landing arriving in it:
// 1. Concentric start is the force maximum of the search window
// 2. Eccentric start is the force minimum before it
// 3. Unloading (dF/dt below -rate) edges before the eccentric start mark the
//    next jump's start (rising edge after the cutoff) and the previous
//    landing's end (last falling edge before the cutoff, moved forward to
//    the first settled sample)
// The first contact only starts a jump, the last one only ends one.

use serde::Serialize;
use std::ops::Range;

use crate::config::SegmentationConfig;
use crate::error::{DetectionError, Landmark};
use crate::segmentation::contact::{ContactInterval, ContactSet};
use crate::segmentation::scan::{edges, first_argmax, first_argmin, first_where, Edge};

/// Half-open sample range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseBounds {
    pub start: usize,
    pub end: usize,
}

impl PhaseBounds {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn samples(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Named phases of one jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Event,
    Eccentric,
    Concentric,
    Jump,
    Landing,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Event,
        Phase::Eccentric,
        Phase::Concentric,
        Phase::Jump,
        Phase::Landing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Event => "Event",
            Phase::Eccentric => "Eccentric Phase",
            Phase::Concentric => "Concentric Phase",
            Phase::Jump => "Jump Phase",
            Phase::Landing => "Landing Phase",
        }
    }
}

/// Boundaries of one jump, indices into the cleaned signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JumpPhases {
    /// 1-based jump number
    pub jump: usize,
    pub event: PhaseBounds,
    pub eccentric: PhaseBounds,
    pub concentric: PhaseBounds,
    /// Eccentric start to takeoff
    pub jump_phase: PhaseBounds,
    pub landing: PhaseBounds,
}

impl JumpPhases {
    pub fn bounds(&self, phase: Phase) -> PhaseBounds {
        match phase {
            Phase::Event => self.event,
            Phase::Eccentric => self.eccentric,
            Phase::Concentric => self.concentric,
            Phase::Jump => self.jump_phase,
            Phase::Landing => self.landing,
        }
    }

    fn check_order(&self) -> Result<(), DetectionError> {
        let checkpoints = [
            ("event start", self.event.start),
            ("eccentric start", self.eccentric.start),
            ("concentric start", self.concentric.start),
            ("takeoff", self.concentric.end),
            ("landing", self.landing.start),
            ("event end", self.event.end),
        ];
        for pair in checkpoints.windows(2) {
            let ((before, a), (after, b)) = (pair[0], pair[1]);
            // Takeoff and landing coincide for a one-sample flight
            let ordered = if after == "landing" { a <= b } else { a < b };
            if !ordered {
                return Err(DetectionError::PhaseOrder {
                    jump: self.jump,
                    detail: format!("{} ({}) is not before {} ({})", before, a, after, b),
                });
            }
        }
        Ok(())
    }
}

/// Phase boundaries of all three jumps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTable {
    pub jumps: [JumpPhases; 3],
}

impl PhaseTable {
    /// Combine per-contact landmarks into jump phases
    ///
    /// # Arguments
    /// * `contacts` - The four ground contacts
    /// * `onsets` - Landmarks of the jump leaving contacts 1..3
    /// * `event_ends` - Landing completion found in contacts 2..4
    pub fn assemble(
        contacts: &ContactSet,
        onsets: &[JumpOnset; 3],
        event_ends: &[usize; 3],
    ) -> Result<Self, DetectionError> {
        let mut jumps = [JumpPhases {
            jump: 0,
            event: PhaseBounds::new(0, 0),
            eccentric: PhaseBounds::new(0, 0),
            concentric: PhaseBounds::new(0, 0),
            jump_phase: PhaseBounds::new(0, 0),
            landing: PhaseBounds::new(0, 0),
        }; 3];

        for (slot, onset) in onsets.iter().enumerate() {
            let takeoff_contact = contacts.contacts[slot];
            let landing_contact = contacts.contacts[slot + 1];
            let takeoff = takeoff_contact.end;
            let event_end = event_ends[slot];

            if onset.event_start < takeoff_contact.start {
                return Err(DetectionError::PhaseOrder {
                    jump: slot + 1,
                    detail: format!(
                        "event start ({}) precedes its contact ({})",
                        onset.event_start, takeoff_contact.start
                    ),
                });
            }

            let phases = JumpPhases {
                jump: slot + 1,
                event: PhaseBounds::new(onset.event_start, event_end),
                eccentric: PhaseBounds::new(onset.eccentric_start, onset.concentric_start),
                concentric: PhaseBounds::new(onset.concentric_start, takeoff),
                jump_phase: PhaseBounds::new(onset.eccentric_start, takeoff),
                landing: PhaseBounds::new(landing_contact.start, event_end),
            };
            phases.check_order()?;

            if slot > 0 && jumps[slot - 1].event.end >= phases.event.start {
                return Err(DetectionError::PhaseOrder {
                    jump: slot + 1,
                    detail: format!(
                        "starts at {} before jump {} ends at {}",
                        phases.event.start,
                        slot,
                        jumps[slot - 1].event.end
                    ),
                });
            }
            jumps[slot] = phases;
        }

        Ok(Self { jumps })
    }

    /// Jump by 1-based number, `None` outside 1..=3
    pub fn jump(&self, number: usize) -> Option<&JumpPhases> {
        self.jumps.get(number.checked_sub(1)?)
    }

    /// `(jump, phase, bounds)` rows in table order
    pub fn rows(&self) -> impl Iterator<Item = (usize, Phase, PhaseBounds)> + '_ {
        self.jumps.iter().flat_map(|jump| {
            Phase::ALL
                .into_iter()
                .map(move |phase| (jump.jump, phase, jump.bounds(phase)))
        })
    }
}

/// Landmarks of a jump leaving a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpOnset {
    pub event_start: usize,
    pub eccentric_start: usize,
    pub concentric_start: usize,
}

/// Searches one contact at a time over the filtered total force
pub struct LandmarkFinder<'a> {
    force: &'a [f64],
    derivative: &'a [f64],
    unloading: Vec<bool>,
    config: &'a SegmentationConfig,
}

impl<'a> LandmarkFinder<'a> {
    pub fn new(force: &'a [f64], derivative: &'a [f64], config: &'a SegmentationConfig) -> Self {
        let unloading = derivative
            .iter()
            .map(|&value| value < -config.unloading_rate_n_per_s)
            .collect();
        Self {
            force,
            derivative,
            unloading,
            config,
        }
    }

    /// First contact: the subject stands, then starts jump 1
    pub fn first_contact(&self, contact: ContactInterval) -> Result<JumpOnset, DetectionError> {
        let (eccentric_start, concentric_start) = self.drive(1, contact.start, contact.end)?;
        let scan = contact.start..eccentric_start.saturating_sub(self.config.eccentric_guard_samples);

        let event_start = if scan.start == 0 && !scan.is_empty() && self.unloading[0] {
            Some(0)
        } else {
            edges(&self.unloading, scan, Edge::Rising).next()
        };

        let event_start = event_start.ok_or(DetectionError::LandmarkNotFound {
            contact: 1,
            landmark: Landmark::EventStart,
        })?;

        log::debug!(
            "[Segmentation] contact 1: event_start={} eccentric={} concentric={}",
            event_start,
            eccentric_start,
            concentric_start
        );
        Ok(JumpOnset {
            event_start,
            eccentric_start,
            concentric_start,
        })
    }

    /// Contacts 2 and 3: a landing before `cutoff`, the next jump after it
    ///
    /// # Returns
    /// The landing's event end and the next jump's onset
    pub fn middle_contact(
        &self,
        number: usize,
        contact: ContactInterval,
        cutoff: usize,
    ) -> Result<(usize, JumpOnset), DetectionError> {
        let (eccentric_start, concentric_start) = self.drive(number, cutoff, contact.end)?;
        let scan = contact.start..eccentric_start.saturating_sub(self.config.eccentric_guard_samples);

        let last_unloading_end = edges(&self.unloading, scan.clone(), Edge::Falling)
            .filter(|&index| index < cutoff)
            .last();
        let next_start = edges(&self.unloading, scan, Edge::Rising).find(|&index| index > cutoff);

        let event_end = last_unloading_end
            .and_then(|index| {
                first_where(index + self.config.settle_offset_samples..cutoff, |i| {
                    self.derivative[i].abs() < self.config.settle_rate_n_per_s
                })
            })
            .ok_or(DetectionError::LandmarkNotFound {
                contact: number,
                landmark: Landmark::EventEnd,
            })?;

        let event_start = next_start.ok_or(DetectionError::LandmarkNotFound {
            contact: number,
            landmark: Landmark::EventStart,
        })?;

        log::debug!(
            "[Segmentation] contact {}: event_end={} event_start={} eccentric={} concentric={}",
            number,
            event_end,
            event_start,
            eccentric_start,
            concentric_start
        );
        Ok((
            event_end,
            JumpOnset {
                event_start,
                eccentric_start,
                concentric_start,
            },
        ))
    }

    /// Final contact: only the last landing ends here
    pub fn final_contact(
        &self,
        number: usize,
        contact: ContactInterval,
        cutoff: usize,
    ) -> Result<usize, DetectionError> {
        let scan = contact.start + self.config.final_landing_offset_samples..cutoff;
        let event_end = edges(&self.unloading, scan, Edge::Falling)
            .last()
            .ok_or(DetectionError::LandmarkNotFound {
                contact: number,
                landmark: Landmark::EventEnd,
            })?;

        log::debug!("[Segmentation] contact {}: event_end={}", number, event_end);
        Ok(event_end)
    }

    /// Eccentric and concentric start inside `[window_start, window_end)`
    fn drive(
        &self,
        number: usize,
        window_start: usize,
        window_end: usize,
    ) -> Result<(usize, usize), DetectionError> {
        let concentric_start = first_argmax(self.force, window_start..window_end).ok_or(
            DetectionError::LandmarkNotFound {
                contact: number,
                landmark: Landmark::ConcentricStart,
            },
        )?;
        let eccentric_start = first_argmin(self.force, window_start..concentric_start).ok_or(
            DetectionError::LandmarkNotFound {
                contact: number,
                landmark: Landmark::EccentricStart,
            },
        )?;
        Ok((eccentric_start, concentric_start))
    }
}

#[cfg(test)]
#[path = "phases_tests.rs"]
mod tests;
