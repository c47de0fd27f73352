// Static support detection and body-weight estimate
//
// A sample is static when the force derivative stays inside +/- the static
// rate and the subject is still on the plate for the current contact. For
// each contact the longest static run is picked from its recorded
// start/end transitions; the longest run overall gives the body weight.

use serde::Serialize;

use crate::error::{ComputeError, DetectionError};
use crate::segmentation::contact::ContactSet;
use crate::segmentation::scan::{edges, Edge};
use crate::GRAVITY;

/// Forward difference divided by `dt`, last value repeated
pub fn force_derivative(force: &[f64], dt: f64) -> Result<Vec<f64>, ComputeError> {
    if force.len() < 2 {
        return Err(ComputeError::SeriesTooShort {
            what: "force derivative input",
            len: force.len(),
            required: 2,
        });
    }
    let mut derivative: Vec<f64> = force.windows(2).map(|pair| (pair[1] - pair[0]) / dt).collect();
    let last = derivative[derivative.len() - 1];
    derivative.push(last);
    Ok(derivative)
}

/// Static support mask over the whole capture
pub fn static_mask(derivative: &[f64], contacts: &ContactSet, rate_limit: f64) -> Vec<bool> {
    derivative
        .iter()
        .enumerate()
        .map(|(index, value)| value.abs() < rate_limit && index < contacts.support_end(index))
        .collect()
}

/// Half-open sample range `[start, end)` of static support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaticRun {
    pub start: usize,
    pub end: usize,
}

impl StaticRun {
    /// Signed length; pairing may produce inverted runs
    pub fn span(&self) -> i64 {
        self.end as i64 - self.start as i64
    }

    pub fn midpoint(&self) -> usize {
        (self.start + self.end) / 2
    }
}

/// Longest run from recorded static starts and ends
///
/// When the first start precedes the first end the lists pair up
/// positionally. Otherwise the capture opened mid-run and each start pairs
/// with the end that follows it. Ties keep the earlier run.
pub fn longest_static_run(starts: &[usize], ends: &[usize]) -> Option<StaticRun> {
    let (first_start, first_end) = (starts.first()?, ends.first()?);
    let offset = usize::from(first_start > first_end);

    let mut best: Option<StaticRun> = None;
    for (start, end) in starts.iter().zip(ends.iter().skip(offset)) {
        let run = StaticRun {
            start: *start,
            end: *end,
        };
        if best.map_or(true, |current| run.span() > current.span()) {
            best = Some(run);
        }
    }
    best
}

/// Longest static run of each of the four contacts
pub fn contact_static_runs(
    mask: &[bool],
    contacts: &ContactSet,
) -> Result<[StaticRun; 4], DetectionError> {
    let starts: Vec<usize> = edges(mask, 0..mask.len(), Edge::Rising).collect();
    let ends: Vec<usize> = edges(mask, 0..mask.len(), Edge::Falling).collect();

    let mut runs = [StaticRun { start: 0, end: 0 }; 4];
    for (slot, contact) in contacts.contacts.iter().enumerate() {
        let within = |index: &&usize| contact.contains(**index);
        let contact_starts: Vec<usize> = starts.iter().filter(within).copied().collect();
        let contact_ends: Vec<usize> = ends.iter().filter(within).copied().collect();
        runs[slot] = longest_static_run(&contact_starts, &contact_ends)
            .ok_or(DetectionError::NoStaticPeriod { contact: slot + 1 })?;
        log::debug!(
            "[Segmentation] contact {} static run {:?}",
            slot + 1,
            runs[slot]
        );
    }
    Ok(runs)
}

/// Body weight taken from the longest static run across contacts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightEstimate {
    pub mass_kg: f64,
    /// 1-based contact the run came from
    pub contact: usize,
    pub run: StaticRun,
}

pub fn estimate_weight(total_force: &[f64], runs: &[StaticRun; 4]) -> Result<WeightEstimate, ComputeError> {
    let mut chosen = 0;
    for (slot, run) in runs.iter().enumerate() {
        if run.span() > runs[chosen].span() {
            chosen = slot;
        }
    }
    let run = runs[chosen];
    let end = run.end.min(total_force.len());
    if run.start >= end {
        return Err(ComputeError::EmptySeries {
            what: "static support interval",
        });
    }

    let window = &total_force[run.start..end];
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    Ok(WeightEstimate {
        mass_kg: mean / GRAVITY,
        contact: chosen + 1,
        run,
    })
}
