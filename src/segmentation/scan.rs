//! Finite-state scans over sampled masks
//!
//! Landmark searches either look for a boolean edge in a mask or for a run
//! of consecutive qualifying samples. Both are expressed here so the
//! segmentation and takeoff code only decide what qualifies.

use std::ops::Range;

/// Progress of a run search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No qualifying sample seen since the last reset
    Searching,
    /// `count` consecutive qualifying samples starting at `start`
    Accumulating { start: usize, count: usize },
    /// A run of the required length was found; absorbing
    Confirmed { start: usize },
}

/// Confirms a run of `required` consecutive qualifying samples
#[derive(Debug, Clone)]
pub struct RunScanner {
    required: usize,
    state: ScanState,
}

impl RunScanner {
    pub fn new(required: usize) -> Self {
        Self {
            required: required.max(1),
            state: ScanState::Searching,
        }
    }

    pub fn reset(&mut self) {
        self.state = ScanState::Searching;
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_searching(&self) -> bool {
        self.state == ScanState::Searching
    }

    /// Feed the sample at `index`
    ///
    /// # Returns
    /// The state after the sample. Once confirmed, further samples are ignored.
    pub fn observe(&mut self, index: usize, qualifies: bool) -> ScanState {
        self.state = match (self.state, qualifies) {
            (ScanState::Confirmed { start }, _) => ScanState::Confirmed { start },
            (_, false) => ScanState::Searching,
            (ScanState::Searching, true) => self.advance(index, 1),
            (ScanState::Accumulating { start, count }, true) => self.advance(start, count + 1),
        };
        self.state
    }

    fn advance(&self, start: usize, count: usize) -> ScanState {
        if count >= self.required {
            ScanState::Confirmed { start }
        } else {
            ScanState::Accumulating { start, count }
        }
    }
}

/// Index of the first sample in `range` satisfying `predicate`
pub fn first_where<F>(range: Range<usize>, mut predicate: F) -> Option<usize>
where
    F: FnMut(usize) -> bool,
{
    let mut scanner = RunScanner::new(1);
    for index in range {
        if let ScanState::Confirmed { start } = scanner.observe(index, predicate(index)) {
            return Some(start);
        }
    }
    None
}

/// Direction of a mask transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `mask[i]` false, `mask[i + 1]` true
    Rising,
    /// `mask[i]` true, `mask[i + 1]` false
    Falling,
}

/// Indices `i` in `range` where the mask changes between `i` and `i + 1`
///
/// The index reported is the sample before the change. `range` is clipped so
/// `i + 1` stays inside the mask.
pub fn edges(mask: &[bool], range: Range<usize>, edge: Edge) -> impl Iterator<Item = usize> + '_ {
    let end = range.end.min(mask.len().saturating_sub(1));
    (range.start..end).filter(move |&i| match edge {
        Edge::Rising => !mask[i] && mask[i + 1],
        Edge::Falling => mask[i] && !mask[i + 1],
    })
}

/// Index of the first largest value in `range`
pub fn first_argmax(values: &[f64], range: Range<usize>) -> Option<usize> {
    extreme(values, range, |candidate, best| candidate > best)
}

/// Index of the first smallest value in `range`
pub fn first_argmin(values: &[f64], range: Range<usize>) -> Option<usize> {
    extreme(values, range, |candidate, best| candidate < best)
}

fn extreme<F>(values: &[f64], range: Range<usize>, better: F) -> Option<usize>
where
    F: Fn(f64, f64) -> bool,
{
    let end = range.end.min(values.len());
    let mut best: Option<usize> = None;
    for index in range.start..end {
        match best {
            Some(current) if !better(values[index], values[current]) => {}
            _ => best = Some(index),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_scanner_confirms_after_required() {
        let mut scanner = RunScanner::new(3);
        assert_eq!(scanner.observe(0, true), ScanState::Accumulating { start: 0, count: 1 });
        assert_eq!(scanner.observe(1, false), ScanState::Searching);
        assert_eq!(scanner.observe(2, true), ScanState::Accumulating { start: 2, count: 1 });
        assert_eq!(scanner.observe(3, true), ScanState::Accumulating { start: 2, count: 2 });
        assert_eq!(scanner.observe(4, true), ScanState::Confirmed { start: 2 });
        assert_eq!(scanner.observe(5, false), ScanState::Confirmed { start: 2 });

        scanner.reset();
        assert!(scanner.is_searching());
    }

    #[test]
    fn test_first_where() {
        let values = [5.0, 3.0, 0.5, 0.2, 4.0];
        assert_eq!(first_where(0..5, |i| values[i] < 1.0), Some(2));
        assert_eq!(first_where(3..5, |i| values[i] > 10.0), None);
    }

    #[test]
    fn test_edges_report_sample_before_change() {
        let mask = [false, true, true, false, false, true];
        assert_eq!(edges(&mask, 0..6, Edge::Rising).collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(edges(&mask, 0..6, Edge::Falling).collect::<Vec<_>>(), vec![2]);
        assert_eq!(edges(&mask, 1..4, Edge::Rising).count(), 0);
    }

    #[test]
    fn test_argmax_prefers_first_tie() {
        let values = [1.0, 7.0, 3.0, 7.0, -2.0, -2.0];
        assert_eq!(first_argmax(&values, 0..6), Some(1));
        assert_eq!(first_argmin(&values, 0..6), Some(4));
        assert_eq!(first_argmin(&values, 2..4), Some(2));
        assert_eq!(first_argmax(&values, 3..3), None);
    }
}
