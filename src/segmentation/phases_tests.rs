use super::*;
use crate::segmentation::statics::force_derivative;

/// Thresholds scaled for unit-spaced toy traces
fn toy_config() -> SegmentationConfig {
    SegmentationConfig {
        unloading_rate_n_per_s: 0.5,
        settle_rate_n_per_s: 0.05,
        settle_offset_samples: 2,
        eccentric_guard_samples: 1,
        final_landing_offset_samples: 2,
        ..SegmentationConfig::default()
    }
}

/// Landing impact, quiet stance, then unloading dip and drive
fn middle_trace() -> Vec<f64> {
    let mut force = vec![0.0, 5.0, 10.0, 8.0, 6.0];
    force.extend(vec![4.0; 16]);
    force.extend([3.0, 2.0, 1.0, 5.0, 9.0, 12.0, 6.0, 0.0, 0.0]);
    force
}

#[test]
fn test_first_contact_landmarks() {
    let force = vec![4.0, 4.0, 4.0, 4.0, 3.0, 2.0, 1.0, 5.0, 9.0, 12.0, 6.0, 0.0];
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = toy_config();
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    let onset = finder
        .first_contact(ContactInterval { start: 0, end: 11 })
        .unwrap();
    assert_eq!(
        onset,
        JumpOnset {
            event_start: 2,
            eccentric_start: 6,
            concentric_start: 9
        }
    );
}

#[test]
fn test_first_contact_unloading_from_first_sample() {
    let force = vec![4.0, 3.0, 2.0, 1.0, 1.0, 1.0, 1.0, 5.0, 9.0, 12.0, 6.0, 0.0];
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = toy_config();
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    let onset = finder
        .first_contact(ContactInterval { start: 0, end: 11 })
        .unwrap();
    assert_eq!(onset.event_start, 0);
    assert_eq!(onset.eccentric_start, 3);
}

#[test]
fn test_middle_contact_landmarks() {
    let force = middle_trace();
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = toy_config();
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    let (event_end, onset) = finder
        .middle_contact(2, ContactInterval { start: 0, end: 28 }, 15)
        .unwrap();
    assert_eq!(event_end, 6);
    assert_eq!(
        onset,
        JumpOnset {
            event_start: 19,
            eccentric_start: 23,
            concentric_start: 26
        }
    );
}

#[test]
fn test_middle_contact_without_settling_fails() {
    let force = middle_trace();
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = SegmentationConfig {
        settle_rate_n_per_s: 0.0,
        ..toy_config()
    };
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    assert_eq!(
        finder.middle_contact(3, ContactInterval { start: 0, end: 28 }, 15),
        Err(DetectionError::LandmarkNotFound {
            contact: 3,
            landmark: Landmark::EventEnd
        })
    );
}

#[test]
fn test_first_contact_without_unloading_fails() {
    // Weight drifts down too slowly to count as unloading before the drive
    let force = vec![4.0, 4.0, 3.8, 3.6, 3.4, 3.2, 5.0, 9.0, 12.0, 6.0, 0.0];
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = toy_config();
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    assert_eq!(
        finder.first_contact(ContactInterval { start: 0, end: 10 }),
        Err(DetectionError::LandmarkNotFound {
            contact: 1,
            landmark: Landmark::EventStart
        })
    );
}

#[test]
fn test_middle_contact_without_next_unloading_fails() {
    let mut force = vec![0.0, 5.0, 10.0, 8.0, 6.0];
    force.extend(vec![4.0; 16]);
    force.extend([3.8, 3.6, 3.4, 5.0, 9.0, 12.0, 6.0, 0.0, 0.0]);
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = toy_config();
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    assert_eq!(
        finder.middle_contact(2, ContactInterval { start: 0, end: 28 }, 15),
        Err(DetectionError::LandmarkNotFound {
            contact: 2,
            landmark: Landmark::EventStart
        })
    );
}

#[test]
fn test_final_contact_takes_last_unloading_end() {
    let force = vec![0.0, 5.0, 10.0, 8.0, 6.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0];
    let derivative = force_derivative(&force, 1.0).unwrap();
    let config = toy_config();
    let finder = LandmarkFinder::new(&force, &derivative, &config);

    assert_eq!(
        finder.final_contact(4, ContactInterval { start: 0, end: 11 }, 11),
        Ok(4)
    );

    let flat = vec![4.0; 12];
    let derivative = force_derivative(&flat, 1.0).unwrap();
    let finder = LandmarkFinder::new(&flat, &derivative, &config);
    assert_eq!(
        finder.final_contact(4, ContactInterval { start: 0, end: 11 }, 11),
        Err(DetectionError::LandmarkNotFound {
            contact: 4,
            landmark: Landmark::EventEnd
        })
    );
}

fn contact_set() -> ContactSet {
    ContactSet {
        contacts: [
            ContactInterval { start: 0, end: 100 },
            ContactInterval { start: 150, end: 300 },
            ContactInterval { start: 350, end: 500 },
            ContactInterval { start: 550, end: 700 },
        ],
        stepped_off: false,
        threshold_n: 10.0,
    }
}

fn onsets() -> [JumpOnset; 3] {
    [
        JumpOnset {
            event_start: 10,
            eccentric_start: 40,
            concentric_start: 70,
        },
        JumpOnset {
            event_start: 220,
            eccentric_start: 240,
            concentric_start: 270,
        },
        JumpOnset {
            event_start: 420,
            eccentric_start: 440,
            concentric_start: 470,
        },
    ]
}

#[test]
fn test_assemble_phase_table() {
    let table = PhaseTable::assemble(&contact_set(), &onsets(), &[180, 380, 600]).unwrap();

    let first = table.jump(1).unwrap();
    assert_eq!(first.event, PhaseBounds::new(10, 180));
    assert_eq!(first.eccentric, PhaseBounds::new(40, 70));
    assert_eq!(first.concentric, PhaseBounds::new(70, 100));
    assert_eq!(first.jump_phase, PhaseBounds::new(40, 100));
    assert_eq!(first.landing, PhaseBounds::new(150, 180));
    assert_eq!(table.jump(3).unwrap().landing, PhaseBounds::new(550, 600));
    assert!(table.jump(0).is_none());
    assert!(table.jump(4).is_none());

    assert_eq!(table.rows().count(), 15);
    assert_eq!(
        table.rows().nth(7),
        Some((2, Phase::Concentric, PhaseBounds::new(270, 300)))
    );
}

#[test]
fn test_overlapping_jumps_rejected() {
    let mut onsets = onsets();
    onsets[1].event_start = 170;
    assert!(matches!(
        PhaseTable::assemble(&contact_set(), &onsets, &[180, 380, 600]),
        Err(DetectionError::PhaseOrder { jump: 2, .. })
    ));
}

#[test]
fn test_inverted_drive_rejected() {
    let mut onsets = onsets();
    onsets[0].eccentric_start = 80;
    assert!(matches!(
        PhaseTable::assemble(&contact_set(), &onsets, &[180, 380, 600]),
        Err(DetectionError::PhaseOrder { jump: 1, .. })
    ));
}
