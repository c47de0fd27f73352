//! Malformed captures are rejected before any segmentation work

use squat_jump_analyzer::capture::{raw_column_names, validate, RawTable, TIME_COLUMN};
use squat_jump_analyzer::config::ValidationConfig;
use squat_jump_analyzer::error::{ErrorCode, ErrorKind, InputError, InputErrorCodes, PipelineError};
use squat_jump_analyzer::fixtures::synthetic::{generate, SyntheticJumpSpec};
use squat_jump_analyzer::{process, AppConfig};

fn capture() -> RawTable {
    generate(&SyntheticJumpSpec::default()).expect("synthetic capture").table
}

fn flat_table(rows: usize) -> RawTable {
    let columns = raw_column_names().into_iter().map(|name| {
        let values = if name == TIME_COLUMN {
            (0..rows).map(|i| i as f64 / 1000.0).collect()
        } else {
            vec![0.0; rows]
        };
        (name, values)
    });
    RawTable::from_columns(columns).unwrap()
}

fn input_error(table: &RawTable) -> InputError {
    match process(table, &AppConfig::default()) {
        Err(PipelineError::Input(err)) => err,
        Err(other) => panic!("expected an input error, got {other}"),
        Ok(_) => panic!("expected an input error, capture was processed"),
    }
}

#[test]
fn test_dropped_column() {
    let mut table = capture();
    table.remove_column("ground_force1_vx");
    assert_eq!(
        input_error(&table),
        InputError::ColumnCount {
            expected: 19,
            found: 18
        }
    );
}

#[test]
fn test_renamed_column() {
    let mut table = capture();
    assert!(table.rename_column("ground_force2_pz", "cop2_z"));
    let err = input_error(&table);
    assert_eq!(
        err,
        InputError::MissingColumn {
            name: "ground_force2_pz".to_string()
        }
    );
    assert_eq!(err.code(), InputErrorCodes::MISSING_COLUMN);
    assert!(err.message().contains("ground_force2_pz"));
}

#[test]
fn test_renamed_torque_column_is_accepted() {
    let mut table = capture();
    table.rename_column("ground_torque1_y", "torque1_y");
    assert_eq!(validate(&table, &ValidationConfig::default()), Ok(()));
}

#[test]
fn test_corrupt_time_column() {
    let mut table = capture();
    if let Some(time) = table.column_mut(TIME_COLUMN) {
        time[5000] += 0.5;
    }
    assert!(matches!(
        input_error(&table),
        InputError::TimeDiscontinuity { row: 5000, .. }
    ));
}

#[test]
fn test_resampled_time_column() {
    let mut table = capture();
    if let Some(time) = table.column_mut(TIME_COLUMN) {
        for (row, value) in time.iter_mut().enumerate() {
            *value = row as f64 / 500.0;
        }
    }
    assert!(matches!(
        input_error(&table),
        InputError::TimeDiscontinuity { row: 1, .. }
    ));
}

#[test]
fn test_too_few_rows() {
    let mut table = capture();
    table.truncate(2999);
    assert_eq!(
        input_error(&table),
        InputError::RowCount {
            rows: 2999,
            min: 3000,
            max: 30000
        }
    );
}

#[test]
fn test_too_many_rows() {
    let err = input_error(&flat_table(30001));
    assert!(matches!(err, InputError::RowCount { rows: 30001, .. }));
}

#[test]
fn test_row_bounds_are_inclusive() {
    let config = ValidationConfig::default();
    assert_eq!(validate(&flat_table(3000), &config), Ok(()));
    assert_eq!(validate(&flat_table(30000), &config), Ok(()));
}

#[test]
fn test_missing_value() {
    let mut table = capture();
    if let Some(force) = table.column_mut("ground_force1_vy") {
        force[1234] = f64::NAN;
    }
    let err = process(&table, &AppConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert_eq!(
        err,
        PipelineError::Input(InputError::MissingValue {
            column: "ground_force1_vy".to_string(),
            row: 1234
        })
    );
}
