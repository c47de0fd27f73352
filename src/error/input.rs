// Input-shape error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Input error code constants
///
/// Error code range: 1001-1006
pub struct InputErrorCodes {}

impl InputErrorCodes {
    /// Table does not have the expected number of columns
    pub const COLUMN_COUNT: i32 = 1001;

    /// A required channel is absent
    pub const MISSING_COLUMN: i32 = 1002;

    /// Row count outside the plausible bounds for a three-jump capture
    pub const ROW_COUNT: i32 = 1003;

    /// A cell is empty or not a number
    pub const MISSING_VALUE: i32 = 1004;

    /// Time column is not contiguous at 1000 Hz
    pub const TIME_DISCONTINUITY: i32 = 1005;

    /// Columns have different lengths
    pub const RAGGED_COLUMNS: i32 = 1006;
}

/// Log an input error with structured context
pub fn log_input_error(err: &InputError, context: &str) {
    error!(
        "Input error in {}: code={}, component=Validation, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Input-shape errors
///
/// Raised eagerly before any filtering or segmentation work happens.
///
/// Error code range: 1001-1006
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Wrong number of columns
    ColumnCount { expected: usize, found: usize },

    /// Required column missing
    MissingColumn { name: String },

    /// Row count outside `[min, max]`
    RowCount { rows: usize, min: usize, max: usize },

    /// NaN or empty cell
    MissingValue { column: String, row: usize },

    /// Time delta at `row` differs from the sample period
    TimeDiscontinuity { row: usize, delta: f64 },

    /// Column length differs from the first column
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
}

impl ErrorCode for InputError {
    fn code(&self) -> i32 {
        match self {
            InputError::ColumnCount { .. } => InputErrorCodes::COLUMN_COUNT,
            InputError::MissingColumn { .. } => InputErrorCodes::MISSING_COLUMN,
            InputError::RowCount { .. } => InputErrorCodes::ROW_COUNT,
            InputError::MissingValue { .. } => InputErrorCodes::MISSING_VALUE,
            InputError::TimeDiscontinuity { .. } => InputErrorCodes::TIME_DISCONTINUITY,
            InputError::RaggedColumns { .. } => InputErrorCodes::RAGGED_COLUMNS,
        }
    }

    fn message(&self) -> String {
        match self {
            InputError::ColumnCount { expected, found } => {
                format!("Expected {} columns, found {}", expected, found)
            }
            InputError::MissingColumn { name } => {
                format!("Required column '{}' is missing", name)
            }
            InputError::RowCount { rows, min, max } => format!(
                "Capture has {} rows; a three-jump capture needs between {} and {}",
                rows, min, max
            ),
            InputError::MissingValue { column, row } => {
                format!("Column '{}' has no value at row {}", column, row)
            }
            InputError::TimeDiscontinuity { row, delta } => format!(
                "Time column is not sampled at 1000 Hz: delta {:.6} s before row {}",
                delta, row
            ),
            InputError::RaggedColumns {
                column,
                expected,
                found,
            } => format!(
                "Column '{}' has {} rows, expected {}",
                column, found, expected
            ),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InputError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_codes() {
        assert_eq!(
            InputError::ColumnCount {
                expected: 19,
                found: 18
            }
            .code(),
            InputErrorCodes::COLUMN_COUNT
        );
        assert_eq!(
            InputError::RowCount {
                rows: 10,
                min: 3000,
                max: 30000
            }
            .code(),
            InputErrorCodes::ROW_COUNT
        );
        assert_eq!(
            InputError::TimeDiscontinuity {
                row: 4,
                delta: 0.002
            }
            .code(),
            InputErrorCodes::TIME_DISCONTINUITY
        );
    }

    #[test]
    fn test_input_error_names_offender() {
        let err = InputError::MissingColumn {
            name: "ground_force2_pz".to_string(),
        };
        assert!(err.message().contains("ground_force2_pz"));
        assert!(err.to_string().contains("code 1002"));
    }
}
