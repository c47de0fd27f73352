use crate::capture::{required_column_names, RawTable, TIME_COLUMN};
use crate::config::ValidationConfig;
use crate::error::InputError;
use crate::SAMPLE_PERIOD_S;

/// Check the shape of a raw capture before any processing
///
/// Checks run in order: column count, required names, row bounds, missing
/// values, then time contiguity. The first violation is returned.
pub fn validate(table: &RawTable, config: &ValidationConfig) -> Result<(), InputError> {
    if table.column_count() != config.expected_columns {
        return Err(InputError::ColumnCount {
            expected: config.expected_columns,
            found: table.column_count(),
        });
    }

    for name in required_column_names() {
        table.require(name)?;
    }

    let rows = table.row_count();
    if rows < config.min_rows || rows > config.max_rows {
        return Err(InputError::RowCount {
            rows,
            min: config.min_rows,
            max: config.max_rows,
        });
    }

    for name in table.names() {
        if let Some(values) = table.column(name) {
            if let Some(row) = values.iter().position(|value| !value.is_finite()) {
                return Err(InputError::MissingValue {
                    column: name.clone(),
                    row,
                });
            }
        }
    }

    let time = table.require(TIME_COLUMN)?;
    let tolerance = config.time_atol + config.time_rtol * SAMPLE_PERIOD_S;
    for (row, pair) in time.windows(2).enumerate() {
        let delta = pair[1] - pair[0];
        if (delta - SAMPLE_PERIOD_S).abs() > tolerance {
            return Err(InputError::TimeDiscontinuity { row: row + 1, delta });
        }
    }

    Ok(())
}
