//! CSV capture and report I/O.
//!
//! Lab exports carry a few preamble lines before the header row; callers
//! pass how many to skip. Empty cells are read as NaN so validation reports
//! them as missing values instead of failing here.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::capture::{Channel, RawTable, Sensor};
use crate::metrics::{kinematics::KinematicTrace, MetricsReport};
use crate::segmentation::CleanedSignal;

/// Preamble lines written by the plate exporter
pub const LAB_EXPORT_SKIP_ROWS: usize = 6;

/// Read a headered capture, skipping `skip_rows` lines first
pub fn read_capture(path: &Path, skip_rows: usize) -> Result<RawTable> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_capture(&text, skip_rows).with_context(|| format!("parsing {}", path.display()))
}

/// Parse capture text, see [`read_capture`]
pub fn parse_capture(text: &str, skip_rows: usize) -> Result<RawTable> {
    let body: String = text.split_inclusive('\n').skip(skip_rows).collect();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if names.is_empty() {
        return Err(anyhow!("capture has no header row"));
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (index, column) in columns.iter_mut().enumerate() {
            let value = match record.get(index) {
                Some(cell) if !cell.is_empty() => cell
                    .parse::<f64>()
                    .with_context(|| format!("row {} column '{}': not a number: {}", row, names[index], cell))?,
                _ => f64::NAN,
            };
            column.push(value);
        }
    }

    log::debug!(
        "[Fixtures] Parsed capture with {} columns x {} rows",
        names.len(),
        columns.first().map_or(0, Vec::len)
    );
    Ok(RawTable::new(names, columns)?)
}

/// Write a capture with a plain header row
pub fn write_capture(table: &RawTable, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(table.names())?;
    for index in 0..table.row_count() {
        if let Some(row) = table.row(index) {
            writer.write_record(row.iter().map(f64::to_string))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write one metrics row per jump
pub fn write_metrics_csv(report: &MetricsReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    write_metrics_rows(report, &mut writer)
}

fn write_metrics_rows<W: Write>(report: &MetricsReport, writer: &mut csv::Writer<W>) -> Result<()> {
    writer.write_record(std::iter::once("jump").chain(MetricsReport::column_keys()))?;
    for (jump, row) in report.jumps.iter().zip(report.rows()) {
        writer.write_record(
            std::iter::once(jump.jump.to_string()).chain(row.iter().map(|value| format!("{:.6}", value))),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the cleaned signal with the kinematic trace alongside
pub fn write_signal_csv(signal: &CleanedSignal, kinematics: &KinematicTrace, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header: Vec<String> = vec!["time".to_string()];
    let mut series: Vec<&[f64]> = vec![&signal.time];
    for (slot, sensor) in Sensor::ALL.into_iter().enumerate() {
        let trace = signal.sensor(sensor);
        for channel in Channel::ALL {
            if let Some(values) = trace.channel(channel) {
                header.push(sensor.column(channel).to_string());
                series.push(values);
            }
        }
        header.push(format!("ground_angle{}", slot + 1));
        series.push(&trace.ground_angle);
    }
    header.push("total_vy".to_string());
    series.push(&signal.total_vy);
    for (name, values) in [
        ("body_acc_y", &kinematics.acceleration),
        ("body_vel_y", &kinematics.velocity),
        ("body_pos_y", &kinematics.position),
    ] {
        header.push(name.to_string());
        series.push(values);
    }

    writer.write_record(&header)?;
    for row in 0..signal.len() {
        writer.write_record(
            series
                .iter()
                .map(|values| values.get(row).map_or_else(String::new, f64::to_string)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_preamble_and_reads_empty_as_nan() {
        let text = "exported by plate\nsubject: A\ntime,ground_force1_vy\n0.000,1.5\n0.001,\n0.002,3\n";
        let table = parse_capture(text, 2).unwrap();
        assert_eq!(table.names(), &["time".to_string(), "ground_force1_vy".to_string()]);
        let force = table.column("ground_force1_vy").unwrap();
        assert_eq!(force[0], 1.5);
        assert!(force[1].is_nan());
        assert_eq!(force[2], 3.0);
    }

    #[test]
    fn test_short_rows_are_padded_with_nan() {
        let table = parse_capture("a,b\n1,2\n3\n", 0).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(table.column("b").unwrap()[1].is_nan());
    }

    #[test]
    fn test_rejects_text_cells() {
        let err = parse_capture("a,b\n1,abc\n", 0).unwrap_err();
        assert!(format!("{:#}", err).contains("not a number"));
    }

    #[test]
    fn test_capture_roundtrip_through_file() {
        let table = RawTable::from_columns(vec![("time", vec![0.0, 0.001]), ("x", vec![-2.5, 1e-7])]).unwrap();
        let path = std::env::temp_dir().join(format!("squat_jump_csv_{}.csv", std::process::id()));
        write_capture(&table, &path).unwrap();
        let back = read_capture(&path, 0).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(back, table);
    }
}
