use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use squat_jump_analyzer::capture::{raw_column_names, RawTable, TIME_COLUMN};
use squat_jump_analyzer::fixtures::csv_io::write_capture;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_squat_jump_cli"))
}

/// Fresh scratch directory per test
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("squat_jump_cli_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn synth(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{name}.csv"));
    let output = cli()
        .args(["synth", "--output", &path_arg(&path), "--seed", "11"])
        .output()
        .expect("failed to run squat_jump_cli synth");
    assert!(output.status.success(), "synth exited with {:?}", output.status.code());
    let truth: Value = serde_json::from_slice(&output.stdout).expect("truth JSON payload");
    assert_eq!(truth["mass_kg"], 75.0);
    path
}

#[test]
fn analyze_synthetic_capture_succeeds() {
    let dir = scratch_dir("analyze");
    let capture = synth(&dir, "session");
    let metrics_csv = dir.join("metrics.csv");
    let signal_csv = dir.join("signal.csv");

    let output = cli()
        .args([
            "analyze",
            &path_arg(&capture),
            "--skip-rows",
            "0",
            "--metrics-csv",
            &path_arg(&metrics_csv),
            "--signal-csv",
            &path_arg(&signal_csv),
        ])
        .output()
        .expect("failed to run squat_jump_cli analyze");
    assert!(
        output.status.success(),
        "CLI exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("analysis report JSON payload");
    assert_eq!(json["source"], "session");
    assert_eq!(json["metrics"]["jumps"].as_array().map(Vec::len), Some(3));
    let weight = json["summary"]["weight"]["mass_kg"].as_f64().unwrap_or_default();
    assert!((weight - 75.0).abs() < 0.75, "weight {weight}");

    let metrics = fs::read_to_string(&metrics_csv).expect("metrics CSV written");
    let lines: Vec<&str> = metrics.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("jump,weight(kg),jump_height(cm)"));

    let signal = fs::read_to_string(&signal_csv).expect("signal CSV written");
    let header = signal.lines().next().unwrap_or_default();
    assert!(header.contains("body_vel_y"));
    assert!(header.contains("ground_angle2"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn analyze_detects_expectation_mismatch() {
    let dir = scratch_dir("mismatch");
    let capture = synth(&dir, "session");
    let expect = dir.join("wrong.expect.json");
    fs::write(
        &expect,
        r#"{"fixture": "session", "weight_kg": 150.0, "jumps": [{"jump": 1, "peak_force(N)": 500.0}]}"#,
    )
    .expect("write expectation");

    let output = cli()
        .args([
            "analyze",
            &path_arg(&capture),
            "--skip-rows",
            "0",
            "--expect",
            &path_arg(&expect),
        ])
        .output()
        .expect("failed to run mismatch analyze");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("\"failures\""),
        "expected diff JSON in stderr, got {stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn analyze_reports_input_error() {
    let dir = scratch_dir("input");
    let capture = dir.join("short.csv");
    fs::write(&capture, "time,ground_force1_vy\n0.000,700\n0.001,700\n").expect("write capture");

    let output = cli()
        .args(["analyze", &path_arg(&capture), "--skip-rows", "0"])
        .output()
        .expect("failed to run analyze");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("ColumnCount"), "got {stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn analyze_reports_detection_failure() {
    let dir = scratch_dir("detection");
    let rows = 4000;
    let columns = raw_column_names().into_iter().map(|name| {
        let values = if name == TIME_COLUMN {
            (0..rows).map(|i| i as f64 / 1000.0).collect()
        } else if name.ends_with("_vy") {
            vec![350.0; rows]
        } else {
            vec![0.0; rows]
        };
        (name, values)
    });
    let capture = dir.join("standing.csv");
    write_capture(&RawTable::from_columns(columns).unwrap(), &capture).expect("write capture");

    let output = cli()
        .args(["analyze", &path_arg(&capture), "--skip-rows", "0"])
        .output()
        .expect("failed to run analyze");
    assert_eq!(output.status.code(), Some(4));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn dump_fixtures_lists_assets() {
    let dir = scratch_dir("dump");
    synth(&dir, "reference");
    fs::write(dir.join("reference.expect.json"), r#"{"fixture": "reference"}"#).expect("write expectation");

    let output = cli()
        .args(["--fixtures-dir", &path_arg(&dir), "dump-fixtures"])
        .output()
        .expect("failed to run dump-fixtures");
    assert!(output.status.success());
    let listing: Value = serde_json::from_slice(&output.stdout).expect("fixture listing JSON");
    let fixtures = listing.as_array().cloned().unwrap_or_default();
    assert_eq!(fixtures.len(), 1);
    assert_eq!(fixtures[0]["name"], "reference");
    assert!(fixtures[0]["expect_path"].is_string());

    let _ = fs::remove_dir_all(&dir);
}
