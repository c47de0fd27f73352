//! Fixture utilities for the deterministic CLI harness.
//!
//! This module discovers capture CSVs on disk, loads them into a
//! [`RawTable`], parses optional expectation JSON and compares processed
//! metrics against it. Synthetic captures with known ground truth live in
//! [`synthetic`].

pub mod csv_io;
pub mod synthetic;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::capture::RawTable;
use crate::metrics::{MetricsReport, METRIC_COLUMNS};

/// Default location for fixture CSV/JSON assets.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Metadata describing an available fixture.
#[derive(Clone, Debug, Serialize)]
pub struct FixtureMetadata {
    pub name: String,
    pub csv_path: PathBuf,
    pub expect_path: Option<PathBuf>,
}

/// Loaded fixture capture.
pub struct FixtureData {
    pub metadata: FixtureMetadata,
    pub table: RawTable,
    pub expectations: Option<FixtureExpectations>,
}

/// JSON expectation schema for fixture verification.
///
/// Metric values are keyed by their export column, e.g. `"peak_force(N)"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureExpectations {
    pub fixture: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Relative tolerance applied to every value
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub jumps: Vec<ExpectedJump>,
}

fn default_tolerance() -> f64 {
    0.05
}

/// Expected metric values of one jump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedJump {
    pub jump: usize,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

fn within(actual: f64, expected: f64, tolerance: f64) -> bool {
    let scale = expected.abs().max(f64::EPSILON);
    (actual - expected).abs() <= tolerance * scale
}

impl FixtureExpectations {
    pub fn verify(&self, actual: &MetricsReport) -> std::result::Result<(), ExpectationDiff> {
        let mut failures = Vec::new();

        if let Some(expected) = self.weight_kg {
            if !within(actual.weight_kg, expected, self.tolerance) {
                failures.push(ExpectationFailure::new(None, "weight(kg)", expected, Some(actual.weight_kg)));
            }
        }

        for expected_jump in &self.jumps {
            let row = actual
                .jumps
                .iter()
                .find(|metrics| metrics.jump == expected_jump.jump)
                .map(|metrics| metrics.row(actual.weight_kg));

            for (metric, &expected) in &expected_jump.values {
                let value = row.and_then(|row| {
                    METRIC_COLUMNS
                        .iter()
                        .position(|(key, _)| *key == metric.as_str())
                        .map(|column| row[column])
                });
                let matched = value.is_some_and(|value| within(value, expected, self.tolerance));
                if !matched {
                    failures.push(ExpectationFailure::new(Some(expected_jump.jump), metric, expected, value));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing actual results with expectations.
#[derive(Debug, Serialize)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failures": self.failures.iter().map(|failure| {
                serde_json::json!({
                    "jump": failure.jump,
                    "metric": failure.metric,
                    "expected": failure.expected,
                    "actual": failure.actual,
                    "relative_error": failure.relative_error,
                })
            }).collect::<Vec<_>>()
        })
    }
}

/// Detailed diff entry for a single failure.
#[derive(Debug, Serialize)]
pub struct ExpectationFailure {
    /// `None` for capture-wide values such as the weight
    pub jump: Option<usize>,
    pub metric: String,
    pub expected: f64,
    pub actual: Option<f64>,
    pub relative_error: Option<f64>,
}

impl ExpectationFailure {
    fn new(jump: Option<usize>, metric: &str, expected: f64, actual: Option<f64>) -> Self {
        Self {
            jump,
            metric: metric.to_string(),
            expected,
            actual,
            relative_error: actual.map(|value| (value - expected).abs() / expected.abs().max(f64::EPSILON)),
        }
    }
}

/// Catalog responsible for discovering fixtures on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all fixtures by their metadata.
    pub fn discover(&self) -> Result<Vec<FixtureMetadata>> {
        let mut fixtures = Vec::new();
        if !self.root.exists() {
            return Ok(fixtures);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) == Some("csv") {
                    fixtures.push(self.metadata_for_path(&path)?);
                }
            }
        }

        fixtures.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fixtures)
    }

    /// Load fixture capture + expectations for provided name or path.
    pub fn load(&self, fixture: &str, override_expect: Option<PathBuf>, skip_rows: usize) -> Result<FixtureData> {
        let csv_path = self.resolve_fixture_path(fixture)?;
        let metadata = self.metadata_for_path(&csv_path)?;
        let table = csv_io::read_capture(&csv_path, skip_rows)?;

        let expectation_path = override_expect.or(metadata.expect_path.clone());
        let expectations = match expectation_path {
            Some(path) => Some(load_expectations(&path)?),
            None => None,
        };

        Ok(FixtureData {
            metadata,
            table,
            expectations,
        })
    }

    fn resolve_fixture_path(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.exists() {
            return Ok(as_path.to_path_buf());
        }

        let candidate = self.root.join(format!("{fixture}.csv"));
        if candidate.exists() {
            Ok(candidate)
        } else {
            Err(anyhow!(
                "Fixture '{fixture}' not found in {}",
                self.root.display()
            ))
        }
    }

    fn metadata_for_path(&self, csv_path: &Path) -> Result<FixtureMetadata> {
        let name = csv_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid fixture name for {}", csv_path.display()))?
            .to_string();
        let expect_path = csv_path.with_extension("expect.json");
        Ok(FixtureMetadata {
            name,
            csv_path: csv_path.to_path_buf(),
            expect_path: expect_path.exists().then_some(expect_path),
        })
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// Read and parse an expectation file.
pub fn load_expectations(path: &Path) -> Result<FixtureExpectations> {
    let json = fs::read_to_string(path).with_context(|| format!("reading expectation {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}
