use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use squat_jump_analyzer::error::{ErrorKind, PipelineError};
use squat_jump_analyzer::fixtures::csv_io::{self, LAB_EXPORT_SKIP_ROWS};
use squat_jump_analyzer::fixtures::synthetic::{self, SyntheticJumpSpec};
use squat_jump_analyzer::fixtures::{ExpectationDiff, FixtureCatalog};
use squat_jump_analyzer::{process, AppConfig};

#[derive(Parser, Debug)]
#[command(
    name = "squat_jump_cli",
    about = "Triple squat jump segmentation and metrics for force-plate captures"
)]
struct Cli {
    /// Override directory containing fixture captures (defaults to ./fixtures)
    #[arg(long, global = true)]
    fixtures_dir: Option<PathBuf>,
    /// Log segmentation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a capture and print the analysis report
    Analyze {
        /// Fixture name or path to a capture CSV
        input: String,
        /// Preamble lines before the header row
        #[arg(long, default_value_t = LAB_EXPORT_SKIP_ROWS)]
        skip_rows: usize,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        metrics_csv: Option<PathBuf>,
        #[arg(long)]
        signal_csv: Option<PathBuf>,
    },
    /// Write a synthetic three-jump capture
    Synth {
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        mass_kg: Option<f64>,
        #[arg(long)]
        stepped_off: bool,
        #[arg(long)]
        noise_n: Option<f64>,
    },
    /// List available fixtures on disk
    DumpFixtures,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_else(FixtureCatalog::default);

    match cli.command {
        Commands::Analyze {
            input,
            skip_rows,
            config,
            expect,
            output,
            metrics_csv,
            signal_csv,
        } => run_analyze(
            &catalog,
            &input,
            skip_rows,
            config,
            expect,
            AnalyzeOutputs {
                report: output,
                metrics_csv,
                signal_csv,
            },
        ),
        Commands::Synth {
            output,
            seed,
            mass_kg,
            stepped_off,
            noise_n,
        } => {
            let defaults = SyntheticJumpSpec::default();
            let spec = SyntheticJumpSpec {
                seed: seed.unwrap_or(defaults.seed),
                mass_kg: mass_kg.unwrap_or(defaults.mass_kg),
                noise_n: noise_n.unwrap_or(defaults.noise_n),
                stepped_off,
                ..defaults
            };
            run_synth(&spec, &output)
        }
        Commands::DumpFixtures => run_dump(&catalog),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

struct AnalyzeOutputs {
    report: Option<PathBuf>,
    metrics_csv: Option<PathBuf>,
    signal_csv: Option<PathBuf>,
}

fn exit_code_for(err: &PipelineError) -> ExitCode {
    match err.kind() {
        ErrorKind::Input => ExitCode::from(3),
        ErrorKind::Detection => ExitCode::from(4),
        ErrorKind::Compute => ExitCode::from(5),
    }
}

fn run_analyze(
    catalog: &FixtureCatalog,
    input: &str,
    skip_rows: usize,
    config_path: Option<PathBuf>,
    override_expect: Option<PathBuf>,
    outputs: AnalyzeOutputs,
) -> Result<ExitCode> {
    let config = config_path
        .map(AppConfig::load_from_file)
        .unwrap_or_default();
    let data = catalog.load(input, override_expect, skip_rows)?;

    let output = match process(&data.table, &config) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("Error: {err}");
            return Ok(exit_code_for(&err));
        }
    };
    tracing::info!(
        fixture = %data.metadata.name,
        weight_kg = output.metrics.weight_kg,
        "capture analysed"
    );

    let report = output.report(&data.metadata.name);
    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = outputs.report {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    if let Some(path) = outputs.metrics_csv {
        csv_io::write_metrics_csv(&output.metrics, &path)?;
    }
    if let Some(path) = outputs.signal_csv {
        csv_io::write_signal_csv(&output.segmentation.signal, &output.metrics.kinematics, &path)?;
    }

    if let Some(expectations) = data.expectations {
        match expectations.verify(&output.metrics) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        }
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_synth(spec: &SyntheticJumpSpec, output: &Path) -> Result<ExitCode> {
    let capture = synthetic::generate(spec).context("generating synthetic capture")?;
    csv_io::write_capture(&capture.table, output)?;
    println!("{}", serde_json::to_string_pretty(&capture.truth)?);
    Ok(ExitCode::from(0))
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let fixtures = catalog.discover()?;
    println!("{}", serde_json::to_string_pretty(&fixtures)?);
    Ok(ExitCode::from(0))
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}
