//! dyntile Command Line Interface
//!
//! Usage:
//!   dyntile [OPTIONS] <job-file>
//!   dyntile --help
//!
//! Examples:
//!   dyntile conv.json                       # Cases and metadata as JSON
//!   dyntile --emit=map conv.json            # Coverage map of the (h, w) space
//!   dyntile --locality=32 --step=2 conv.json  # Override window search settings
//!   dyntile --preset=wide conv.json         # Fewer, wider cases

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dyntile::config::TilingConfig;
use dyntile::ops::conv2d::{Conv2dJob, Conv2dOutcome};
use dyntile::utils::render_coverage;
use log::{debug, info};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

/// dyntile - tiling case selection for dynamic-shape operators
#[derive(Parser, Debug)]
#[command(name = "dyntile")]
#[command(version)]
#[command(about = "Select tiling cases for operators with dynamic shapes", long_about = None)]
struct Cli {
    /// Job file (JSON: shape, operator, seeds, config)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "json")]
    emit: EmitKind,

    /// Replace the job's tiling config with a preset before applying overrides
    #[arg(long)]
    preset: Option<PresetArg>,

    /// Override the locality radius on both axes
    #[arg(long)]
    locality: Option<i64>,

    /// Override the window search step on both axes
    #[arg(long)]
    step: Option<i64>,

    /// Do not check that the cases cover the whole shape space
    #[arg(long)]
    no_verify: bool,

    /// Columns of the coverage map
    #[arg(long, default_value = "64")]
    map_width: usize,

    /// Rows of the coverage map
    #[arg(long, default_value = "32")]
    map_height: usize,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    /// Default step and locality
    Default,
    /// Unit step, small locality: more cases
    Compact,
    /// Coarse step, large locality: fewer cases
    Wide,
}

impl From<PresetArg> for TilingConfig {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Default => TilingConfig::default(),
            PresetArg::Compact => TilingConfig::compact(),
            PresetArg::Wide => TilingConfig::wide(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Cases and compile metadata as JSON
    Json,
    /// One line per case
    Cases,
    /// Text coverage map (spatial shapes only)
    Map,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("dyntile v{}", dyntile::VERSION);
    debug!("Job file: {:?}", cli.input);

    let mut job = Conv2dJob::from_path(&cli.input)
        .with_context(|| format!("Failed to load job file: {:?}", cli.input))?;
    apply_overrides(&cli, &mut job);
    debug!("Tiling config: {:?}", job.config);

    let outcome = job
        .run()
        .with_context(|| format!("Failed to tile {}", job.shape))?;

    let output = match cli.emit {
        EmitKind::Json => emit_json(&outcome)?,
        EmitKind::Cases => emit_cases(&outcome),
        EmitKind::Map => {
            let target = job
                .shape
                .mode()?
                .target_rect()
                .context("--emit=map needs dynamic height and width")?;
            render_coverage(&target, &outcome.cases, cli.map_width, cli.map_height)
        }
    };
    write_output(&cli.output, &output)
}

fn apply_overrides(cli: &Cli, job: &mut Conv2dJob) {
    let mut config = match cli.preset {
        Some(preset) => preset.into(),
        None => job.config.clone(),
    };
    if let Some(l) = cli.locality {
        config = config.locality(l);
    }
    if let Some(s) = cli.step {
        config = config.step(s);
    }
    if cli.no_verify {
        config = config.verify_coverage(false);
    }
    job.config = config;
}

fn emit_json(outcome: &Conv2dOutcome) -> Result<String> {
    let doc = json!({
        "cases": outcome.cases,
        "metadata": outcome.metadata.to_json(),
    });
    serde_json::to_string_pretty(&doc).context("Failed to serialize cases")
}

fn emit_cases(outcome: &Conv2dOutcome) -> String {
    outcome
        .cases
        .iter()
        .map(|c| format!("{:>4}  {:<28} {:<24} {}", c.key, c.region.to_string(), c.source.to_string(), c.plan))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
