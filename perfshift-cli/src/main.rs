use anyhow::{Context, Result};
use clap::Parser;
use perfshift_core::series::load_series_from_file;
use perfshift_core::{find_change_points, print_report, ChangePoint, DetectionConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "perfshift", version, about = "Find the most recent level shift in benchmark history")]
struct Cli {
    /// JSON file of `[x, y]` pairs or `{"x", "y"}` objects, oldest first
    file: PathBuf,

    /// Configuration file (defaults to ./perfshift.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for the permutation test
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trailing points to analyze
    #[arg(long, value_name = "N")]
    window: Option<usize>,

    /// Minimum number of points on each side of a change
    #[arg(long, value_name = "N")]
    min_segment_size: Option<usize>,

    /// Print the result as JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Log the search to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Exit with status 1 when a change is found
    #[arg(long)]
    fail_on_change: bool,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    series: &'a str,
    points: usize,
    change_points: &'a [ChangePoint<i64>],
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolve the configuration: CLI flags > env vars > config file > defaults
fn build_config(cli: &Cli) -> Result<DetectionConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = DetectionConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => DetectionConfig::load(),
    };

    if let Some(seed) = cli.seed {
        config.clustering.seed = seed;
    }
    if let Some(window) = cli.window {
        config.filters.max_window_size = window;
    }
    if let Some(min_segment_size) = cli.min_segment_size {
        config.filters.min_segment_size = min_segment_size;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn series_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the detection; returns whether a change was found
fn run(cli: &Cli) -> Result<bool> {
    let config = build_config(cli)?;
    tracing::debug!(?config, "resolved configuration");

    let series = load_series_from_file(&cli.file)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to read series from {}", cli.file.display()))?;
    let name = series_name(&cli.file);

    let changes = find_change_points(&series, &config)
        .with_context(|| format!("Change-point detection failed for {}", name))?;

    if cli.json {
        let report = JsonReport {
            series: &name,
            points: series.len(),
            change_points: &changes,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&name, series.len(), &changes);
    }

    Ok(!changes.is_empty())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let found_change = run(&cli)?;
    if found_change && cli.fail_on_change {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
