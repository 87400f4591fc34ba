//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Command-line driver for metering fixture generation."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use r_mdg_common::{init_tracing, parse_timestamp, AppConfig};
use r_mdg_fixtures::{FixtureSet, RunManifest};
use tracing::info;

const SERVICE_NAME: &str = "r-mdg-gen";
const CONFIG_CANDIDATES: [&str; 2] = ["config/r-mdg.toml", "r-mdg.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate the relational smart-meter CSV fixture set",
    long_about = None
)]
struct Cli {
    /// Configuration file (TOML). Defaults to config/r-mdg.toml or r-mdg.toml when present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory receiving the CSV tables and manifest.json
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Window start, "%Y-%m-%d %H:%M:%S"
    #[arg(long, value_parser = parse_timestamp)]
    start: Option<NaiveDateTime>,

    /// Window end (inclusive), "%Y-%m-%d %H:%M:%S"
    #[arg(long, value_parser = parse_timestamp)]
    end: Option<NaiveDateTime>,

    /// Sampling interval in minutes
    #[arg(long)]
    interval_minutes: Option<u32>,

    /// Number of districts, each with one terminal and one main meter
    #[arg(long)]
    districts: Option<usize>,

    /// Sub meters per district
    #[arg(long = "sub-meters")]
    sub_meters: Option<usize>,

    /// Seed for the ambient random stream
    #[arg(long)]
    seed: Option<u64>,

    /// Seed for the fault-history stream
    #[arg(long)]
    fault_seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_tracing(SERVICE_NAME, &config.logging).context("failed to initialise logging")?;

    let generation = &config.generation;
    let timeline = generation.timeline()?;
    info!(
        districts = generation.districts,
        sub_meters = generation.effective_sub_meters(),
        timestamps = timeline.len(),
        output = %generation.output_dir.display(),
        "starting fixture generation"
    );

    let set = FixtureSet::generate(generation, timeline, Local::now().naive_local());
    let manifest = set
        .write_all(&generation.output_dir)
        .with_context(|| format!("failed to write fixtures to {}", generation.output_dir.display()))?;

    print!("{}", render_summary(&manifest, &generation.output_dir));
    Ok(())
}

/// Load the configuration file (explicit, discovered or defaults) and apply
/// command-line overrides on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::discover(&CONFIG_CANDIDATES)?
            .map(|loaded| loaded.config)
            .unwrap_or_default(),
    };
    apply_overrides(cli, &mut config);
    config
        .validate()
        .context("invalid generation settings after applying command-line overrides")?;
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    let generation = &mut config.generation;
    if let Some(dir) = &cli.output_dir {
        generation.output_dir = dir.clone();
    }
    if let Some(start) = cli.start {
        generation.start = start;
    }
    if let Some(end) = cli.end {
        generation.end = end;
    }
    if let Some(interval) = cli.interval_minutes {
        generation.interval_minutes = interval;
    }
    if let Some(districts) = cli.districts {
        generation.districts = districts;
    }
    if let Some(sub_meters) = cli.sub_meters {
        generation.sub_meters_per_district = Some(sub_meters);
    }
    if cli.seed.is_some() {
        generation.seed = cli.seed;
    }
    if let Some(fault_seed) = cli.fault_seed {
        generation.fault_seed = fault_seed;
    }
}

fn render_summary(manifest: &RunManifest, dir: &std::path::Path) -> String {
    let mut out = format!(
        "generated {} tables ({} rows) for {} districts / {} meters over {} timestamps -> {}\n",
        manifest.tables.len(),
        manifest.total_rows(),
        manifest.districts,
        manifest.meters,
        manifest.timestamps,
        dir.display()
    );
    for table in &manifest.tables {
        out.push_str(&format!("  {:>8}  {}\n", table.rows, table.file));
    }
    out
}
