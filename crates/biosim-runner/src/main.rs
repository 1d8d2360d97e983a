//! Command-line runner for island ecosystem simulations.

mod scenario;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use scenario::{Scenario, DEFAULT_SCENARIO};
use std::path::PathBuf;
use telemetry::LogFormat;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "biosim-runner", version, about = "Run a BioSim island scenario")]
struct Args {
    /// Scenario JSON file; the bundled scenario is used when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Years to simulate, overriding the scenario
    #[arg(short, long)]
    years: Option<u32>,

    /// Random seed, overriding the scenario
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Write the run summary as JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.log_format)?;

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::from_json(DEFAULT_SCENARIO)?,
    };
    let years = args.years.unwrap_or(scenario.years);

    info!(
        scenario = ?args.scenario,
        years,
        "Starting BioSim runner"
    );

    let mut sim = scenario.build(args.seed)?;
    scenario.run(&mut sim, years)?;

    let summary = serde_json::to_string_pretty(&sim.summary())?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, summary)
                .with_context(|| format!("Failed to write summary to {}", path.display()))?;
            info!(path = %path.display(), "Summary written");
        }
        None => println!("{}", summary),
    }

    let counts = sim.num_animals_per_species();
    info!(
        year = sim.year(),
        herbivores = counts.herbivores,
        carnivores = counts.carnivores,
        "Run complete"
    );
    Ok(())
}
