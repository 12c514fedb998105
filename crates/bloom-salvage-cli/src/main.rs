use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bloom_salvage_core::fleet::FleetSizer;
use bloom_salvage_core::forecast::forecast_arrivals;
use bloom_salvage_core::mission::{StepRecorder, Trial};
use bloom_salvage_core::{DriftField, MissionConfig, PresenceMask, ScenarioFile};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "bloom-salvage",
    version,
    about = "Size a salvage fleet for drifting bloom near a water intake"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the smallest fleet that keeps intake integrity positive.
    Search {
        /// Scenario JSON file.
        scenario: PathBuf,
        /// Candidates evaluated concurrently per round.
        #[arg(long)]
        parallel_window: Option<usize>,
        /// Give up above this fleet size instead of the derived ceiling.
        #[arg(long)]
        max_fleet: Option<usize>,
        /// Re-run the winning fleet size and print its per-step records.
        #[arg(long)]
        trace_steps: bool,
        /// Print the report as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Run one trial for a fixed fleet size.
    Trial {
        scenario: PathBuf,
        #[arg(long, short = 'n')]
        fleet_size: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print first-arrival warnings for the scenario's landmarks.
    Forecast {
        scenario: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the default mission configuration as JSON.
    DefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_scenario(path: &Path) -> Result<(ScenarioFile, PresenceMask, DriftField)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let scenario = ScenarioFile::from_json(&text)
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;
    let mask = scenario.build_mask().context("invalid presence mask")?;
    let field = scenario.build_field().context("invalid drift field")?;
    info!(
        width = scenario.width,
        height = scenario.height,
        occupied = mask.occupied_count(),
        "scenario loaded"
    );
    Ok((scenario, mask, field))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn trace_trial(
    mask: &PresenceMask,
    field: &DriftField,
    config: &MissionConfig,
    fleet_size: usize,
) -> Result<()> {
    let mut recorder = StepRecorder::default();
    Trial::new(mask, field, config, fleet_size)?.run_observed(&mut recorder);
    println!("step  minutes  integrity  occupied  removed  exposure  outcome");
    for r in &recorder.records {
        println!(
            "{:>4}  {:>7.0}  {:>9}  {:>8}  {:>7}  {:>8}  {:?}",
            r.step, r.elapsed_minutes, r.integrity, r.occupied_cells, r.removed, r.exposure, r.outcome
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            scenario,
            parallel_window,
            max_fleet,
            trace_steps,
            json,
        } => {
            let (mut scenario, mask, field) = load_scenario(&scenario)?;
            if let Some(window) = parallel_window {
                scenario.mission.search.parallel_window = window;
            }
            if max_fleet.is_some() {
                scenario.mission.search.max_fleet_size = max_fleet;
            }
            let config = &scenario.mission;
            let report = FleetSizer::new(&mask, &field, config)?
                .search()
                .context("fleet search failed")?;

            if json {
                print_json(&report)?;
            } else {
                println!("minimum fleet size: {}", report.min_fleet_size);
                println!("candidates tried:   {}", report.trials.len());
                println!("search ceiling:     {}", report.ceiling);
                if let Some(winner) = report.winning_trial() {
                    println!("final integrity:    {}", winner.final_integrity);
                    println!("initial cleanup:    {} cells", winner.initial_cleanup);
                    println!("salvaged en route:  {} cells", winner.removed_total);
                }
            }
            if trace_steps {
                trace_trial(&mask, &field, config, report.min_fleet_size)?;
            }
        }
        Command::Trial {
            scenario,
            fleet_size,
            json,
        } => {
            let (scenario, mask, field) = load_scenario(&scenario)?;
            if json {
                let result = Trial::new(&mask, &field, &scenario.mission, fleet_size)?.run();
                print_json(&result)?;
            } else {
                trace_trial(&mask, &field, &scenario.mission, fleet_size)?;
            }
        }
        Command::Forecast { scenario, json } => {
            let (scenario, mask, field) = load_scenario(&scenario)?;
            if scenario.landmarks.is_empty() {
                bail!("scenario defines no landmarks");
            }
            let warnings = forecast_arrivals(
                &mask,
                &field,
                scenario.mission.resolution_m,
                &scenario.landmarks,
                &scenario.forecast,
            )?;
            if json {
                print_json(&warnings)?;
            } else if warnings.is_empty() {
                println!("no landmark reached within {} h", scenario.forecast.horizon_hours);
            } else {
                for w in &warnings {
                    println!(
                        "{:.2} h  {:?} {} at ({}, {})",
                        w.elapsed_hours, w.kind, w.name, w.cell.x, w.cell.y
                    );
                }
            }
        }
        Command::DefaultConfig => print_json(&MissionConfig::default())?,
    }
    Ok(())
}
