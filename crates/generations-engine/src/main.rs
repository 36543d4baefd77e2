//! Engine binary for the Generations simulation.
//!
//! Loads configuration, seeds the world, registers the built-in observers,
//! and runs the iterated Prisoner's Dilemma to completion.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `GENERATIONS_CONFIG` (default
//!    `generations.yaml`), falling back to defaults when absent
//! 3. Validate the configuration and seed the world
//! 4. Register the tracing, tally, and (optional) tracker observers
//! 5. Run every configured iteration
//! 6. Log the result and print the run summary as JSON

mod error;
mod tally;
mod tracing_observer;
mod tracker;

use std::path::PathBuf;

use generations_core::{RunSummary, SimulationConfig, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::tally::StrategyTally;
use crate::tracing_observer::TracingObserver;
use crate::tracker::CritterTracker;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "generations.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or the run itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("generations-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.world.seed,
        iterations = config.world.iterations,
        roster = config.population.roster.len(),
        upkeep_cost = config.environment.upkeep_cost,
        max_per_critter = config.interactions.max_per_critter,
        mutation_probability = config.lifecycle.mutation_probability,
        "Configuration loaded"
    );

    // 3-5. Seed, observe, run.
    let summary = run(config)?;

    // 6. Report.
    info!(
        run_id = %summary.run_id,
        iterations = summary.iterations,
        population = summary.population,
        elapsed_ms = summary
            .finished_at
            .signed_duration_since(summary.started_at)
            .num_milliseconds(),
        "generations-engine finished"
    );
    let json = serde_json::to_string_pretty(&summary).map_err(EngineError::from)?;
    println!("{json}");
    Ok(())
}

/// Seed a world from `config`, register the built-in observers, and run it.
fn run(config: SimulationConfig) -> Result<RunSummary, EngineError> {
    let interval = config.reporting.interval;
    let track = config.reporting.track.clone();

    let mut world = World::new(config)?;
    world.add_observer(Box::new(TracingObserver::new(world.run_id(), interval)));
    world.add_observer(Box::new(StrategyTally::new(interval)));
    if let Some(target) = track {
        world.add_observer(Box::new(CritterTracker::new(target)));
    }

    Ok(world.run_configured()?)
}

/// Load configuration from `GENERATIONS_CONFIG` or `generations.yaml`.
///
/// If the file does not exist, returns the default configuration.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = std::env::var_os("GENERATIONS_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        info!(path = %config_path.display(), "Loading configuration");
        Ok(SimulationConfig::from_file(&config_path)?)
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides();
        Ok(config)
    }
}
