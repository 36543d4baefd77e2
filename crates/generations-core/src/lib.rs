//! Engine for the Generations simulation.
//!
//! This crate owns the population, the per-iteration interaction cycle,
//! and the observer seam through which reporting attaches.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `generations.yaml` into
//!   strongly-typed structs, with validation.
//! - [`environment`] -- The live population, per-strategy aggregates, and
//!   the end-of-iteration upkeep and death sweep.
//! - [`observer`] -- [`SimulationObserver`] trait invoked at lifecycle
//!   points of a run.
//! - [`pairing`] -- Random interaction scheduling for one iteration.
//! - [`payoff`] -- The Prisoner's Dilemma payoff matrix.
//! - [`world`] -- The run state machine tying everything together.
//!
//! [`SimulationObserver`]: observer::SimulationObserver

pub mod config;
pub mod environment;
pub mod observer;
pub mod pairing;
pub mod payoff;
pub mod world;

pub use config::{ConfigError, SimulationConfig};
pub use environment::{Environment, EnvironmentError};
pub use observer::{ObserverError, SimulationObserver};
pub use payoff::PayoffMatrix;
pub use world::{RunSummary, World, WorldError, WorldPhase};
