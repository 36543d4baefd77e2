//! Configuration for reproduction and mutation.
//!
//! These values correspond to the `lifecycle` section of `generations.yaml`.
//! The [`LifecycleConfig`] struct bundles every tunable so that callers
//! (the world, tests) can override defaults.

use generations_types::StrategySpec;
use serde::Deserialize;

/// Parameters governing when and how critters reproduce.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LifecycleConfig {
    /// Food balance a critter must rise above to reproduce (default: 150).
    #[serde(default = "default_reproduction_threshold")]
    pub reproduction_threshold: i64,

    /// Food the parent gives up when it reproduces (default: 100).
    #[serde(default = "default_reproduction_cost")]
    pub reproduction_cost: i64,

    /// Food an offspring starts with (default: 5).
    #[serde(default = "default_offspring_starting_food")]
    pub offspring_starting_food: i64,

    /// Probability in `[0, 1]` that an offspring is a mutant (default: 0.05).
    #[serde(default = "default_mutation_probability")]
    pub mutation_probability: f64,

    /// Strategies a mutant offspring is drawn from, uniformly
    /// (default: one of every kind).
    #[serde(default = "StrategySpec::catalog")]
    pub mutation_catalog: Vec<StrategySpec>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            reproduction_threshold: default_reproduction_threshold(),
            reproduction_cost: default_reproduction_cost(),
            offspring_starting_food: default_offspring_starting_food(),
            mutation_probability: default_mutation_probability(),
            mutation_catalog: StrategySpec::catalog(),
        }
    }
}

const fn default_reproduction_threshold() -> i64 {
    150
}

const fn default_reproduction_cost() -> i64 {
    100
}

const fn default_offspring_starting_food() -> i64 {
    5
}

const fn default_mutation_probability() -> f64 {
    0.05
}
