//! Configuration loading and typed config structures for the Generations
//! simulation.
//!
//! The configuration lives in `generations.yaml`. Every field has a
//! default, so an empty document (or a missing section) yields the
//! canonical five-critter run. [`SimulationConfig::validate`] rejects
//! configurations that cannot be run before any iteration starts.

use std::collections::BTreeSet;
use std::path::Path;

use generations_agents::LifecycleConfig;
use generations_types::StrategySpec;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::payoff::PayoffMatrix;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The iteration count is not a positive integer.
    #[error("iterations must be at least 1, got {iterations}")]
    InvalidIterations {
        /// The rejected iteration count.
        iterations: u64,
    },

    /// Two roster entries share an identity.
    #[error("duplicate critter identity in roster: {name}")]
    DuplicateIdentity {
        /// The repeated name.
        name: String,
    },

    /// The roster has no critters.
    #[error("population roster is empty")]
    EmptyRoster,

    /// The mutation probability lies outside `[0, 1]`.
    #[error("mutation probability must be within [0, 1], got {probability}")]
    InvalidMutationProbability {
        /// The rejected probability.
        probability: f64,
    },

    /// A weighted random strategy has a weight that is not strictly positive.
    #[error("cooperation weight must be positive, got {weight} in {location}")]
    InvalidCooperationWeight {
        /// Where the weight was found (a roster entry or the mutation catalog).
        location: String,
        /// The rejected weight.
        weight: Decimal,
    },

    /// The per-critter interaction cap is zero.
    #[error("interactions.max_per_critter must be at least 1")]
    InvalidInteractionCap,

    /// The mutation catalog is empty while mutation can occur.
    #[error("mutation catalog is empty but mutation probability is {probability}")]
    EmptyMutationCatalog {
        /// The configured mutation probability.
        probability: f64,
    },

    /// The reporting interval is zero.
    #[error("reporting.interval must be at least 1")]
    InvalidReportingInterval,

    /// A food amount that must not be negative is.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// The offending field.
        field: &'static str,
        /// The rejected amount.
        value: i64,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `generations.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and run length.
    #[serde(default)]
    pub world: WorldConfig,

    /// The initial roster.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Per-iteration upkeep.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Reproduction and mutation.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Interaction scheduling.
    #[serde(default)]
    pub interactions: InteractionConfig,

    /// Payoff matrix constants.
    #[serde(default)]
    pub payoff: PayoffMatrix,

    /// Built-in observer settings.
    #[serde(default)]
    pub reporting: ReportingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `GENERATIONS_ITERATIONS` overrides `world.iterations`
    /// - `GENERATIONS_SEED` overrides `world.seed`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.world.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.world.apply_env_overrides();
        Ok(config)
    }

    /// Check every constraint a run depends on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.iterations == 0 {
            return Err(ConfigError::InvalidIterations {
                iterations: self.world.iterations,
            });
        }
        if self.population.roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let mut seen = BTreeSet::new();
        for (index, entry) in self.population.roster.iter().enumerate() {
            if let Some(name) = &entry.name
                && !seen.insert(name.as_str())
            {
                return Err(ConfigError::DuplicateIdentity { name: name.clone() });
            }
            let location = entry
                .name
                .as_ref()
                .map_or_else(|| format!("roster entry {index}"), |name| format!("roster entry {name}"));
            check_weight(&entry.strategy, location)?;
        }

        for (field, value) in [
            ("environment.upkeep_cost", self.environment.upkeep_cost),
            ("lifecycle.reproduction_cost", self.lifecycle.reproduction_cost),
            ("lifecycle.offspring_starting_food", self.lifecycle.offspring_starting_food),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeAmount { field, value });
            }
        }

        let probability = self.lifecycle.mutation_probability;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidMutationProbability { probability });
        }
        if self.lifecycle.mutation_catalog.is_empty() && probability > 0.0 {
            return Err(ConfigError::EmptyMutationCatalog { probability });
        }
        for spec in &self.lifecycle.mutation_catalog {
            check_weight(spec, String::from("mutation catalog"))?;
        }

        if self.interactions.max_per_critter == 0 {
            return Err(ConfigError::InvalidInteractionCap);
        }
        if self.reporting.interval == 0 {
            return Err(ConfigError::InvalidReportingInterval);
        }
        Ok(())
    }
}

fn check_weight(spec: &StrategySpec, location: String) -> Result<(), ConfigError> {
    if let StrategySpec::WeightedRandom { cooperation_weight } = spec
        && *cooperation_weight <= Decimal::ZERO
    {
        return Err(ConfigError::InvalidCooperationWeight {
            location,
            weight: *cooperation_weight,
        });
    }
    Ok(())
}

/// Seed and run length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility (default: 42).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of iterations to run (default: 600).
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            iterations: default_iterations(),
        }
    }
}

impl WorldConfig {
    /// Apply environment variable overrides.
    ///
    /// Values that do not parse as an unsigned integer are ignored with a
    /// warning.
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = env_u64("GENERATIONS_ITERATIONS") {
            self.iterations = val;
        }
        if let Some(val) = env_u64("GENERATIONS_SEED") {
            self.seed = val;
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!(key, value = raw, "Ignoring non-numeric environment override");
            None
        }
    }
}

/// The initial population.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Food each seeded critter starts with (default: 5).
    #[serde(default = "default_starting_food")]
    pub starting_food: i64,

    /// Critters created when the run starts (default: one per strategy kind).
    #[serde(default = "default_roster")]
    pub roster: Vec<RosterEntry>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            starting_food: default_starting_food(),
            roster: default_roster(),
        }
    }
}

/// One critter of the initial roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    /// Identity; generated as `Critter_<n>` when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// The critter's strategy.
    pub strategy: StrategySpec,
}

impl RosterEntry {
    /// A named roster entry.
    pub fn named(name: impl Into<String>, strategy: StrategySpec) -> Self {
        Self {
            name: Some(name.into()),
            strategy,
        }
    }
}

/// Per-iteration upkeep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    /// Food every living critter loses at the end of each iteration (default: 3).
    #[serde(default = "default_upkeep_cost")]
    pub upkeep_cost: i64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            upkeep_cost: default_upkeep_cost(),
        }
    }
}

/// Interaction scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InteractionConfig {
    /// Partner attempts per critter per iteration (default: 5).
    #[serde(default = "default_max_per_critter")]
    pub max_per_critter: usize,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            max_per_critter: default_max_per_critter(),
        }
    }
}

/// Settings of the built-in observers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportingConfig {
    /// Iterations between strategy tally snapshots (default: 5).
    #[serde(default = "default_reporting_interval")]
    pub interval: u64,

    /// Name of a critter whose interactions are tracked (default: none).
    #[serde(default)]
    pub track: Option<String>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            interval: default_reporting_interval(),
            track: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_iterations() -> u64 {
    600
}

const fn default_starting_food() -> i64 {
    5
}

fn default_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::named("cheat", StrategySpec::AlwaysDefect),
        RosterEntry::named("sucker", StrategySpec::AlwaysCooperate),
        RosterEntry::named("random", StrategySpec::weighted_random(Decimal::ONE)),
        RosterEntry::named("grudger", StrategySpec::Grudger),
        RosterEntry::named("tit_for_tat", StrategySpec::TitForTat),
    ]
}

const fn default_upkeep_cost() -> i64 {
    3
}

const fn default_max_per_critter() -> usize {
    5
}

const fn default_reporting_interval() -> u64 {
    5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.iterations, 600);
        assert_eq!(config.population.starting_food, 5);
        assert_eq!(config.population.roster.len(), 5);
        assert_eq!(config.environment.upkeep_cost, 3);
        assert_eq!(config.interactions.max_per_critter, 5);
        assert_eq!(config.reporting.interval, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config: SimulationConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 7
  iterations: 10
population:
  starting_food: 20
  roster:
    - name: alice
      strategy: { kind: tit_for_tat }
    - strategy: { kind: weighted_random, cooperation_weight: 3 }
environment:
  upkeep_cost: 1
lifecycle:
  reproduction_threshold: 50
  mutation_probability: 0.0
interactions:
  max_per_critter: 2
payoff:
  temptation: 5
reporting:
  interval: 2
  track: alice
";
        let config: SimulationConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.iterations, 10);
        assert_eq!(config.population.starting_food, 20);
        assert_eq!(config.population.roster.len(), 2);
        assert_eq!(config.population.roster.first().and_then(|e| e.name.as_deref()), Some("alice"));
        assert_eq!(
            config.population.roster.get(1).map(|e| &e.strategy),
            Some(&StrategySpec::weighted_random(dec!(3)))
        );
        assert_eq!(config.environment.upkeep_cost, 1);
        assert_eq!(config.lifecycle.reproduction_threshold, 50);
        assert_eq!(config.lifecycle.reproduction_cost, 100);
        assert_eq!(config.interactions.max_per_critter, 2);
        assert_eq!(config.payoff.temptation, 5);
        assert_eq!(config.payoff.sucker, -1);
        assert_eq!(config.reporting.track.as_deref(), Some("alice"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = SimulationConfig::parse("world: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/generations.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut config = SimulationConfig::default();
        config.world.iterations = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIterations { iterations: 0 })
        ));
    }

    #[test]
    fn negative_amounts_rejected() {
        let mut config = SimulationConfig::default();
        config.environment.upkeep_cost = -1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeAmount { field: "environment.upkeep_cost", value: -1 })
        ));

        let mut config = SimulationConfig::default();
        config.lifecycle.reproduction_cost = -100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeAmount { field: "lifecycle.reproduction_cost", .. })
        ));

        let mut config = SimulationConfig::default();
        config.lifecycle.offspring_starting_food = -5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeAmount { field: "lifecycle.offspring_starting_food", .. })
        ));

        let mut config = SimulationConfig::default();
        config.environment.upkeep_cost = 0;
        config.lifecycle.offspring_starting_food = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duplicate_identity_rejected() {
        let mut config = SimulationConfig::default();
        config.population.roster = vec![
            RosterEntry::named("dup", StrategySpec::Grudger),
            RosterEntry::named("dup", StrategySpec::TitForTat),
        ];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateIdentity { name }) if name == "dup"
        ));
    }

    #[test]
    fn unnamed_entries_never_collide() {
        let mut config = SimulationConfig::default();
        config.population.roster = vec![
            RosterEntry {
                name: None,
                strategy: StrategySpec::Grudger,
            },
            RosterEntry {
                name: None,
                strategy: StrategySpec::Grudger,
            },
        ];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_roster_rejected() {
        let mut config = SimulationConfig::default();
        config.population.roster.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyRoster)));
    }

    #[test]
    fn bad_weight_rejected() {
        let mut config = SimulationConfig::default();
        config.population.roster = vec![RosterEntry::named(
            "r",
            StrategySpec::weighted_random(Decimal::ZERO),
        )];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCooperationWeight { .. })
        ));

        let mut config = SimulationConfig::default();
        config.lifecycle.mutation_catalog = vec![StrategySpec::weighted_random(dec!(-1))];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCooperationWeight { .. })
        ));
    }

    #[test]
    fn mutation_constraints() {
        let mut config = SimulationConfig::default();
        config.lifecycle.mutation_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMutationProbability { .. })
        ));

        config.lifecycle.mutation_probability = 0.5;
        config.lifecycle.mutation_catalog.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyMutationCatalog { .. })
        ));

        config.lifecycle.mutation_probability = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_caps_rejected() {
        let mut config = SimulationConfig::default();
        config.interactions.max_per_critter = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInteractionCap)));

        let mut config = SimulationConfig::default();
        config.reporting.interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidReportingInterval)));
    }
}
