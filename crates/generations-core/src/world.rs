//! The run state machine.
//!
//! A [`World`] is built from a validated [`SimulationConfig`], seeds its
//! population immediately, and then runs exactly once:
//!
//! ```text
//! Seeded -> Running { iteration: 1..=N } -> Finished
//! ```
//!
//! Each iteration notifies observers, schedules the interaction pairs,
//! resolves every pair (payoff, lifecycle, memory, observer fan-out), and
//! ends with the upkeep and death sweep. Any error is fatal to the run.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use generations_agents::{AgentError, Critter, NameGenerator, ReproductionContext, Strategy};
use generations_types::{Interaction, RunId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ConfigError, SimulationConfig};
use crate::environment::{Environment, EnvironmentError};
use crate::observer::{ObserverError, SimulationObserver};
use crate::pairing;

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The configuration was rejected before any iteration ran.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A critter operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// An observer failed; observers are not isolated from the run.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying observer error.
        #[from]
        source: ObserverError,
    },

    /// An interaction referenced a critter that is not in the population.
    #[error("critter not in population: {name}")]
    CritterMissing {
        /// The missing identity.
        name: String,
    },

    /// An interaction paired a critter with itself.
    #[error("critter cannot interact with itself: {name}")]
    SelfInteraction {
        /// The identity given as both participants.
        name: String,
    },

    /// The world has already been run.
    #[error("world has already run")]
    AlreadyFinished,
}

impl From<EnvironmentError> for WorldError {
    fn from(err: EnvironmentError) -> Self {
        match err {
            EnvironmentError::CritterMissing { name } => Self::CritterMissing { name },
            EnvironmentError::Agent { source } => Self::Agent { source },
        }
    }
}

/// Where a world is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldPhase {
    /// The initial population exists; no iteration has run.
    Seeded,
    /// The given iteration is in progress.
    Running {
        /// Current iteration, starting at 1.
        iteration: u64,
    },
    /// Every iteration has completed.
    Finished,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Number of iterations completed.
    pub iterations: u64,
    /// Living critters at the end of the run.
    pub population: usize,
    /// Live critter count per strategy short name at the end of the run.
    pub strategy_counts: BTreeMap<String, u32>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// A seeded population together with everything needed to run it.
pub struct World {
    run_id: RunId,
    config: SimulationConfig,
    environment: Environment,
    observers: Vec<Box<dyn SimulationObserver>>,
    names: NameGenerator,
    rng: StdRng,
    phase: WorldPhase,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("run_id", &self.run_id)
            .field("phase", &self.phase)
            .field("environment", &self.environment)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Validate the configuration and seed the initial population.
    ///
    /// Explicit roster names are reserved before unnamed entries are given
    /// generated `Critter_<n>` names.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Config`] if validation fails, or
    /// [`WorldError::Agent`] if a roster strategy cannot be built.
    pub fn new(config: SimulationConfig) -> Result<Self, WorldError> {
        config.validate()?;

        let mut names = NameGenerator::new();
        for name in config.population.roster.iter().filter_map(|e| e.name.as_ref()) {
            names.reserve(name.clone());
        }

        let mut environment = Environment::new(config.environment.upkeep_cost);
        for entry in &config.population.roster {
            let strategy = Strategy::from_spec(&entry.strategy)?;
            environment.add_critter(Critter::new(
                entry.name.clone(),
                strategy,
                config.population.starting_food,
                &mut names,
            ));
        }

        let run_id = RunId::new();
        info!(
            %run_id,
            seed = config.world.seed,
            population = environment.len(),
            "World seeded"
        );

        Ok(Self {
            run_id,
            rng: StdRng::seed_from_u64(config.world.seed),
            config,
            environment,
            observers: Vec::new(),
            names,
            phase: WorldPhase::Seeded,
        })
    }

    /// Identifier of this run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Current phase.
    pub const fn phase(&self) -> WorldPhase {
        self.phase
    }

    /// The configuration this world was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The live population.
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        debug!(observer = observer.name(), "Observer registered");
        self.observers.push(observer);
    }

    /// Run for the configured number of iterations.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_configured(&mut self) -> Result<RunSummary, WorldError> {
        self.run(self.config.world.iterations)
    }

    /// Run `iterations` iterations.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AlreadyFinished`] if the world has run before,
    /// [`WorldError::Config`] for a zero iteration count, and otherwise the
    /// first error raised by an interaction, the sweep, or an observer.
    pub fn run(&mut self, iterations: u64) -> Result<RunSummary, WorldError> {
        if self.phase != WorldPhase::Seeded {
            return Err(WorldError::AlreadyFinished);
        }
        if iterations == 0 {
            return Err(ConfigError::InvalidIterations { iterations }.into());
        }

        let started_at = Utc::now();
        info!(
            run_id = %self.run_id,
            iterations,
            population = self.environment.len(),
            "Run starting"
        );

        self.notify(|observer, env| observer.on_environment_start(env))?;
        for iteration in 1..=iterations {
            self.phase = WorldPhase::Running { iteration };
            self.run_iteration()?;
        }
        self.notify(|observer, env| observer.on_environment_end(env))?;
        self.phase = WorldPhase::Finished;

        let summary = RunSummary {
            run_id: self.run_id,
            iterations,
            population: self.environment.len(),
            strategy_counts: self.environment.strategy_counts().clone(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            run_id = %summary.run_id,
            iterations = summary.iterations,
            population = summary.population,
            "Run finished"
        );
        Ok(summary)
    }

    /// Resolve one interaction between two living critters.
    ///
    /// Both sides decide without seeing the other's decision, the payoff
    /// is applied (possibly triggering reproduction or a dying event), both
    /// strategies observe the full outcome, offspring join the population,
    /// and every observer is notified.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SelfInteraction`] if both names are the same,
    /// [`WorldError::CritterMissing`] if either critter is not in the
    /// population, [`WorldError::Agent`] on bookkeeping failure, or
    /// [`WorldError::Observer`].
    pub fn interact_critters(
        &mut self,
        first: &str,
        second: &str,
    ) -> Result<Interaction, WorldError> {
        if first == second {
            return Err(WorldError::SelfInteraction {
                name: first.to_owned(),
            });
        }
        let first_action = self.environment.decide(first, second, &mut self.rng)?;
        let second_action = self.environment.decide(second, first, &mut self.rng)?;
        let (first_delta, second_delta) = self.config.payoff.resolve(first_action, second_action);

        self.apply_delta(first, first_delta)?;
        self.apply_delta(second, second_delta)?;

        let interaction = Interaction {
            iteration: self.environment.iteration(),
            first: first.to_owned(),
            first_action,
            first_delta,
            second: second.to_owned(),
            second_action,
            second_delta,
        };
        self.environment.record_interaction(&interaction)?;
        let removed = self.environment.settle();
        self.release_names(&removed);

        debug!(
            iteration = interaction.iteration,
            first,
            first_action = %first_action,
            second,
            second_action = %second_action,
            "Interaction resolved"
        );
        self.notify(|observer, env| observer.on_interaction_end(env, &interaction))?;
        Ok(interaction)
    }

    fn run_iteration(&mut self) -> Result<(), WorldError> {
        self.environment.start_iteration();
        self.notify(|observer, env| observer.on_iteration_start(env))?;

        let names = self.environment.names();
        let pairs = pairing::schedule_interactions(
            &names,
            self.config.interactions.max_per_critter,
            &mut self.rng,
        );
        for (first, second) in &pairs {
            self.interact_critters(first, second)?;
        }

        self.notify(|observer, env| observer.on_iteration_end(env))?;
        let died = self.environment.end_iteration()?;
        self.release_names(&died);

        debug!(
            run_id = %self.run_id,
            iteration = self.environment.iteration(),
            interactions = pairs.len(),
            died = died.len(),
            population = self.environment.len(),
            "Iteration complete"
        );
        Ok(())
    }

    fn apply_delta(&mut self, name: &str, delta: i64) -> Result<(), WorldError> {
        match delta.cmp(&0) {
            Ordering::Greater => {
                let mut ctx = ReproductionContext {
                    config: &self.config.lifecycle,
                    names: &mut self.names,
                    rng: &mut self.rng,
                };
                self.environment.feed(name, delta, &mut ctx)?;
            }
            Ordering::Less => {
                let amount = delta
                    .checked_neg()
                    .ok_or_else(|| AgentError::ArithmeticOverflow {
                        context: format!("negating payoff {delta} for {name}"),
                    })?;
                self.environment.starve(name, amount)?;
            }
            Ordering::Equal => {}
        }
        Ok(())
    }

    fn release_names(&mut self, removed: &[String]) {
        for name in removed {
            self.names.release(name);
        }
    }

    fn notify<F>(&mut self, mut hook: F) -> Result<(), WorldError>
    where
        F: FnMut(&mut dyn SimulationObserver, &Environment) -> Result<(), ObserverError>,
    {
        for observer in &mut self.observers {
            hook(observer.as_mut(), &self.environment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use generations_types::StrategySpec;

    use super::*;
    use crate::config::RosterEntry;

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl SimulationObserver for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn on_environment_start(&mut self, env: &Environment) -> Result<(), ObserverError> {
            self.log.borrow_mut().push(format!("start:{}", env.len()));
            Ok(())
        }

        fn on_iteration_start(&mut self, env: &Environment) -> Result<(), ObserverError> {
            self.log.borrow_mut().push(format!("iter:{}", env.iteration()));
            Ok(())
        }

        fn on_iteration_end(&mut self, env: &Environment) -> Result<(), ObserverError> {
            self.log.borrow_mut().push(format!("end:{}", env.iteration()));
            Ok(())
        }

        fn on_environment_end(&mut self, _env: &Environment) -> Result<(), ObserverError> {
            self.log.borrow_mut().push(String::from("finish"));
            Ok(())
        }
    }

    struct Failing;

    impl SimulationObserver for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_iteration_end(&mut self, _env: &Environment) -> Result<(), ObserverError> {
            Err(ObserverError::Failed {
                observer: String::from("failing"),
                message: String::from("boom"),
            })
        }
    }

    fn small_config(iterations: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.iterations = iterations;
        config
    }

    #[test]
    fn seeds_roster_on_construction() {
        let world = World::new(SimulationConfig::default()).unwrap();
        assert_eq!(world.phase(), WorldPhase::Seeded);
        assert_eq!(world.environment().len(), 5);
        for name in ["cheat", "sucker", "random", "grudger", "tit_for_tat"] {
            assert_eq!(world.environment().critter(name).map(Critter::food), Some(5));
        }
        assert_eq!(world.environment().strategy_counts().get("RND_1"), Some(&1));
    }

    #[test]
    fn unnamed_entries_get_generated_names() {
        let mut config = SimulationConfig::default();
        config.population.roster = vec![
            RosterEntry::named("Critter_1", StrategySpec::Grudger),
            RosterEntry {
                name: None,
                strategy: StrategySpec::TitForTat,
            },
        ];
        let world = World::new(config).unwrap();
        assert!(world.environment().contains("Critter_1"));
        assert!(world.environment().contains("Critter_2"));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = SimulationConfig::default();
        config.population.roster.clear();
        assert!(matches!(
            World::new(config),
            Err(WorldError::Config {
                source: ConfigError::EmptyRoster
            })
        ));
    }

    #[test]
    fn observers_see_lifecycle_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new(small_config(2)).unwrap();
        world.add_observer(Box::new(Recorder {
            log: Rc::clone(&log),
        }));
        let summary = world.run_configured().unwrap();

        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.run_id, world.run_id());
        assert_eq!(world.phase(), WorldPhase::Finished);
        assert_eq!(
            *log.borrow(),
            vec!["start:5", "iter:1", "end:1", "iter:2", "end:2", "finish"]
        );
    }

    #[test]
    fn world_runs_once() {
        let mut world = World::new(small_config(1)).unwrap();
        world.run_configured().unwrap();
        assert!(matches!(world.run(1), Err(WorldError::AlreadyFinished)));
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut world = World::new(small_config(1)).unwrap();
        assert!(matches!(
            world.run(0),
            Err(WorldError::Config {
                source: ConfigError::InvalidIterations { iterations: 0 }
            })
        ));
        assert_eq!(world.phase(), WorldPhase::Seeded);
    }

    #[test]
    fn failing_observer_aborts_run() {
        let mut world = World::new(small_config(10)).unwrap();
        world.add_observer(Box::new(Failing));
        assert!(matches!(world.run_configured(), Err(WorldError::Observer { .. })));
        assert_eq!(world.phase(), WorldPhase::Running { iteration: 1 });
    }

    #[test]
    fn same_seed_same_outcome() {
        let mut a = World::new(small_config(40)).unwrap();
        let mut b = World::new(small_config(40)).unwrap();
        let first = a.run_configured().unwrap();
        let second = b.run_configured().unwrap();
        assert_eq!(first.strategy_counts, second.strategy_counts);
        assert_eq!(a.environment().names(), b.environment().names());
        let food = |w: &World| {
            w.environment()
                .population()
                .values()
                .map(Critter::food)
                .collect::<Vec<_>>()
        };
        assert_eq!(food(&a), food(&b));
    }

    #[test]
    fn self_interaction_is_rejected() {
        let mut world = World::new(SimulationConfig::default()).unwrap();
        assert!(matches!(
            world.interact_critters("sucker", "sucker"),
            Err(WorldError::SelfInteraction { name }) if name == "sucker"
        ));
        assert_eq!(world.environment().critter("sucker").map(Critter::food), Some(5));
    }

    #[test]
    fn clone_offspring_avoid_taken_names() {
        let mut config = SimulationConfig::default();
        config.population.starting_food = 148;
        config.environment.upkeep_cost = 0;
        config.lifecycle.mutation_probability = 0.0;
        config.population.roster = vec![
            RosterEntry::named("a", StrategySpec::AlwaysCooperate),
            RosterEntry::named("a.1", StrategySpec::AlwaysCooperate),
        ];
        let mut world = World::new(config).unwrap();

        world.interact_critters("a", "a.1").unwrap();
        assert_eq!(
            world.environment().names(),
            vec!["a", "a.1", "a.1.1", "a.2"]
        );
        assert_eq!(world.environment().critter("a").map(Critter::food), Some(52));
    }

    #[test]
    fn removed_critters_release_their_names() {
        let mut config = small_config(30);
        config.lifecycle.mutation_probability = 0.0;
        let mut world = World::new(config).unwrap();
        world.run_configured().unwrap();
        assert_eq!(world.names.in_use(), world.environment().len());
    }

    #[test]
    fn interacting_with_missing_critter_fails() {
        let mut world = World::new(SimulationConfig::default()).unwrap();
        assert!(matches!(
            world.interact_critters("cheat", "ghost"),
            Err(WorldError::CritterMissing { name }) if name == "ghost"
        ));
    }
}
