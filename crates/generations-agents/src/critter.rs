//! The agent of the simulation.
//!
//! A [`Critter`] wraps a [`Strategy`], carries a food balance, and
//! announces its own lifecycle: it emits a dying event when its food runs
//! out and a reproducing event when it crosses the reproduction threshold.
//! It never removes itself from anything -- whoever listens decides what
//! an event means.

use generations_types::Action;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::config::LifecycleConfig;
use crate::error::AgentError;
use crate::events::{EventBus, EventFilter, EventPayload, ListenerHandle};
use crate::naming::NameGenerator;
use crate::strategy::Strategy;

/// Collaborators a critter needs to produce an offspring.
///
/// Bundles the lifecycle parameters, the name generator owned by the
/// world, and the world's random source.
pub struct ReproductionContext<'a> {
    /// Reproduction and mutation parameters.
    pub config: &'a LifecycleConfig,
    /// Source of names for mutant offspring.
    pub names: &'a mut NameGenerator,
    /// Random source for the mutation roll and catalog draw.
    pub rng: &'a mut dyn RngCore,
}

impl core::fmt::Debug for ReproductionContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReproductionContext")
            .field("config", self.config)
            .field("names", self.names)
            .finish_non_exhaustive()
    }
}

/// A stateful agent bound to one strategy.
#[derive(Debug)]
pub struct Critter {
    name: String,
    food: i64,
    strategy: Strategy,
    offspring_count: u32,
    events: EventBus,
}

impl Critter {
    /// Create a critter. Without a name, the next generated name is used;
    /// an explicit name is reserved so it is never generated later.
    pub fn new(
        name: Option<String>,
        strategy: Strategy,
        starting_food: i64,
        names: &mut NameGenerator,
    ) -> Self {
        if let Some(name) = &name {
            names.reserve(name.clone());
        }
        let name = name.unwrap_or_else(|| names.next_name());
        Self {
            name,
            food: starting_food,
            strategy,
            offspring_count: 0,
            events: EventBus::new(),
        }
    }

    /// The critter's unique identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current food balance.
    pub const fn food(&self) -> i64 {
        self.food
    }

    /// The critter's strategy.
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Number of offspring produced so far.
    pub const fn offspring_count(&self) -> u32 {
        self.offspring_count
    }

    /// Number of registered event listeners.
    pub fn listener_count(&self) -> usize {
        self.events.len()
    }

    /// Decide how to act against `opponent`.
    pub fn interact<R: Rng + ?Sized>(&self, opponent: &str, rng: &mut R) -> Action {
        self.strategy.decide(opponent, rng)
    }

    /// Let the strategy learn from an interaction, with this critter as
    /// the memory owner.
    pub fn observe_interaction(
        &mut self,
        first: &str,
        first_action: Action,
        second: &str,
        second_action: Action,
    ) {
        self.strategy
            .observe(&self.name, first, first_action, second, second_action);
    }

    /// Add food. Crossing above the reproduction threshold triggers
    /// [`reproduce`](Self::reproduce) once.
    ///
    /// Returns the offspring if one was born and no listener took it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ArithmeticOverflow`] on balance overflow, or any
    /// error from reproduction.
    pub fn add_food(
        &mut self,
        amount: i64,
        ctx: &mut ReproductionContext<'_>,
    ) -> Result<Option<Self>, AgentError> {
        let before = self.food;
        self.food = before
            .checked_add(amount)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("adding {amount} food to {}", self.name),
            })?;

        let threshold = ctx.config.reproduction_threshold;
        if before <= threshold && self.food > threshold {
            return self.reproduce(ctx);
        }
        Ok(None)
    }

    /// Remove food. Falling to zero or below emits a dying event.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ArithmeticOverflow`] on balance underflow.
    pub fn remove_food(&mut self, amount: i64) -> Result<(), AgentError> {
        self.food = self
            .food
            .checked_sub(amount)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("removing {amount} food from {}", self.name),
            })?;
        if self.food <= 0 {
            self.announce_dying();
        }
        Ok(())
    }

    /// Produce one offspring and announce it.
    ///
    /// The parent pays the reproduction cost. With the configured mutation
    /// probability the offspring's strategy is drawn uniformly from the
    /// mutation catalog and it gets a generated name; otherwise it gets a
    /// fresh copy of the parent's strategy and is named `<parent>.<index>`,
    /// where the index starts at the offspring count and skips names
    /// already taken.
    ///
    /// Returns the offspring if no listener took it from the event.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyMutationCatalog`] if a mutant is rolled
    /// with an empty catalog, or [`AgentError::ArithmeticOverflow`].
    pub fn reproduce(
        &mut self,
        ctx: &mut ReproductionContext<'_>,
    ) -> Result<Option<Self>, AgentError> {
        self.offspring_count =
            self.offspring_count
                .checked_add(1)
                .ok_or_else(|| AgentError::ArithmeticOverflow {
                    context: format!("offspring counter of {}", self.name),
                })?;
        self.food = self
            .food
            .checked_sub(ctx.config.reproduction_cost)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("reproduction cost for {}", self.name),
            })?;

        let mutant = ctx.rng.random::<f64>() < ctx.config.mutation_probability;
        let offspring = if mutant {
            let catalog = &ctx.config.mutation_catalog;
            if catalog.is_empty() {
                return Err(AgentError::EmptyMutationCatalog);
            }
            let index = ctx.rng.random_range(0..catalog.len());
            let spec = catalog.get(index).ok_or(AgentError::EmptyMutationCatalog)?;
            Self::new(
                None,
                Strategy::from_spec(spec)?,
                ctx.config.offspring_starting_food,
                ctx.names,
            )
        } else {
            let name = self.clone_name(ctx.names)?;
            Self::new(
                Some(name),
                self.strategy.spawn(),
                ctx.config.offspring_starting_food,
                ctx.names,
            )
        };

        debug!(
            parent = %self.name,
            offspring = %offspring.name,
            strategy = %offspring.strategy.short_name(),
            mutant,
            "Critter reproduced"
        );

        let mut payload = EventPayload::Reproducing {
            offspring_name: offspring.name.clone(),
            offspring_strategy: offspring.strategy.short_name(),
            mutant,
            offspring: Some(Box::new(offspring)),
        };
        self.send_event(&mut payload);

        if self.food <= 0 {
            self.announce_dying();
        }
        Ok(payload.take_offspring())
    }

    /// Register a listener on this critter's event bus.
    pub fn subscribe<F>(&mut self, filter: EventFilter, listener: F) -> ListenerHandle
    where
        F: FnMut(&Self, &mut EventPayload) + 'static,
    {
        self.events.subscribe(filter, listener)
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        self.events.unsubscribe(handle)
    }

    fn clone_name(&self, names: &NameGenerator) -> Result<String, AgentError> {
        let mut index = self.offspring_count;
        loop {
            let candidate = format!("{}.{index}", self.name);
            if !names.is_reserved(&candidate) {
                return Ok(candidate);
            }
            index = index
                .checked_add(1)
                .ok_or_else(|| AgentError::ArithmeticOverflow {
                    context: format!("offspring index of {}", self.name),
                })?;
        }
    }

    fn announce_dying(&mut self) {
        debug!(critter = %self.name, food = self.food, "Critter dying");
        let mut payload = EventPayload::Dying { food: self.food };
        self.send_event(&mut payload);
    }

    /// Deliver an event to this critter's listeners.
    ///
    /// The bus is detached for the duration of the dispatch so listeners
    /// can borrow the critter as the event source.
    fn send_event(&mut self, payload: &mut EventPayload) {
        let mut bus = core::mem::take(&mut self.events);
        bus.dispatch(self, payload);
        self.events = bus;
    }
}
