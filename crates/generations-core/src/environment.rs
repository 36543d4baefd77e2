//! The live population.
//!
//! [`Environment`] owns every living critter keyed by identity, keeps a
//! live count of critters per strategy short name, and runs the
//! end-of-iteration upkeep and death sweep.
//!
//! The environment registers itself as a listener on every critter it
//! admits. Lifecycle events land in an inbox that [`Environment::settle`]
//! applies: offspring join the population straight away, while deaths
//! announced during an open iteration wait for the sweep in
//! [`Environment::end_iteration`].

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use generations_agents::{AgentError, Critter, EventFilter, ListenerHandle, ReproductionContext};
use generations_types::{Action, EventKind, Interaction};
use rand::Rng;
use tracing::{debug, warn};

/// Errors raised by population operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// An operation referenced a critter that is not in the population.
    #[error("critter not in population: {name}")]
    CritterMissing {
        /// The missing identity.
        name: String,
    },

    /// A critter operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// A lifecycle event waiting to be applied to the population.
#[derive(Debug)]
enum PopulationChange {
    Born(Critter),
    Died(String),
}

type Inbox = Rc<RefCell<VecDeque<PopulationChange>>>;

/// The population of one run.
#[derive(Debug)]
pub struct Environment {
    iteration: u64,
    iteration_open: bool,
    upkeep_cost: i64,
    population: BTreeMap<String, Critter>,
    strategy_counts: BTreeMap<String, u32>,
    handles: BTreeMap<String, ListenerHandle>,
    inbox: Inbox,
}

impl Environment {
    /// An empty population charging `upkeep_cost` food per iteration.
    pub fn new(upkeep_cost: i64) -> Self {
        Self {
            iteration: 0,
            iteration_open: false,
            upkeep_cost,
            population: BTreeMap::new(),
            strategy_counts: BTreeMap::new(),
            handles: BTreeMap::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// The current iteration number; 0 before the first iteration starts.
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Whether an iteration has started and not yet ended.
    pub const fn in_iteration(&self) -> bool {
        self.iteration_open
    }

    /// Food each critter loses at the end of an iteration.
    pub const fn upkeep_cost(&self) -> i64 {
        self.upkeep_cost
    }

    /// Living critters keyed by identity, in name order.
    pub const fn population(&self) -> &BTreeMap<String, Critter> {
        &self.population
    }

    /// Look up a living critter.
    pub fn critter(&self, name: &str) -> Option<&Critter> {
        self.population.get(name)
    }

    /// Whether a critter with this identity is alive.
    pub fn contains(&self, name: &str) -> bool {
        self.population.contains_key(name)
    }

    /// Number of living critters.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// Whether the population is extinct.
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Identities of the living critters, in name order.
    pub fn names(&self) -> Vec<String> {
        self.population.keys().cloned().collect()
    }

    /// Live critter count per strategy short name.
    pub const fn strategy_counts(&self) -> &BTreeMap<String, u32> {
        &self.strategy_counts
    }

    /// Total food held per strategy short name.
    pub fn strategy_food_totals(&self) -> BTreeMap<String, i64> {
        let mut totals: BTreeMap<String, i64> = BTreeMap::new();
        for critter in self.population.values() {
            let total = totals.entry(critter.strategy().short_name()).or_default();
            *total = total.saturating_add(critter.food());
        }
        totals
    }

    /// Admit a critter to the population.
    ///
    /// An identity already present is left untouched: the newcomer is
    /// dropped, the strategy counts are unchanged, and `false` is returned.
    pub fn add_critter(&mut self, mut critter: Critter) -> bool {
        if self.population.contains_key(critter.name()) {
            warn!(critter = critter.name(), "Duplicate identity not admitted");
            return false;
        }

        let inbox = Rc::clone(&self.inbox);
        let handle = critter.subscribe(EventFilter::Any, move |source, payload| {
            let change = match payload.kind() {
                EventKind::Dying => Some(PopulationChange::Died(source.name().to_owned())),
                EventKind::Reproducing => payload.take_offspring().map(PopulationChange::Born),
            };
            if let Some(change) = change {
                inbox.borrow_mut().push_back(change);
            }
        });

        let count = self
            .strategy_counts
            .entry(critter.strategy().short_name())
            .or_default();
        *count = count.saturating_add(1);

        debug!(
            critter = critter.name(),
            strategy = %critter.strategy().short_name(),
            food = critter.food(),
            iteration = self.iteration,
            "Critter admitted"
        );
        let name = critter.name().to_owned();
        self.handles.insert(name.clone(), handle);
        self.population.insert(name, critter);
        true
    }

    /// Admit every critter. Returns how many were admitted.
    pub fn add_critters<I>(&mut self, critters: I) -> usize
    where
        I: IntoIterator<Item = Critter>,
    {
        let mut admitted = 0_usize;
        for critter in critters {
            if self.add_critter(critter) {
                admitted = admitted.saturating_add(1);
            }
        }
        admitted
    }

    /// Take a critter out of the population.
    pub fn remove_critter(&mut self, name: &str) -> Option<Critter> {
        let mut critter = self.population.remove(name)?;
        if let Some(handle) = self.handles.remove(name) {
            critter.unsubscribe(handle);
        }

        let short_name = critter.strategy().short_name();
        if let Some(count) = self.strategy_counts.get_mut(&short_name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.strategy_counts.remove(&short_name);
            }
        }

        debug!(
            critter = name,
            food = critter.food(),
            iteration = self.iteration,
            "Critter removed"
        );
        Some(critter)
    }

    /// Advance to the next iteration.
    pub const fn start_iteration(&mut self) {
        self.iteration = self.iteration.saturating_add(1);
        self.iteration_open = true;
    }

    /// Charge upkeep to every critter, then remove every critter whose food
    /// is zero or below.
    ///
    /// Returns the identities removed.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Agent`] if charging upkeep overflows.
    pub fn end_iteration(&mut self) -> Result<Vec<String>, EnvironmentError> {
        for critter in self.population.values_mut() {
            critter.remove_food(self.upkeep_cost)?;
        }

        let starved: Vec<String> = self
            .population
            .iter()
            .filter(|(_, critter)| critter.food() <= 0)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &starved {
            self.remove_critter(name);
        }

        self.iteration_open = false;
        let mut removed = starved;
        removed.extend(self.settle());
        Ok(removed)
    }

    /// Decide `name`'s action against `opponent`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::CritterMissing`] if `name` is not alive.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        name: &str,
        opponent: &str,
        rng: &mut R,
    ) -> Result<Action, EnvironmentError> {
        Ok(self.living(name)?.interact(opponent, rng))
    }

    /// Give food to a critter, which may reproduce.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::CritterMissing`] if `name` is not alive, or
    /// [`EnvironmentError::Agent`] if the critter's bookkeeping fails.
    pub fn feed(
        &mut self,
        name: &str,
        amount: i64,
        ctx: &mut ReproductionContext<'_>,
    ) -> Result<(), EnvironmentError> {
        let unclaimed = self.living_mut(name)?.add_food(amount, ctx)?;
        if let Some(offspring) = unclaimed {
            self.inbox
                .borrow_mut()
                .push_back(PopulationChange::Born(offspring));
        }
        Ok(())
    }

    /// Take food from a critter, which may announce its death.
    ///
    /// The death is queued; [`settle`](Self::settle) applies it once no
    /// iteration is open.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::CritterMissing`] if `name` is not alive, or
    /// [`EnvironmentError::Agent`] on underflow.
    pub fn starve(&mut self, name: &str, amount: i64) -> Result<(), EnvironmentError> {
        self.living_mut(name)?.remove_food(amount)?;
        Ok(())
    }

    /// Let both participants of an interaction learn from it.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::CritterMissing`] if a participant is not
    /// alive.
    pub fn record_interaction(&mut self, interaction: &Interaction) -> Result<(), EnvironmentError> {
        for name in [&interaction.first, &interaction.second] {
            self.living_mut(name)?.observe_interaction(
                &interaction.first,
                interaction.first_action,
                &interaction.second,
                interaction.second_action,
            );
        }
        Ok(())
    }

    /// Apply pending lifecycle events.
    ///
    /// Offspring are admitted. A death is applied only outside an open
    /// iteration, and only if the critter still has no food; during an
    /// iteration the end-of-iteration sweep decides.
    ///
    /// Returns the identities removed.
    pub fn settle(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        while let Some(change) = self.next_change() {
            match change {
                PopulationChange::Born(offspring) => {
                    self.add_critter(offspring);
                }
                PopulationChange::Died(name) => {
                    let starved = self.critter(&name).is_some_and(|c| c.food() <= 0);
                    if !self.iteration_open && starved && self.remove_critter(&name).is_some() {
                        removed.push(name);
                    }
                }
            }
        }
        removed
    }

    fn next_change(&self) -> Option<PopulationChange> {
        self.inbox.borrow_mut().pop_front()
    }

    fn living(&self, name: &str) -> Result<&Critter, EnvironmentError> {
        self.population
            .get(name)
            .ok_or_else(|| EnvironmentError::CritterMissing {
                name: name.to_owned(),
            })
    }

    fn living_mut(&mut self, name: &str) -> Result<&mut Critter, EnvironmentError> {
        self.population
            .get_mut(name)
            .ok_or_else(|| EnvironmentError::CritterMissing {
                name: name.to_owned(),
            })
    }
}
