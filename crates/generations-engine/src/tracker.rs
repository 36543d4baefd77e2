//! Follows one critter through the run.
//!
//! [`CritterTracker`] records every interaction of a named critter from
//! that critter's point of view and classifies the outcome. The recorded
//! history is reported when the run ends.

use core::fmt;

use generations_agents::Critter;
use generations_core::{Environment, ObserverError, SimulationObserver};
use generations_types::{Action, Interaction};
use tracing::{debug, info, warn};

/// How an interaction went for the tracked critter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    /// Both cooperated.
    CooperatedWith,
    /// Both defected.
    NoInteractionWith,
    /// The tracked critter cooperated and the opponent defected.
    WasSuckeredBy,
    /// The tracked critter defected against a cooperator.
    Cheated,
}

impl Encounter {
    /// Classify from the tracked critter's action and the opponent's.
    pub const fn classify(own: Action, opponent: Action) -> Self {
        match (own, opponent) {
            (Action::Cooperate, Action::Cooperate) => Self::CooperatedWith,
            (Action::Defect, Action::Defect) => Self::NoInteractionWith,
            (Action::Cooperate, Action::Defect) => Self::WasSuckeredBy,
            (Action::Defect, Action::Cooperate) => Self::Cheated,
        }
    }

    /// The phrase placed between the two names in a report line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CooperatedWith => "cooperated with",
            Self::NoInteractionWith => "had no interaction with",
            Self::WasSuckeredBy => "was suckered by",
            Self::Cheated => "cheated",
        }
    }
}

impl fmt::Display for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One interaction of the tracked critter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEncounter {
    /// Iteration of the interaction.
    pub iteration: u64,
    /// The other participant.
    pub opponent: String,
    /// How it went.
    pub encounter: Encounter,
    /// The tracked critter's food afterwards, if it is still alive.
    pub food_after: Option<i64>,
}

/// Observer following a single critter.
#[derive(Debug)]
pub struct CritterTracker {
    target: String,
    encounters: Vec<TrackedEncounter>,
}

impl CritterTracker {
    /// Track the critter with this identity.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            encounters: Vec::new(),
        }
    }
}

impl SimulationObserver for CritterTracker {
    fn name(&self) -> &str {
        "critter_tracker"
    }

    fn on_environment_start(&mut self, env: &Environment) -> Result<(), ObserverError> {
        if env.contains(&self.target) {
            info!(critter = %self.target, "Tracking critter");
        } else {
            warn!(critter = %self.target, "Tracked critter is not in the initial population");
        }
        Ok(())
    }

    fn on_interaction_end(
        &mut self,
        env: &Environment,
        interaction: &Interaction,
    ) -> Result<(), ObserverError> {
        let Some((own, opponent, opponent_action)) = interaction.perspective(&self.target) else {
            return Ok(());
        };
        let encounter = Encounter::classify(own, opponent_action);
        let food_after = env.critter(&self.target).map(Critter::food);
        debug!(
            iteration = interaction.iteration,
            critter = %self.target,
            opponent,
            food = ?food_after,
            "{} {encounter} {opponent}",
            self.target
        );
        self.encounters.push(TrackedEncounter {
            iteration: interaction.iteration,
            opponent: opponent.to_owned(),
            encounter,
            food_after,
        });
        Ok(())
    }

    fn on_environment_end(&mut self, env: &Environment) -> Result<(), ObserverError> {
        for encounter in &self.encounters {
            info!(
                iteration = encounter.iteration,
                critter = %self.target,
                opponent = %encounter.opponent,
                food = ?encounter.food_after,
                "{} {} {}",
                self.target,
                encounter.encounter,
                encounter.opponent
            );
        }
        info!(
            critter = %self.target,
            encounters = self.encounters.len(),
            alive = env.contains(&self.target),
            "Tracking finished"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use generations_agents::{NameGenerator, Strategy};

    use super::*;

    fn record(first: &str, first_action: Action, second: &str, second_action: Action) -> Interaction {
        Interaction {
            iteration: 3,
            first: first.to_owned(),
            first_action,
            first_delta: 0,
            second: second.to_owned(),
            second_action,
            second_delta: 0,
        }
    }

    #[test]
    fn classification_covers_matrix() {
        use Action::{Cooperate, Defect};
        assert_eq!(Encounter::classify(Cooperate, Cooperate).as_str(), "cooperated with");
        assert_eq!(Encounter::classify(Defect, Defect).as_str(), "had no interaction with");
        assert_eq!(Encounter::classify(Cooperate, Defect).as_str(), "was suckered by");
        assert_eq!(Encounter::classify(Defect, Cooperate).as_str(), "cheated");
    }

    #[test]
    fn records_from_tracked_perspective() {
        let mut names = NameGenerator::new();
        let mut env = Environment::new(0);
        env.add_critter(Critter::new(
            Some(String::from("t")),
            Strategy::tit_for_tat(),
            9,
            &mut names,
        ));
        let mut tracker = CritterTracker::new("t");

        tracker
            .on_interaction_end(&env, &record("x", Action::Defect, "t", Action::Cooperate))
            .unwrap();
        tracker
            .on_interaction_end(&env, &record("t", Action::Defect, "y", Action::Defect))
            .unwrap();
        tracker
            .on_interaction_end(&env, &record("x", Action::Defect, "y", Action::Cooperate))
            .unwrap();

        assert_eq!(tracker.target, "t");
        assert_eq!(
            tracker.encounters,
            [
                TrackedEncounter {
                    iteration: 3,
                    opponent: String::from("x"),
                    encounter: Encounter::WasSuckeredBy,
                    food_after: Some(9),
                },
                TrackedEncounter {
                    iteration: 3,
                    opponent: String::from("y"),
                    encounter: Encounter::NoInteractionWith,
                    food_after: Some(9),
                },
            ]
        );
    }

    #[test]
    fn dead_target_has_no_food() {
        let env = Environment::new(0);
        let mut tracker = CritterTracker::new("gone");
        tracker
            .on_interaction_end(&env, &record("gone", Action::Defect, "y", Action::Cooperate))
            .unwrap();
        assert_eq!(tracker.encounters.first().and_then(|e| e.food_after), None);
        assert_eq!(
            tracker.encounters.first().map(|e| e.encounter),
            Some(Encounter::Cheated)
        );
        assert!(tracker.on_environment_end(&env).is_ok());
        assert_eq!(tracker.encounters.len(), 1);
    }
}
