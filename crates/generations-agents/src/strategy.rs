//! Decision policies.
//!
//! A [`Strategy`] answers one question -- cooperate or defect against this
//! opponent? -- and may remember how opponents treated it. Memory is keyed
//! by opponent name and owned by the strategy instance; offspring get a
//! fresh instance through [`Strategy::spawn`], never the parent's memory.

use std::collections::{BTreeMap, BTreeSet};

use generations_types::{Action, StrategySpec};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::AgentError;

/// A critter's decision policy, with any per-opponent memory it keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Always defects. No memory.
    AlwaysDefect,
    /// Always cooperates. No memory.
    AlwaysCooperate,
    /// Cooperates with probability `weight / (weight + 1)`. No memory.
    WeightedRandom {
        /// Relative weight of cooperation against a defection weight of 1.
        cooperation_weight: Decimal,
    },
    /// Cooperates unless the opponent has ever defected against it.
    Grudger {
        /// Names of opponents that defected against this critter.
        grudges: BTreeSet<String>,
    },
    /// Mirrors the opponent's last observed action; cooperates with strangers.
    TitForTat {
        /// Last action each opponent took against this critter.
        last_seen: BTreeMap<String, Action>,
    },
}

impl Strategy {
    /// Build a fresh strategy from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidCooperationWeight`] if a weighted random
    /// spec carries a weight that is not strictly positive.
    pub fn from_spec(spec: &StrategySpec) -> Result<Self, AgentError> {
        match spec {
            StrategySpec::AlwaysDefect => Ok(Self::AlwaysDefect),
            StrategySpec::AlwaysCooperate => Ok(Self::AlwaysCooperate),
            StrategySpec::WeightedRandom { cooperation_weight } => {
                Self::weighted_random(*cooperation_weight)
            }
            StrategySpec::Grudger => Ok(Self::grudger()),
            StrategySpec::TitForTat => Ok(Self::tit_for_tat()),
        }
    }

    /// A weighted random strategy.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidCooperationWeight`] unless `cooperation_weight > 0`.
    pub fn weighted_random(cooperation_weight: Decimal) -> Result<Self, AgentError> {
        if cooperation_weight <= Decimal::ZERO {
            return Err(AgentError::InvalidCooperationWeight {
                weight: cooperation_weight.to_string(),
            });
        }
        Ok(Self::WeightedRandom { cooperation_weight })
    }

    /// A grudger with no grudges.
    pub const fn grudger() -> Self {
        Self::Grudger {
            grudges: BTreeSet::new(),
        }
    }

    /// A tit-for-tat strategy that has met nobody.
    pub const fn tit_for_tat() -> Self {
        Self::TitForTat {
            last_seen: BTreeMap::new(),
        }
    }

    /// The configuration of this strategy, without memory.
    pub const fn spec(&self) -> StrategySpec {
        match self {
            Self::AlwaysDefect => StrategySpec::AlwaysDefect,
            Self::AlwaysCooperate => StrategySpec::AlwaysCooperate,
            Self::WeightedRandom { cooperation_weight } => {
                StrategySpec::weighted_random(*cooperation_weight)
            }
            Self::Grudger { .. } => StrategySpec::Grudger,
            Self::TitForTat { .. } => StrategySpec::TitForTat,
        }
    }

    /// Stable short name used as the per-strategy aggregation key.
    pub fn short_name(&self) -> String {
        self.spec().short_name()
    }

    /// Probability of cooperating, for weighted random strategies.
    pub fn cooperation_chance(&self) -> Option<Decimal> {
        match self {
            Self::WeightedRandom { cooperation_weight } => {
                let denominator = cooperation_weight.checked_add(Decimal::ONE)?;
                cooperation_weight.checked_div(denominator)
            }
            _ => None,
        }
    }

    /// Decide how to act against `opponent`.
    pub fn decide<R: Rng + ?Sized>(&self, opponent: &str, rng: &mut R) -> Action {
        match self {
            Self::AlwaysDefect => Action::Defect,
            Self::AlwaysCooperate => Action::Cooperate,
            Self::WeightedRandom { .. } => {
                let chance = self
                    .cooperation_chance()
                    .and_then(|c| c.to_f64())
                    .unwrap_or(0.0);
                if rng.random::<f64>() < chance {
                    Action::Cooperate
                } else {
                    Action::Defect
                }
            }
            Self::Grudger { grudges } => {
                if grudges.contains(opponent) {
                    Action::Defect
                } else {
                    Action::Cooperate
                }
            }
            Self::TitForTat { last_seen } => {
                last_seen.get(opponent).copied().unwrap_or(Action::Cooperate)
            }
        }
    }

    /// Learn from an interaction between `first` and `second`.
    ///
    /// `me` is the name of the critter owning this strategy. The owner is
    /// matched against both participants to find the counterpart; if the
    /// owner took no part, nothing is recorded.
    pub fn observe(
        &mut self,
        me: &str,
        first: &str,
        first_action: Action,
        second: &str,
        second_action: Action,
    ) {
        let (opponent, opponent_action) = if first == me {
            (second, second_action)
        } else if second == me {
            (first, first_action)
        } else {
            return;
        };

        match self {
            Self::AlwaysDefect | Self::AlwaysCooperate | Self::WeightedRandom { .. } => {}
            Self::Grudger { grudges } => {
                if opponent_action.is_defect() {
                    grudges.insert(opponent.to_owned());
                }
            }
            Self::TitForTat { last_seen } => {
                last_seen.insert(opponent.to_owned(), opponent_action);
            }
        }
    }

    /// A new instance with the same configuration and empty memory.
    pub fn spawn(&self) -> Self {
        match self {
            Self::AlwaysDefect => Self::AlwaysDefect,
            Self::AlwaysCooperate => Self::AlwaysCooperate,
            Self::WeightedRandom { cooperation_weight } => Self::WeightedRandom {
                cooperation_weight: *cooperation_weight,
            },
            Self::Grudger { .. } => Self::grudger(),
            Self::TitForTat { .. } => Self::tit_for_tat(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn constant_strategies_ignore_opponent() {
        let mut rng = rng();
        assert_eq!(Strategy::AlwaysDefect.decide("anyone", &mut rng), Action::Defect);
        assert_eq!(
            Strategy::AlwaysCooperate.decide("anyone", &mut rng),
            Action::Cooperate
        );
    }

    #[test]
    fn constant_strategies_have_no_memory() {
        let mut strategy = Strategy::AlwaysCooperate;
        strategy.observe("me", "me", Action::Cooperate, "them", Action::Defect);
        assert_eq!(strategy, Strategy::AlwaysCooperate);
    }

    #[test]
    fn weighted_random_chance() {
        let strategy = Strategy::weighted_random(dec!(3)).unwrap_or(Strategy::AlwaysDefect);
        assert_eq!(strategy.cooperation_chance(), Some(dec!(0.75)));
        assert_eq!(strategy.short_name(), "RND_3");

        let fair = Strategy::weighted_random(Decimal::ONE).unwrap_or(Strategy::AlwaysDefect);
        assert_eq!(fair.cooperation_chance(), Some(dec!(0.5)));
    }

    #[test]
    fn weighted_random_rejects_non_positive_weight() {
        assert!(Strategy::weighted_random(Decimal::ZERO).is_err());
        assert!(Strategy::weighted_random(dec!(-2)).is_err());
        assert!(Strategy::from_spec(&StrategySpec::weighted_random(dec!(0))).is_err());
    }

    #[test]
    fn weighted_random_roughly_matches_chance() {
        let strategy = Strategy::weighted_random(dec!(3)).unwrap_or(Strategy::AlwaysDefect);
        let mut rng = rng();
        let cooperations = (0..4000)
            .filter(|_| strategy.decide("x", &mut rng).is_cooperate())
            .count();
        // Expected 3000; allow a generous band for a seeded sample.
        assert!((2800..=3200).contains(&cooperations), "got {cooperations}");
    }

    #[test]
    fn grudger_cooperates_until_betrayed() {
        let mut rng = rng();
        let mut grudger = Strategy::grudger();
        assert_eq!(grudger.decide("c1", &mut rng), Action::Cooperate);

        grudger.observe("g", "g", Action::Cooperate, "c1", Action::Defect);
        assert_eq!(grudger.decide("c1", &mut rng), Action::Defect);
        assert_eq!(grudger.decide("c2", &mut rng), Action::Cooperate);
    }

    #[test]
    fn grudger_never_forgives() {
        let mut rng = rng();
        let mut grudger = Strategy::grudger();
        grudger.observe("g", "x", Action::Defect, "g", Action::Cooperate);
        for _ in 0..5 {
            grudger.observe("g", "g", Action::Defect, "x", Action::Cooperate);
            assert_eq!(grudger.decide("x", &mut rng), Action::Defect);
        }
    }

    #[test]
    fn grudger_memory_is_a_set() {
        let mut grudger = Strategy::grudger();
        grudger.observe("g1", "c1", Action::Cooperate, "c2", Action::Defect);
        grudger.observe("g1", "g1", Action::Cooperate, "c2", Action::Defect);
        grudger.observe("g1", "g1", Action::Cooperate, "c2", Action::Defect);
        grudger.observe("g1", "g1", Action::Defect, "c1", Action::Cooperate);
        let expected: BTreeSet<String> = [String::from("c2")].into_iter().collect();
        assert_eq!(grudger, Strategy::Grudger { grudges: expected });
    }

    #[test]
    fn tit_for_tat_mirrors_last_action() {
        let mut rng = rng();
        let mut t4t = Strategy::tit_for_tat();
        assert_eq!(t4t.decide("c1", &mut rng), Action::Cooperate);

        t4t.observe("t", "t", Action::Cooperate, "c1", Action::Defect);
        assert_eq!(t4t.decide("c1", &mut rng), Action::Defect);

        t4t.observe("t", "c1", Action::Cooperate, "t", Action::Defect);
        assert_eq!(t4t.decide("c1", &mut rng), Action::Cooperate);
        assert_eq!(t4t.decide("c2", &mut rng), Action::Cooperate);
    }

    #[test]
    fn tit_for_tat_ignores_interactions_without_owner() {
        let mut t4t = Strategy::tit_for_tat();
        t4t.observe("t1", "c1", Action::Cooperate, "c2", Action::Defect);
        assert_eq!(t4t, Strategy::tit_for_tat());
    }

    #[test]
    fn spawn_keeps_configuration_but_drops_memory() {
        let mut grudger = Strategy::grudger();
        grudger.observe("g", "g", Action::Cooperate, "x", Action::Defect);
        assert_eq!(grudger.spawn(), Strategy::grudger());

        let mut t4t = Strategy::tit_for_tat();
        t4t.observe("t", "t", Action::Cooperate, "x", Action::Defect);
        assert_eq!(t4t.spawn(), Strategy::tit_for_tat());

        let weighted = Strategy::weighted_random(dec!(3)).unwrap_or(Strategy::AlwaysDefect);
        assert_eq!(weighted.spawn().cooperation_chance(), Some(dec!(0.75)));
    }

    #[test]
    fn spec_round_trips_through_strategy() {
        for spec in StrategySpec::catalog() {
            let strategy = Strategy::from_spec(&spec);
            assert_eq!(strategy.map(|s| s.spec()).ok(), Some(spec));
        }
    }
}
