//! Strategy configuration shared by the roster, the mutation catalog, and
//! the per-strategy aggregates.
//!
//! A [`StrategySpec`] is the configuration-only view of a strategy: it
//! names the variant and carries its parameters, but never any
//! per-opponent memory. Live strategies are built from a spec and can be
//! turned back into one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Short name for the always-defect strategy.
pub const ALWAYS_DEFECT_SHORT_NAME: &str = "CHT";
/// Short name for the always-cooperate strategy.
pub const ALWAYS_COOPERATE_SHORT_NAME: &str = "SCK";
/// Short-name prefix for the weighted random strategy.
pub const WEIGHTED_RANDOM_SHORT_PREFIX: &str = "RND";
/// Short name for the grudger strategy.
pub const GRUDGER_SHORT_NAME: &str = "GRD";
/// Short name for the tit-for-tat strategy.
pub const TIT_FOR_TAT_SHORT_NAME: &str = "T4T";

/// Configuration of a decision policy.
///
/// Deserializes from a tagged map, e.g.
/// `{ kind: weighted_random, cooperation_weight: 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    /// Always defects.
    AlwaysDefect,
    /// Always cooperates.
    AlwaysCooperate,
    /// Cooperates with probability `weight / (weight + 1)`.
    WeightedRandom {
        /// Relative weight of cooperation against a defection weight of 1.
        #[serde(default = "default_cooperation_weight")]
        cooperation_weight: Decimal,
    },
    /// Cooperates until an opponent defects against it, then defects
    /// against that opponent forever.
    Grudger,
    /// Cooperates first, then repeats the opponent's last action.
    TitForTat,
}

/// Default cooperation weight for [`StrategySpec::WeightedRandom`] (1, a fair coin).
pub const fn default_cooperation_weight() -> Decimal {
    Decimal::ONE
}

impl StrategySpec {
    /// A weighted random spec with the given cooperation weight.
    pub const fn weighted_random(cooperation_weight: Decimal) -> Self {
        Self::WeightedRandom { cooperation_weight }
    }

    /// Stable short name used as the per-strategy aggregation key.
    ///
    /// Weighted random strategies embed their weight (`RND_3`), so two
    /// weighted strategies with different weights aggregate separately.
    pub fn short_name(&self) -> String {
        match self {
            Self::AlwaysDefect => ALWAYS_DEFECT_SHORT_NAME.to_owned(),
            Self::AlwaysCooperate => ALWAYS_COOPERATE_SHORT_NAME.to_owned(),
            Self::WeightedRandom { cooperation_weight } => {
                format!("{WEIGHTED_RANDOM_SHORT_PREFIX}_{}", cooperation_weight.normalize())
            }
            Self::Grudger => GRUDGER_SHORT_NAME.to_owned(),
            Self::TitForTat => TIT_FOR_TAT_SHORT_NAME.to_owned(),
        }
    }

    /// One spec of every strategy kind, in a fixed order.
    ///
    /// This is the default roster and the default mutation catalog.
    pub fn catalog() -> Vec<Self> {
        vec![
            Self::AlwaysDefect,
            Self::AlwaysCooperate,
            Self::weighted_random(default_cooperation_weight()),
            Self::Grudger,
            Self::TitForTat,
        ]
    }
}

impl core::fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.short_name())
    }
}
