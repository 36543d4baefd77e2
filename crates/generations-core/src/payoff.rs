//! The Prisoner's Dilemma payoff matrix.
//!
//! Both sides decide simultaneously; [`PayoffMatrix::resolve`] turns the
//! two decisions into a food delta for each side.

use generations_types::Action;
use serde::Deserialize;

/// Food deltas for each combination of decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PayoffMatrix {
    /// Delta for each side when both cooperate (default: 4).
    #[serde(default = "default_mutual_cooperation")]
    pub mutual_cooperation: i64,

    /// Delta for each side when both defect (default: 0).
    #[serde(default = "default_mutual_defection")]
    pub mutual_defection: i64,

    /// Delta for a cooperator facing a defector (default: -1).
    #[serde(default = "default_sucker")]
    pub sucker: i64,

    /// Delta for a defector facing a cooperator (default: 6).
    #[serde(default = "default_temptation")]
    pub temptation: i64,
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self {
            mutual_cooperation: default_mutual_cooperation(),
            mutual_defection: default_mutual_defection(),
            sucker: default_sucker(),
            temptation: default_temptation(),
        }
    }
}

impl PayoffMatrix {
    /// Food deltas `(first, second)` for the given pair of decisions.
    pub const fn resolve(&self, first: Action, second: Action) -> (i64, i64) {
        match (first, second) {
            (Action::Cooperate, Action::Cooperate) => {
                (self.mutual_cooperation, self.mutual_cooperation)
            }
            (Action::Defect, Action::Defect) => (self.mutual_defection, self.mutual_defection),
            (Action::Cooperate, Action::Defect) => (self.sucker, self.temptation),
            (Action::Defect, Action::Cooperate) => (self.temptation, self.sucker),
        }
    }
}

const fn default_mutual_cooperation() -> i64 {
    4
}

const fn default_mutual_defection() -> i64 {
    0
}

const fn default_sucker() -> i64 {
    -1
}

const fn default_temptation() -> i64 {
    6
}
