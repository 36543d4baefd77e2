//! The record of a single resolved interaction.

use serde::{Deserialize, Serialize};

use crate::enums::Action;

/// One resolved pairing within an iteration.
///
/// Records are ephemeral: the engine builds one per interaction, hands it
/// to every observer, and drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Iteration in which the interaction happened.
    pub iteration: u64,
    /// Name of the first participant.
    pub first: String,
    /// What the first participant did.
    pub first_action: Action,
    /// Food change applied to the first participant.
    pub first_delta: i64,
    /// Name of the second participant.
    pub second: String,
    /// What the second participant did.
    pub second_action: Action,
    /// Food change applied to the second participant.
    pub second_delta: i64,
}

impl Interaction {
    /// Whether the named critter took part in this interaction.
    pub fn involves(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }

    /// The interaction from the named participant's point of view:
    /// `(own action, opponent name, opponent action)`.
    ///
    /// Returns `None` if the critter did not take part.
    pub fn perspective(&self, name: &str) -> Option<(Action, &str, Action)> {
        if self.first == name {
            Some((self.first_action, self.second.as_str(), self.second_action))
        } else if self.second == name {
            Some((self.second_action, self.first.as_str(), self.first_action))
        } else {
            None
        }
    }
}
