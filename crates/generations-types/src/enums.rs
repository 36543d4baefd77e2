//! Enumeration types for the Generations simulation.

use serde::{Deserialize, Serialize};

/// The decision a critter makes when paired with another critter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Share with the opponent.
    Cooperate,
    /// Withhold from the opponent.
    Defect,
}

impl Action {
    /// Whether this action is [`Action::Cooperate`].
    pub const fn is_cooperate(self) -> bool {
        matches!(self, Self::Cooperate)
    }

    /// Whether this action is [`Action::Defect`].
    pub const fn is_defect(self) -> bool {
        matches!(self, Self::Defect)
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cooperate => write!(f, "cooperate"),
            Self::Defect => write!(f, "defect"),
        }
    }
}

/// Lifecycle events a critter announces to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The critter's food balance fell to zero or below.
    Dying,
    /// The critter produced an offspring.
    Reproducing,
}

impl EventKind {
    /// Stable event name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dying => "dying",
            Self::Reproducing => "reproducing",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
