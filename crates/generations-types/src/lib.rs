//! Shared type definitions for the Generations simulation.
//!
//! This crate holds the vocabulary every other crate in the workspace
//! speaks: the two-valued [`Action`], the serializable [`StrategySpec`]
//! used by configuration and mutation catalogs, lifecycle event kinds,
//! the [`Interaction`] record handed to observers, and the [`RunId`]
//! attached to every run.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier for simulation runs
//! - [`enums`] -- [`Action`] and [`EventKind`]
//! - [`strategy_spec`] -- Strategy configuration and short names
//! - [`interaction`] -- The ephemeral per-pair interaction record

pub mod enums;
pub mod ids;
pub mod interaction;
pub mod strategy_spec;

// Re-export all public types at crate root for convenience.
pub use enums::{Action, EventKind};
pub use ids::RunId;
pub use interaction::Interaction;
pub use strategy_spec::{StrategySpec, default_cooperation_weight};
