//! Critter state, strategies, and lifecycle for the Generations simulation.
//!
//! This crate contains the logic layer for agents -- everything that operates
//! on a single critter without touching the population. It sits between
//! `generations-types` (which defines the shared vocabulary) and
//! `generations-core` (which owns the population and drives iterations).
//!
//! # Modules
//!
//! - [`config`] -- Reproduction and mutation parameters ([`LifecycleConfig`])
//! - [`critter`] -- The agent itself ([`Critter`]) and its reproduction context
//! - [`error`] -- Error types for all agent operations ([`AgentError`])
//! - [`events`] -- Typed per-critter event bus ([`EventBus`])
//! - [`naming`] -- Sequential default identities ([`NameGenerator`])
//! - [`strategy`] -- Decision policies and their per-opponent memory ([`Strategy`])

pub mod config;
pub mod critter;
pub mod error;
pub mod events;
pub mod naming;
pub mod strategy;

// Re-export primary types at crate root for convenience.
pub use config::LifecycleConfig;
pub use critter::{Critter, ReproductionContext};
pub use error::AgentError;
pub use events::{EventBus, EventFilter, EventPayload, ListenerHandle};
pub use naming::NameGenerator;
pub use strategy::Strategy;
