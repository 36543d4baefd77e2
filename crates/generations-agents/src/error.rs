//! Error types for the generations-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.

/// Errors that can occur during critter and strategy operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A weighted random strategy was configured with a non-positive weight.
    #[error("invalid cooperation weight {weight}: must be greater than zero")]
    InvalidCooperationWeight {
        /// The rejected weight, rendered as text.
        weight: String,
    },

    /// An arithmetic overflow occurred during a food or counter computation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A mutant offspring was requested but the mutation catalog is empty.
    #[error("mutation catalog is empty")]
    EmptyMutationCatalog,
}
