//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run so that
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: generations_core::ConfigError,
    },

    /// Seeding or running the world failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: generations_core::WorldError,
    },

    /// The run summary could not be serialized.
    #[error("summary serialization failed: {source}")]
    Summary {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
