//! Observer seam of a run.
//!
//! A [`SimulationObserver`] is notified at the lifecycle points of a run.
//! Every hook defaults to a no-op, so an observer implements only the
//! points it cares about. Observers are called in registration order and a
//! failing observer aborts the run.

use generations_types::Interaction;

use crate::environment::Environment;

/// Error returned by an observer hook.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The observer could not process a notification.
    #[error("observer {observer} failed: {message}")]
    Failed {
        /// Name of the failing observer.
        observer: String,
        /// Description of the failure.
        message: String,
    },
}

/// Receives notifications while a world runs.
pub trait SimulationObserver {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Called once after the initial population is seeded.
    fn on_environment_start(&mut self, _environment: &Environment) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Called when an iteration begins, before any interaction.
    fn on_iteration_start(&mut self, _environment: &Environment) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Called after each resolved interaction.
    fn on_interaction_end(
        &mut self,
        _environment: &Environment,
        _interaction: &Interaction,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Called after the last interaction of an iteration, before upkeep.
    fn on_iteration_end(&mut self, _environment: &Environment) -> Result<(), ObserverError> {
        Ok(())
    }

    /// Called once after the final iteration.
    fn on_environment_end(&mut self, _environment: &Environment) -> Result<(), ObserverError> {
        Ok(())
    }
}
