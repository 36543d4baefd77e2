//! Observer that logs the run through `tracing`.

use generations_core::{Environment, ObserverError, SimulationObserver};
use generations_types::RunId;
use tracing::{debug, info};

/// Logs environment start and end, and iteration ends.
///
/// Iterations on the reporting interval are logged at `info`, the rest at
/// `debug`.
pub struct TracingObserver {
    run_id: RunId,
    interval: u64,
}

impl TracingObserver {
    /// Create an observer for the given run.
    pub const fn new(run_id: RunId, interval: u64) -> Self {
        Self { run_id, interval }
    }

    fn on_interval(&self, iteration: u64) -> bool {
        iteration.checked_rem(self.interval) == Some(0)
    }
}

impl SimulationObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    fn on_environment_start(&mut self, env: &Environment) -> Result<(), ObserverError> {
        info!(
            run_id = %self.run_id,
            population = env.len(),
            strategies = env.strategy_counts().len(),
            "Environment started"
        );
        Ok(())
    }

    fn on_iteration_end(&mut self, env: &Environment) -> Result<(), ObserverError> {
        let iteration = env.iteration();
        if self.on_interval(iteration) {
            info!(
                run_id = %self.run_id,
                iteration,
                population = env.len(),
                "Iteration finished"
            );
        } else {
            debug!(iteration, population = env.len(), "Iteration finished");
        }
        Ok(())
    }

    fn on_environment_end(&mut self, env: &Environment) -> Result<(), ObserverError> {
        info!(
            run_id = %self.run_id,
            iteration = env.iteration(),
            population = env.len(),
            "Environment ended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_detection() {
        let observer = TracingObserver::new(RunId::new(), 5);
        assert!(observer.on_interval(5));
        assert!(observer.on_interval(10));
        assert!(!observer.on_interval(7));

        let never = TracingObserver::new(RunId::new(), 0);
        assert!(!never.on_interval(5));
    }
}
