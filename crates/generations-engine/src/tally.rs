//! Per-strategy population tally.
//!
//! [`StrategyTally`] snapshots the live count and total food of every
//! strategy at iteration 1 and on every reporting interval, and names the
//! winning strategies when the run ends.

use std::collections::BTreeMap;

use generations_core::{Environment, ObserverError, SimulationObserver};
use tracing::info;

/// Counts and food per strategy at the end of one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySnapshot {
    /// Iteration the snapshot was taken at.
    pub iteration: u64,
    /// Live critters per strategy short name.
    pub counts: BTreeMap<String, u32>,
    /// Total food per strategy short name.
    pub food: BTreeMap<String, i64>,
}

/// Observer collecting [`StrategySnapshot`]s.
///
/// At the end of the run it logs each strategy's peak over the snapshots
/// and the winning strategies.
#[derive(Debug)]
pub struct StrategyTally {
    interval: u64,
    snapshots: Vec<StrategySnapshot>,
}

impl StrategyTally {
    /// Snapshot at iteration 1 and every `interval` iterations.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            snapshots: Vec::new(),
        }
    }

    fn due(&self, iteration: u64) -> bool {
        iteration == 1 || iteration.checked_rem(self.interval) == Some(0)
    }

    /// Highest count each strategy reached, with the first snapshot
    /// iteration it was reached at.
    fn peaks(&self) -> BTreeMap<&str, (u64, u32)> {
        let mut peaks: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
        for snapshot in &self.snapshots {
            for (strategy, &count) in &snapshot.counts {
                let peak = peaks
                    .entry(strategy.as_str())
                    .or_insert((snapshot.iteration, count));
                if count > peak.1 {
                    *peak = (snapshot.iteration, count);
                }
            }
        }
        peaks
    }
}

/// Strategies sharing the highest live count, with that count.
///
/// Empty when the population is extinct.
fn winners(counts: &BTreeMap<String, u32>) -> (Vec<String>, u32) {
    let best = counts.values().copied().max().unwrap_or_default();
    let names = counts
        .iter()
        .filter(|&(_, &count)| count == best && count > 0)
        .map(|(strategy, _)| strategy.clone())
        .collect();
    (names, best)
}

impl SimulationObserver for StrategyTally {
    fn name(&self) -> &str {
        "strategy_tally"
    }

    fn on_iteration_end(&mut self, env: &Environment) -> Result<(), ObserverError> {
        let iteration = env.iteration();
        if !self.due(iteration) {
            return Ok(());
        }

        let snapshot = StrategySnapshot {
            iteration,
            counts: env.strategy_counts().clone(),
            food: env.strategy_food_totals(),
        };
        for (strategy, count) in &snapshot.counts {
            let food = snapshot.food.get(strategy).copied().unwrap_or_default();
            info!(iteration, strategy, count, food, "Strategy tally");
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    fn on_environment_end(&mut self, env: &Environment) -> Result<(), ObserverError> {
        for (strategy, (peak_iteration, peak_count)) in self.peaks() {
            info!(strategy, peak_count, peak_iteration, "Strategy peak");
        }

        let (leaders, count) = winners(env.strategy_counts());
        if leaders.is_empty() {
            info!(iteration = env.iteration(), "Population extinct, no winner");
        } else {
            info!(
                iteration = env.iteration(),
                winners = ?leaders,
                count,
                "Winning strategies"
            );
        }
        Ok(())
    }
}
