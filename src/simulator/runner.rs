//! Runs each selected estimate rule once against the same seed.
//!
//! Every rule gets its own simulation and its own `ChaCha8Rng` seeded
//! identically; only the returned summaries are combined.

use super::config::SimConfig;
use super::report::{RuleRun, SimReport};
use crate::bandit::{self, EstimateRule};
use crate::constants::{ITERATION_COUNT, STEP_SIZE_PARAMETER};
use crate::error::SimResult;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Run the configured comparison and return a report.
pub fn run_simulation(config: &SimConfig) -> SimResult<SimReport> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut runs = Vec::with_capacity(config.rules.flags().len());

    for &use_incremental in config.rules.flags() {
        let rule = EstimateRule::from_flag(use_incremental, STEP_SIZE_PARAMETER);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let summary = bandit::run(use_incremental, &mut rng)?;

        info!(
            seed,
            rule = rule.label(),
            times_optimal = summary.times_optimal_lever_chosen,
            average_reward = summary.average_reward,
            "Run finished"
        );

        runs.push(RuleRun { rule, summary });
    }

    Ok(SimReport {
        seed,
        iteration_count: ITERATION_COUNT,
        runs,
    })
}
