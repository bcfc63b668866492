//! Bandit data types: levers, run state, and results.

use crate::error::SimResult;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

/// Stable handle to a lever inside a simulation's lever arena.
///
/// Compared by identity (position), never by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeverId(pub usize);

impl LeverId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One reward source with a latent true value and the agent's belief about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lever {
    pub true_value: f64,
    /// None until the first reward is observed.
    pub estimate: Option<f64>,
}

impl Lever {
    pub fn new(true_value: f64) -> Self {
        Self {
            true_value,
            estimate: None,
        }
    }

    /// Draws a fresh lever with its true value sampled from N(mean, std_dev).
    pub fn random(rng: &mut impl RandomSource, mean: f64, std_dev: f64) -> SimResult<Self> {
        Ok(Self::new(rng.sample_normal(mean, std_dev)?))
    }

    /// Estimate used for action selection. Does not touch the lever.
    pub fn effective_estimate(&self, default_estimate: f64) -> f64 {
        self.estimate.unwrap_or(default_estimate)
    }

    /// Samples a reward centred on the current true value.
    pub fn pull(&self, rng: &mut impl RandomSource, std_dev: f64) -> SimResult<f64> {
        rng.sample_normal(self.true_value, std_dev)
    }

    /// Applies one step of zero-mean Gaussian drift to the true value.
    pub fn take_random_walk(&mut self, rng: &mut impl RandomSource, std_dev: f64) -> SimResult<()> {
        self.true_value += rng.sample_normal(0.0, std_dev)?;
        Ok(())
    }
}

/// Running statistics for one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationState {
    pub average_reward: f64,
    pub times_optimal_lever_chosen: u64,
}

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Completed,
}

/// Summary returned at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub times_optimal_lever_chosen: u64,
    pub average_reward: f64,
}

impl RunSummary {
    /// Fraction of iterations that picked the start-of-run optimal lever.
    pub fn optimal_choice_rate(&self, iteration_count: u64) -> f64 {
        if iteration_count == 0 {
            return 0.0;
        }
        self.times_optimal_lever_chosen as f64 / iteration_count as f64
    }
}

impl From<SimulationState> for RunSummary {
    fn from(state: SimulationState) -> Self {
        Self {
            times_optimal_lever_chosen: state.times_optimal_lever_chosen,
            average_reward: state.average_reward,
        }
    }
}

/// What happened during a single iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub iteration: u64,
    pub lever: LeverId,
    /// True when the lever came from the random exploration branch.
    pub explored: bool,
    pub reward: f64,
    pub was_optimal: bool,
}
