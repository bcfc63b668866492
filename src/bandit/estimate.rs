//! Running-estimate update rules.
//!
//! Both rules follow Sutton & Barto (2nd ed., p. 31): the incremental
//! sample average and the constant step-size (exponential recency-weighted)
//! average.

use serde::{Deserialize, Serialize};

/// `old + (1/n) * (next - old)`
pub fn new_average_incrementally(old_average: f64, next_value: f64, number_of_values: u64) -> f64 {
    old_average + (1.0 / number_of_values as f64) * (next_value - old_average)
}

/// `old + step_size * (next - old)`
pub fn new_average_with_step_size(old_average: f64, next_value: f64, step_size: f64) -> f64 {
    old_average + step_size * (next_value - old_average)
}

/// How a lever's estimate absorbs a new reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateRule {
    /// Sample average with weight `1/(i+1)`.
    ///
    /// `i` is the *global* iteration index, not the lever's own visit count.
    /// This diverges from the textbook sample average and is kept on purpose.
    Incremental,
    /// Constant step size, suited to drifting levers.
    StepSize { step_size: f64 },
}

impl EstimateRule {
    /// Picks the rule from the `use_incremental_estimate_calculation` flag.
    pub fn from_flag(use_incremental: bool, step_size: f64) -> Self {
        if use_incremental {
            Self::Incremental
        } else {
            Self::StepSize { step_size }
        }
    }

    pub fn is_incremental(&self) -> bool {
        matches!(self, Self::Incremental)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::StepSize { .. } => "step-size",
        }
    }

    /// New estimate after observing `reward` on global iteration `iteration` (0-indexed).
    ///
    /// An unset estimate is replaced by the reward outright.
    pub fn apply(&self, estimate: Option<f64>, reward: f64, iteration: u64) -> f64 {
        let Some(current) = estimate else {
            return reward;
        };
        match self {
            Self::Incremental => new_average_incrementally(current, reward, iteration + 1),
            Self::StepSize { step_size } => new_average_with_step_size(current, reward, *step_size),
        }
    }
}
