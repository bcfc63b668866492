//! Epsilon-greedy action selection.

use super::types::{Lever, LeverId};
use crate::error::{SimError, SimResult};
use crate::random::RandomSource;

/// A chosen lever and the branch that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub lever: LeverId,
    pub explored: bool,
}

/// Epsilon-greedy policy over a lever arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub exploration_probability: f64,
    pub default_estimate: f64,
}

impl SelectionPolicy {
    pub fn new(exploration_probability: f64, default_estimate: f64) -> Self {
        Self {
            exploration_probability,
            default_estimate,
        }
    }

    /// Explores with probability epsilon, otherwise exploits.
    ///
    /// Exploration draws from every lever, the current best included.
    pub fn choose(&self, levers: &[Lever], rng: &mut impl RandomSource) -> SimResult<Selection> {
        if levers.is_empty() {
            return Err(SimError::NoLevers);
        }
        if rng.chance(self.exploration_probability) {
            Ok(Selection {
                lever: choose_randomly(levers, rng)?,
                explored: true,
            })
        } else {
            Ok(Selection {
                lever: self.choose_greedily(levers, rng)?,
                explored: false,
            })
        }
    }

    /// Uniform pick among the levers tied for the highest effective estimate.
    pub fn choose_greedily(
        &self,
        levers: &[Lever],
        rng: &mut impl RandomSource,
    ) -> SimResult<LeverId> {
        let best = self.highest_estimate_levers(levers);
        if best.is_empty() {
            return Err(SimError::NoLevers);
        }
        Ok(best[rng.pick_index(best.len())])
    }

    /// All levers whose effective estimate equals the maximum, in arena order.
    pub fn highest_estimate_levers(&self, levers: &[Lever]) -> Vec<LeverId> {
        let mut highest = f64::NEG_INFINITY;
        let mut tied = Vec::new();
        for (idx, lever) in levers.iter().enumerate() {
            let estimate = lever.effective_estimate(self.default_estimate);
            if estimate > highest {
                highest = estimate;
                tied.clear();
                tied.push(LeverId(idx));
            } else if estimate == highest {
                tied.push(LeverId(idx));
            }
        }
        tied
    }
}

/// Uniform pick over all levers.
pub fn choose_randomly(levers: &[Lever], rng: &mut impl RandomSource) -> SimResult<LeverId> {
    if levers.is_empty() {
        return Err(SimError::NoLevers);
    }
    Ok(LeverId(rng.pick_index(levers.len())))
}
