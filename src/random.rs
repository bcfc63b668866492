//! Pluggable randomness for the simulation.
//!
//! Every `rand::Rng` is a `RandomSource`, so callers normally pass a seeded
//! `ChaCha8Rng` or `thread_rng()`. Tests can plug in scripted sources to pin
//! down exact rewards and choices.

use crate::error::SimResult;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Source of the three random draws the simulation needs.
pub trait RandomSource {
    /// Sample from a normal distribution with the given mean and standard deviation.
    fn sample_normal(&mut self, mean: f64, std_dev: f64) -> SimResult<f64>;

    /// Returns true with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn sample_normal(&mut self, mean: f64, std_dev: f64) -> SimResult<f64> {
        let normal = Normal::new(mean, std_dev)?;
        Ok(normal.sample(self))
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.gen::<f64>() < probability
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}
