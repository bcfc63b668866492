//! Comparison driver for the bandit simulation.
//!
//! Runs each estimate rule once against a shared seed so their summaries
//! can be read side by side:
//! - Times the start-of-run optimal lever was picked
//! - Average reward over the run

mod config;
mod report;
mod runner;

pub use config::{RuleSelection, SimConfig};
pub use report::{RuleRun, SimReport};
pub use runner::run_simulation;
