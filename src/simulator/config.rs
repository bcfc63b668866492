//! Simulation driver configuration.

use clap::ValueEnum;

/// Which estimate-update rules to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleSelection {
    Incremental,
    StepSize,
    Both,
}

impl RuleSelection {
    /// The `use_incremental_estimate_calculation` flags to run, in report order.
    pub fn flags(self) -> &'static [bool] {
        match self {
            Self::Incremental => &[true],
            Self::StepSize => &[false],
            Self::Both => &[true, false],
        }
    }
}

/// Configuration for one driver invocation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Random seed shared by every rule (None = drawn from entropy)
    pub seed: Option<u64>,

    /// Estimate rules to compare
    pub rules: RuleSelection,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            rules: RuleSelection::Both,
        }
    }
}

impl SimConfig {
    /// Both rules against a fixed seed.
    pub fn seeded_comparison(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
