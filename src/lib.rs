//! bandit-sim - Non-stationary k-armed bandit simulation
//!
//! An epsilon-greedy agent chooses among drifting levers and tracks its
//! estimates with either the incremental sample average or a constant
//! step size.

pub mod bandit;
pub mod build_info;
pub mod constants;
pub mod error;
pub mod random;
pub mod simulator;

pub use bandit::{run, BanditConfig, BanditSimulation, RunSummary};
pub use error::{SimError, SimResult};
pub use random::RandomSource;
