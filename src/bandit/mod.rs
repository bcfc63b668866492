//! Non-stationary k-armed bandit: levers, epsilon-greedy selection,
//! estimate updates, and the simulation loop.

pub mod estimate;
pub mod logic;
pub mod selection;
pub mod types;

pub use estimate::EstimateRule;
pub use logic::{run, BanditConfig, BanditSimulation};
pub use selection::{Selection, SelectionPolicy};
pub use types::{Lever, LeverId, RunPhase, RunSummary, SimulationState, StepOutcome};
