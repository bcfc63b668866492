// Lever setup
pub const LEVER_COUNT: usize = 10;
pub const INITIAL_TRUE_VALUE_MEAN: f64 = 0.0;
pub const INITIAL_TRUE_VALUE_STD_DEV: f64 = 1.0;

// Reward generation
pub const REWARD_STD_DEV: f64 = 1.0;

// Action selection
pub const DEFAULT_ESTIMATE: f64 = 0.0;
pub const EXPLORATION_PROBABILITY: f64 = 0.1;

// Non-stationary drift
pub const LEVERS_ARE_WALKING: bool = true;
pub const WALK_STD_DEV: f64 = 0.01;

// Run length
pub const ITERATION_COUNT: u64 = 10_000;

// Constant step-size (recency-weighted) estimate update
pub const STEP_SIZE_PARAMETER: f64 = 0.1;
