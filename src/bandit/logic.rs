//! The bandit simulation loop.
//!
//! Each iteration runs a fixed pipeline:
//! 1. **Selection** - epsilon-greedy pick of a lever
//! 2. **Reward** - sample N(true value, 1) from that lever
//! 3. **Bookkeeping** - count picks of the start-of-run optimal lever
//! 4. **Estimate update** - first sample sets it, later ones blend per `EstimateRule`
//! 5. **Average reward** - unweighted running mean over all rewards
//! 6. **Drift** - every lever's true value takes a small random walk
//!
//! Steps 3-5 observe the reward and lever from steps 1-2 before drift
//! changes any true value.

use super::estimate::{new_average_incrementally, EstimateRule};
use super::selection::SelectionPolicy;
use super::types::{Lever, LeverId, RunPhase, RunSummary, SimulationState, StepOutcome};
use crate::constants::{
    DEFAULT_ESTIMATE, EXPLORATION_PROBABILITY, INITIAL_TRUE_VALUE_MEAN,
    INITIAL_TRUE_VALUE_STD_DEV, ITERATION_COUNT, LEVERS_ARE_WALKING, LEVER_COUNT, REWARD_STD_DEV,
    STEP_SIZE_PARAMETER, WALK_STD_DEV,
};
use crate::error::{SimError, SimResult};
use crate::random::RandomSource;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Configuration for a bandit run.
#[derive(Debug, Clone, PartialEq)]
pub struct BanditConfig {
    /// Number of levers created at start
    pub lever_count: usize,

    /// How estimates absorb new rewards
    pub estimate_rule: EstimateRule,

    /// Stand-in for unset estimates during selection
    pub default_estimate: f64,

    /// Chance of a uniform random pick instead of a greedy one
    pub exploration_probability: f64,

    /// Whether true values drift every iteration
    pub levers_are_walking: bool,

    pub iteration_count: u64,

    /// Standard deviation of a lever's reward around its true value
    pub reward_std_dev: f64,

    /// Standard deviation of one drift step
    pub walk_std_dev: f64,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

impl BanditConfig {
    /// The fixed configuration, with the estimate rule picked by the flag.
    pub fn new(use_incremental_estimate_calculation: bool) -> Self {
        Self {
            lever_count: LEVER_COUNT,
            estimate_rule: EstimateRule::from_flag(
                use_incremental_estimate_calculation,
                STEP_SIZE_PARAMETER,
            ),
            default_estimate: DEFAULT_ESTIMATE,
            exploration_probability: EXPLORATION_PROBABILITY,
            levers_are_walking: LEVERS_ARE_WALKING,
            iteration_count: ITERATION_COUNT,
            reward_std_dev: REWARD_STD_DEV,
            walk_std_dev: WALK_STD_DEV,
        }
    }

    /// Stationary levers, for checks that need fixed true values.
    pub fn stationary(use_incremental_estimate_calculation: bool) -> Self {
        Self {
            levers_are_walking: false,
            ..Self::new(use_incremental_estimate_calculation)
        }
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy::new(self.exploration_probability, self.default_estimate)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.lever_count == 0 {
            return Err(SimError::NoLevers);
        }
        if !(0.0..=1.0).contains(&self.exploration_probability) {
            return Err(SimError::InvalidConfig(format!(
                "exploration probability {} must be within [0, 1]",
                self.exploration_probability
            )));
        }
        if let EstimateRule::StepSize { step_size } = self.estimate_rule {
            if !(step_size > 0.0 && step_size <= 1.0) {
                return Err(SimError::InvalidConfig(format!(
                    "step size {} must be within (0, 1]",
                    step_size
                )));
            }
        }
        for (name, value) in [
            ("reward standard deviation", self.reward_std_dev),
            ("walk standard deviation", self.walk_std_dev),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} {} must be finite and non-negative",
                    name, value
                )));
            }
        }
        if !self.default_estimate.is_finite() {
            return Err(SimError::InvalidConfig(
                "default estimate must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owns the levers and running state of one run.
#[derive(Debug, Clone)]
pub struct BanditSimulation {
    config: BanditConfig,
    policy: SelectionPolicy,
    levers: Vec<Lever>,
    optimal_lever: LeverId,
    state: SimulationState,
    next_iteration: u64,
    phase: RunPhase,
}

impl BanditSimulation {
    /// Validates `config` and draws `lever_count` levers with N(0, 1) true values.
    pub fn new(config: BanditConfig, rng: &mut impl RandomSource) -> SimResult<Self> {
        config.validate()?;
        let levers = (0..config.lever_count)
            .map(|_| Lever::random(rng, INITIAL_TRUE_VALUE_MEAN, INITIAL_TRUE_VALUE_STD_DEV))
            .collect::<SimResult<Vec<_>>>()?;
        Self::with_levers(config, levers)
    }

    /// Builds a simulation over explicit levers. `config.lever_count` is overwritten.
    pub fn with_levers(mut config: BanditConfig, levers: Vec<Lever>) -> SimResult<Self> {
        config.lever_count = levers.len();
        config.validate()?;
        let optimal_lever = optimal_lever(&levers)?;
        debug!(
            levers = levers.len(),
            optimal = optimal_lever.index(),
            optimal_value = levers[optimal_lever.index()].true_value,
            rule = config.estimate_rule.label(),
            "Bandit simulation initialised"
        );
        Ok(Self {
            policy: config.selection_policy(),
            config,
            levers,
            optimal_lever,
            state: SimulationState::default(),
            next_iteration: 0,
            phase: RunPhase::NotStarted,
        })
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    pub fn levers(&self) -> &[Lever] {
        &self.levers
    }

    /// The lever with the highest true value at start. Fixed for the run.
    pub fn optimal_lever(&self) -> LeverId {
        self.optimal_lever
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn completed_iterations(&self) -> u64 {
        self.next_iteration
    }

    pub fn summary(&self) -> RunSummary {
        self.state.into()
    }

    /// Runs one iteration of the pipeline.
    pub fn step(&mut self, rng: &mut impl RandomSource) -> SimResult<StepOutcome> {
        if self.next_iteration >= self.config.iteration_count {
            self.phase = RunPhase::Completed;
            return Err(SimError::AlreadyCompleted);
        }
        self.phase = RunPhase::Running;
        let iteration = self.next_iteration;

        let selection = self.policy.choose(&self.levers, rng)?;
        let lever = &mut self.levers[selection.lever.index()];
        let reward = lever.pull(rng, self.config.reward_std_dev)?;

        let was_optimal = selection.lever == self.optimal_lever;
        if was_optimal {
            self.state.times_optimal_lever_chosen += 1;
        }

        lever.estimate = Some(
            self.config
                .estimate_rule
                .apply(lever.estimate, reward, iteration),
        );
        update_average_reward(&mut self.state, reward, iteration);

        if self.config.levers_are_walking {
            walk_levers(&mut self.levers, rng, self.config.walk_std_dev)?;
        }

        trace!(
            iteration,
            lever = selection.lever.index(),
            explored = selection.explored,
            reward,
            was_optimal,
            "Bandit step"
        );

        self.next_iteration += 1;
        if self.next_iteration >= self.config.iteration_count {
            self.phase = RunPhase::Completed;
        }

        Ok(StepOutcome {
            iteration,
            lever: selection.lever,
            explored: selection.explored,
            reward,
            was_optimal,
        })
    }

    /// Runs the remaining iterations and returns the summary.
    pub fn run(self, rng: &mut impl RandomSource) -> SimResult<RunSummary> {
        self.run_until(rng, &AtomicBool::new(false))
    }

    /// Like `run`, but stops between iterations once `cancel` is set.
    pub fn run_until(
        mut self,
        rng: &mut impl RandomSource,
        cancel: &AtomicBool,
    ) -> SimResult<RunSummary> {
        while self.next_iteration < self.config.iteration_count {
            if cancel.load(Ordering::Relaxed) {
                return Err(SimError::Cancelled {
                    completed_iterations: self.next_iteration,
                });
            }
            self.step(rng)?;
        }
        self.phase = RunPhase::Completed;
        debug!(
            times_optimal = self.state.times_optimal_lever_chosen,
            average_reward = self.state.average_reward,
            "Bandit simulation completed"
        );
        Ok(self.summary())
    }
}

/// Runs the fixed configuration once.
pub fn run(
    use_incremental_estimate_calculation: bool,
    rng: &mut impl RandomSource,
) -> SimResult<RunSummary> {
    BanditSimulation::new(BanditConfig::new(use_incremental_estimate_calculation), rng)?.run(rng)
}

/// First lever with the strictly highest true value.
pub fn optimal_lever(levers: &[Lever]) -> SimResult<LeverId> {
    let first = levers.first().ok_or(SimError::NoLevers)?;
    let mut best = LeverId(0);
    let mut best_value = first.true_value;
    for (idx, lever) in levers.iter().enumerate().skip(1) {
        if best_value < lever.true_value {
            best = LeverId(idx);
            best_value = lever.true_value;
        }
    }
    Ok(best)
}

/// Folds `reward` into the running average. Iteration 0 sets it directly.
pub fn update_average_reward(state: &mut SimulationState, reward: f64, iteration: u64) {
    state.average_reward = if iteration == 0 {
        reward
    } else {
        new_average_incrementally(state.average_reward, reward, iteration + 1)
    };
}

/// Drifts every lever, chosen or not.
pub fn walk_levers(
    levers: &mut [Lever],
    rng: &mut impl RandomSource,
    std_dev: f64,
) -> SimResult<()> {
    for lever in levers.iter_mut() {
        lever.take_random_walk(rng, std_dev)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::VecDeque;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    /// Replays fixed normal samples and index picks; never explores.
    struct ScriptedSource {
        normals: VecDeque<f64>,
        picks: VecDeque<usize>,
    }

    impl ScriptedSource {
        fn new(normals: &[f64], picks: &[usize]) -> Self {
            Self {
                normals: normals.iter().copied().collect(),
                picks: picks.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn sample_normal(&mut self, mean: f64, _std_dev: f64) -> SimResult<f64> {
            Ok(mean + self.normals.pop_front().unwrap_or(0.0))
        }

        fn chance(&mut self, _probability: f64) -> bool {
            false
        }

        fn pick_index(&mut self, len: usize) -> usize {
            self.picks.pop_front().unwrap_or(0) % len
        }
    }

    fn small_config(iterations: u64) -> BanditConfig {
        BanditConfig {
            iteration_count: iterations,
            levers_are_walking: false,
            ..BanditConfig::new(true)
        }
    }

    #[test]
    fn test_default_config_matches_constants() {
        let config = BanditConfig::new(true);
        assert_eq!(config.lever_count, 10);
        assert_eq!(config.estimate_rule, EstimateRule::Incremental);
        assert_eq!(config.default_estimate, 0.0);
        assert_eq!(config.exploration_probability, 0.1);
        assert!(config.levers_are_walking);
        assert_eq!(config.iteration_count, 10_000);
        assert_eq!(
            BanditConfig::new(false).estimate_rule,
            EstimateRule::StepSize { step_size: 0.1 }
        );
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut config = BanditConfig::new(false);
        config.lever_count = 0;
        assert!(matches!(config.validate(), Err(SimError::NoLevers)));

        let mut config = BanditConfig::new(false);
        config.exploration_probability = 1.5;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let mut config = BanditConfig::new(false);
        config.estimate_rule = EstimateRule::StepSize { step_size: 0.0 };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let mut config = BanditConfig::new(false);
        config.walk_std_dev = f64::NAN;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_with_levers_overwrites_lever_count() {
        let levers = vec![Lever::new(0.1), Lever::new(0.2), Lever::new(0.3)];
        let sim = BanditSimulation::with_levers(BanditConfig::new(true), levers).unwrap();
        assert_eq!(sim.config().lever_count, 3);
        assert_eq!(sim.config().estimate_rule, EstimateRule::Incremental);
        assert_eq!(sim.levers().len(), 3);
        assert_eq!(sim.optimal_lever(), LeverId(2));
    }

    #[test]
    fn test_zero_levers_fail_fast() {
        let result = BanditSimulation::with_levers(BanditConfig::new(true), Vec::new());
        assert!(matches!(result, Err(SimError::NoLevers)));
    }

    #[test]
    fn test_optimal_lever_ties_go_to_first() {
        let levers = vec![Lever::new(0.2), Lever::new(1.1), Lever::new(1.1), Lever::new(-3.0)];
        assert_eq!(optimal_lever(&levers).unwrap(), LeverId(1));
        assert!(matches!(optimal_lever(&[]), Err(SimError::NoLevers)));
    }

    #[test]
    fn test_first_step_sets_estimate_and_average_directly() {
        for use_incremental in [true, false] {
            let config = BanditConfig {
                levers_are_walking: false,
                ..BanditConfig::new(use_incremental)
            };
            let levers = vec![Lever::new(1.0), Lever::new(0.0)];
            let mut sim = BanditSimulation::with_levers(config, levers).unwrap();
            // pick lever 0 among the two tied at default, noise +0.5
            let mut rng = ScriptedSource::new(&[0.5], &[0]);
            let outcome = sim.step(&mut rng).unwrap();

            assert_eq!(outcome.iteration, 0);
            assert_eq!(outcome.lever, LeverId(0));
            assert_eq!(outcome.reward, 1.5);
            assert!(outcome.was_optimal);
            assert_eq!(sim.levers()[0].estimate, Some(1.5));
            assert_eq!(sim.levers()[1].estimate, None);
            assert_eq!(sim.state().average_reward, 1.5);
            assert_eq!(sim.state().times_optimal_lever_chosen, 1);
        }
    }

    #[test]
    fn test_incremental_rule_divides_by_global_iteration() {
        let levers = vec![Lever::new(0.0), Lever::new(0.0)];
        let mut sim = BanditSimulation::with_levers(small_config(3), levers).unwrap();
        // it0: tie -> lever 1, reward 2.0 => lever1 = 2.0
        // it1: lever 1 greedy (single best), reward 4.0 => 2 + (4-2)/2 = 3.0
        // it2: lever 1 greedy, reward -3.0 => 3 + (-3-3)/3 = 1.0
        let mut rng = ScriptedSource::new(&[2.0, 4.0, -3.0], &[1, 0, 0]);
        sim.step(&mut rng).unwrap();
        assert_eq!(sim.levers()[1].estimate, Some(2.0));
        sim.step(&mut rng).unwrap();
        assert_eq!(sim.levers()[1].estimate, Some(3.0));
        sim.step(&mut rng).unwrap();
        let estimate = sim.levers()[1].estimate.unwrap();
        assert!((estimate - 1.0).abs() < 1e-12);
        assert_eq!(sim.levers()[0].estimate, None);
        assert_eq!(sim.phase(), RunPhase::Completed);
    }

    #[test]
    fn test_step_size_rule_ignores_iteration() {
        let config = BanditConfig {
            iteration_count: 3,
            levers_are_walking: false,
            ..BanditConfig::new(false)
        };
        let mut sim = BanditSimulation::with_levers(config, vec![Lever::new(0.0)]).unwrap();
        let mut rng = ScriptedSource::new(&[1.0, 2.0, 2.0], &[]);
        sim.step(&mut rng).unwrap();
        sim.step(&mut rng).unwrap();
        let after_second = 1.0 + 0.1 * (2.0 - 1.0);
        assert_eq!(sim.levers()[0].estimate, Some(after_second));
        sim.step(&mut rng).unwrap();
        assert_eq!(
            sim.levers()[0].estimate,
            Some(after_second + 0.1 * (2.0 - after_second))
        );
    }

    #[test]
    fn test_average_reward_is_unweighted_running_mean() {
        let config = BanditConfig {
            iteration_count: 4,
            levers_are_walking: false,
            ..BanditConfig::new(false)
        };
        let mut sim = BanditSimulation::with_levers(config, vec![Lever::new(0.0)]).unwrap();
        let rewards = [1.0, 3.0, 5.0, 7.0];
        let mut rng = ScriptedSource::new(&rewards, &[]);

        let mut expected = 0.0;
        for (i, reward) in rewards.iter().enumerate() {
            sim.step(&mut rng).unwrap();
            expected = if i == 0 {
                *reward
            } else {
                new_average_incrementally(expected, *reward, i as u64 + 1)
            };
            assert_eq!(sim.state().average_reward, expected);
        }
        assert!((sim.state().average_reward - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_drift_happens_after_reward() {
        let config = BanditConfig {
            iteration_count: 1,
            levers_are_walking: true,
            ..BanditConfig::new(true)
        };
        let levers = vec![Lever::new(1.0), Lever::new(-1.0)];
        let mut sim = BanditSimulation::with_levers(config, levers).unwrap();
        // reward noise 0.0, then drift +0.25 and -0.5
        let mut rng = ScriptedSource::new(&[0.0, 0.25, -0.5], &[0]);
        let outcome = sim.step(&mut rng).unwrap();
        assert_eq!(outcome.reward, 1.0);
        assert_eq!(sim.levers()[0].true_value, 1.25);
        assert_eq!(sim.levers()[1].true_value, -1.5);
    }

    #[test]
    fn test_optimal_lever_fixed_after_drift() {
        let mut rng = create_test_rng();
        let sim = BanditSimulation::new(BanditConfig::new(false), &mut rng).unwrap();
        let optimal = sim.optimal_lever();
        assert_eq!(optimal, optimal_lever(sim.levers()).unwrap());

        let mut sim = sim;
        for _ in 0..2000 {
            sim.step(&mut rng).unwrap();
        }
        assert_eq!(sim.optimal_lever(), optimal);
    }

    #[test]
    fn test_step_after_completion_errors() {
        let mut sim = BanditSimulation::with_levers(small_config(1), vec![Lever::new(0.0)]).unwrap();
        assert_eq!(sim.phase(), RunPhase::NotStarted);
        let mut rng = create_test_rng();
        sim.step(&mut rng).unwrap();
        assert_eq!(sim.phase(), RunPhase::Completed);
        assert_eq!(sim.completed_iterations(), 1);
        assert!(matches!(sim.step(&mut rng), Err(SimError::AlreadyCompleted)));
    }

    #[test]
    fn test_run_until_cancelled() {
        let sim = BanditSimulation::with_levers(small_config(100), vec![Lever::new(0.0)]).unwrap();
        let cancel = AtomicBool::new(true);
        let mut rng = create_test_rng();
        let result = sim.run_until(&mut rng, &cancel);
        assert!(matches!(
            result,
            Err(SimError::Cancelled {
                completed_iterations: 0
            })
        ));
    }

    #[test]
    fn test_single_stationary_lever_always_optimal() {
        for use_incremental in [true, false] {
            let config = BanditConfig::stationary(use_incremental);
            let sim = BanditSimulation::with_levers(config, vec![Lever::new(0.7)]).unwrap();
            let mut rng = create_test_rng();
            let summary = sim.run(&mut rng).unwrap();
            assert_eq!(summary.times_optimal_lever_chosen, ITERATION_COUNT);
            assert!((summary.average_reward - 0.7).abs() < 0.05);
        }
    }

    #[test]
    fn test_run_summary_in_bounds() {
        let mut rng = create_test_rng();
        for use_incremental in [true, false] {
            let summary = run(use_incremental, &mut rng).unwrap();
            assert!(summary.times_optimal_lever_chosen <= ITERATION_COUNT);
            assert!(summary.average_reward.is_finite());
        }
    }
}
