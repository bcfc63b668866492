//! Comparison report generation.

use crate::bandit::{EstimateRule, RunSummary};
use crate::error::SimResult;
use serde::{Deserialize, Serialize};

/// Result of running one estimate rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRun {
    pub rule: EstimateRule,
    pub summary: RunSummary,
}

/// Summaries of every rule run against one seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub seed: u64,
    pub iteration_count: u64,
    pub runs: Vec<RuleRun>,
}

impl SimReport {
    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  K-ARMED BANDIT REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Seed: {}   Iterations: {}\n\n",
            self.seed, self.iteration_count
        ));

        report.push_str("── ESTIMATE RULES ───────────────────────────────────────────────\n");
        report.push_str("  Rule            Optimal Picks   Optimal %   Avg Reward\n");
        report.push_str("  ────            ─────────────   ─────────   ──────────\n");
        for run in &self.runs {
            let pct = run.summary.optimal_choice_rate(self.iteration_count) * 100.0;
            report.push_str(&format!(
                "  {:<14}  {:>13}   {:>8.1}%   {:>10.4}\n",
                rule_name(&run.rule),
                run.summary.times_optimal_lever_chosen,
                pct,
                run.summary.average_reward
            ));
        }

        if let Some(best) = self.best_run() {
            report.push('\n');
            report.push_str(&format!(
                "  Highest average reward: {}\n",
                rule_name(&best.rule)
            ));
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The run with the highest average reward.
    pub fn best_run(&self) -> Option<&RuleRun> {
        self.runs.iter().max_by(|a, b| {
            a.summary
                .average_reward
                .total_cmp(&b.summary.average_reward)
        })
    }
}

fn rule_name(rule: &EstimateRule) -> String {
    match rule {
        EstimateRule::Incremental => rule.label().to_string(),
        EstimateRule::StepSize { step_size } => format!("{} {}", rule.label(), step_size),
    }
}
