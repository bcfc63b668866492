//! K-armed bandit simulator CLI.
//!
//! Runs the epsilon-greedy bandit once per estimate rule against a shared
//! seed and prints the summaries.
//!
//! Examples:
//!   cargo run --bin simulate                        # Both rules, random seed
//!   cargo run --bin simulate -- --seed 42           # Reproducible run
//!   cargo run --bin simulate -- --rule step-size    # One rule only
//!   cargo run --bin simulate -- --json              # JSON on stdout

use bandit_sim::build_info;
use bandit_sim::simulator::{run_simulation, RuleSelection, SimConfig};
use bandit_sim::SimResult;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Non-stationary k-armed bandit simulator")]
#[command(version)]
struct Cli {
    /// Random seed shared by every rule (default: drawn from entropy)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Estimate-update rules to run
    #[arg(short, long, value_enum, default_value_t = RuleSelection::Both)]
    rule: RuleSelection,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> SimResult<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "bandit_sim=debug,simulate=debug"
    } else {
        "bandit_sim=info,simulate=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig {
        seed: cli.seed,
        rules: cli.rule,
    };

    info!(
        build = %build_info::version_line(),
        seed = ?config.seed,
        rules = ?config.rules,
        "Starting bandit simulation"
    );

    let report = run_simulation(&config)?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.to_text());
    }

    Ok(())
}
