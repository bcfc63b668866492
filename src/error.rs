use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: simulation needs at least one lever")]
    NoLevers,

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Random source error: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("Simulation already completed")]
    AlreadyCompleted,

    #[error("Simulation cancelled after {completed_iterations} iterations")]
    Cancelled { completed_iterations: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
