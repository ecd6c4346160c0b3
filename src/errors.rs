/// Error types for the simulator.
/// Parameter problems are caught before any random draw is made.
/// Non-finite payoffs are NOT errors: they flow into the estimate so the
/// caller can see them.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: &'static str, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("cancelled after {completed} of {requested} trials")]
    Cancelled { completed: usize, requested: usize },

    #[error("worker error: {0}")]
    Worker(String),

    #[error("report error: {0}")]
    Report(String),
}

impl SimError {
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Report(e.to_string())
    }
}

impl From<tokio::task::JoinError> for SimError {
    fn from(e: tokio::task::JoinError) -> Self {
        SimError::Worker(e.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
