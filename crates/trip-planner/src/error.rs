//! Error Types for the Trip Planner

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Missing API keys: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{service} returned status {code}: {body}")]
    Status {
        service: &'static str,
        code: u16,
        body: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Pipeline(#[from] AgentError),
}

impl PlannerError {
    /// Rejected before any task ran
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            PlannerError::MissingCredentials(_) | PlannerError::InvalidRequest(_)
        )
    }
}
