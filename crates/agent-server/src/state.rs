//! Application State

use std::sync::Arc;

use agent_core::LlmProvider;
use trip_planner::{PlannerConfig, Result, TripCrew};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PlannerConfig>,

    /// Model client (Gemini by default)
    pub provider: Arc<dyn LlmProvider>,

    /// Planning crew (None while API keys are missing)
    pub planner: Option<Arc<TripCrew>>,
}

impl AppState {
    /// Build the planner when every credential is present
    pub fn new(config: PlannerConfig, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        let planner = if config.missing_credentials().is_empty() {
            Some(Arc::new(TripCrew::new(config.clone(), provider.clone())?))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            provider,
            planner,
        })
    }

    /// State around an already built planner
    #[cfg(test)]
    pub fn with_planner(planner: TripCrew) -> Self {
        Self {
            config: Arc::new(planner.config().clone()),
            provider: planner.provider().clone(),
            planner: Some(Arc::new(planner)),
        }
    }
}
