//! Trip Agents
//!
//! The three personas of the planning crew. Each factory call builds a fresh
//! agent over the shared provider and tool instances.

use std::sync::Arc;

use agent_core::{Agent, GenerationOptions, LlmProvider, Tool};

use crate::error::Result;

pub struct TripAgents {
    provider: Arc<dyn LlmProvider>,
    generation: GenerationOptions,
    max_iterations: usize,
    search: Arc<dyn Tool>,
    scrape: Arc<dyn Tool>,
    calculator: Arc<dyn Tool>,
}

impl TripAgents {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        generation: GenerationOptions,
        max_iterations: usize,
        search: Arc<dyn Tool>,
        scrape: Arc<dyn Tool>,
        calculator: Arc<dyn Tool>,
    ) -> Self {
        Self {
            provider,
            generation,
            max_iterations,
            search,
            scrape,
            calculator,
        }
    }

    fn researcher(&self, role: &str, goal: &str, backstory: &str) -> agent_core::AgentBuilder {
        Agent::builder()
            .role(role)
            .goal(goal)
            .backstory(backstory)
            .allow_delegation(false)
            .provider(self.provider.clone())
            .generation(self.generation.clone())
            .max_iterations(self.max_iterations)
            .shared_tool(self.search.clone())
            .shared_tool(self.scrape.clone())
    }

    /// Picks the destination city
    pub fn city_selection_agent(&self) -> Result<Arc<Agent>> {
        let agent = self
            .researcher(
                "City Selection Expert",
                "Select the best city for a trip based on weather, season, and prices.",
                "An expert in analyzing travel data to pick ideal destinations.",
            )
            .build()?;
        Ok(Arc::new(agent))
    }

    /// Writes the city guide
    pub fn local_expert(&self) -> Result<Arc<Agent>> {
        let agent = self
            .researcher(
                "Local Expert",
                "Provide the best local insights for a given city.",
                "A knowledgeable local guide with extensive information about the city's attractions, \
                 customs, and hidden gems.",
            )
            .build()?;
        Ok(Arc::new(agent))
    }

    /// Turns the guide into a budgeted itinerary; the only agent that can calculate
    pub fn travel_concierge(&self) -> Result<Arc<Agent>> {
        let agent = self
            .researcher(
                "Amazing Travel Concierge",
                "Create a detailed, personalized travel itinerary with budget and packing suggestions.",
                "A specialist in travel planning with decades of experience creating memorable trips.",
            )
            .shared_tool(self.calculator.clone())
            .build()?;
        Ok(Arc::new(agent))
    }
}
