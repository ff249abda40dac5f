//! Trip Crew
//!
//! Wires backends, tools, agents and tasks into one planning run:
//!
//! ```text
//!   city_selection ──context──► local_guide ──context──► itinerary
//!   (City Selection Expert)     (Local Expert)           (Amazing Travel Concierge)
//! ```
//!
//! A `TripCrew` is reusable; every [`TripCrew::run`] builds fresh agents,
//! tasks and a fresh [`Crew`], so no state is shared between runs.

use std::sync::Arc;

use agent_core::{Crew, CrewOutput, GenerationOptions, LlmProvider, Summarizer, Tool};

use crate::agents::TripAgents;
use crate::backend::{BrowserlessFetcher, PageFetcher, SearchClient, SerperClient};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::request::TripRequest;
use crate::svckit::{CalculatorTool, HtmlExtractor, ScrapeTool, SearchTool};
use crate::tasks::TripTasks;

pub struct TripCrew {
    config: PlannerConfig,
    provider: Arc<dyn LlmProvider>,
    search: Arc<dyn Tool>,
    scrape: Arc<dyn Tool>,
    calculator: Arc<dyn Tool>,
}

impl std::fmt::Debug for TripCrew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripCrew")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TripCrew {
    /// Crew backed by the Serper and Browserless services in `config`
    pub fn new(config: PlannerConfig, provider: Arc<dyn LlmProvider>) -> Result<Self> {
        config.validate()?;
        let search = Arc::new(SerperClient::from_config(&config)?);
        let fetcher = Arc::new(BrowserlessFetcher::from_config(&config)?);
        Self::with_backends(config, provider, search, fetcher)
    }

    /// Crew over caller-supplied search and fetch backends
    pub fn with_backends(
        config: PlannerConfig,
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        config.validate()?;

        let extractor = HtmlExtractor::new()
            .map_err(|e| PlannerError::Config(format!("HTML extractor: {}", e)))?;
        let summarizer = Summarizer::new(provider.clone(), Self::generation(&config))
            .with_chunk_size(config.chunk_size)
            .with_concurrency(config.summary_concurrency);

        tracing::debug!(search = search.name(), fetcher = fetcher.name(), "Trip crew ready");

        Ok(Self {
            search: Arc::new(SearchTool::new(search, config.search_results)),
            scrape: Arc::new(ScrapeTool::new(fetcher, summarizer, Arc::new(extractor))),
            calculator: Arc::new(CalculatorTool::new()),
            config,
            provider,
        })
    }

    fn generation(config: &PlannerConfig) -> GenerationOptions {
        GenerationOptions::for_model(&config.model)
    }

    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Agents and tasks for one request, not yet started
    pub fn build(&self, request: &TripRequest) -> Result<Crew> {
        let date_range = request.date_range();
        let agents = TripAgents::new(
            self.provider.clone(),
            Self::generation(&self.config),
            self.config.max_iterations,
            self.search.clone(),
            self.scrape.clone(),
            self.calculator.clone(),
        );
        let tasks = TripTasks::new();

        let city_selector = agents.city_selection_agent()?;
        let local_expert = agents.local_expert()?;
        let concierge = agents.travel_concierge()?;

        let identify = tasks.identify_task(
            city_selector.clone(),
            &request.origin,
            &request.destination,
            &request.interests,
            &date_range,
        );
        let gather = tasks
            .gather_task(local_expert.clone(), &request.interests, &date_range)
            .with_context(&[&identify]);
        let plan = tasks
            .plan_task(concierge.clone(), &request.interests, &date_range)
            .with_context(&[&gather]);

        Ok(Crew::new(
            vec![city_selector, local_expert, concierge],
            vec![identify, gather, plan],
        )?)
    }

    /// Validate the request and run the three tasks to an itinerary
    pub async fn run(&self, request: &TripRequest) -> Result<CrewOutput> {
        request.validate()?;

        tracing::info!(
            origin = %request.origin,
            destination = %request.destination,
            dates = %request.date_range(),
            nights = request.nights(),
            "Planning trip"
        );

        let mut crew = self.build(request)?;
        let output = crew.kickoff().await?;

        tracing::info!(final_task = %output.final_task, chars = output.raw.len(), "Trip planned");
        Ok(output)
    }
}
