//! End-to-end planning run against local stand-ins for every external service.
//!
//! Serper and Browserless are served by a local axum app that rejects every
//! request, so each tool call returns error text; the crew must still produce
//! an itinerary from the concierge.

use std::sync::{Arc, Mutex};

use agent_core::{
    Completion, GenerationOptions, LlmProvider, Message, ProviderInfo, Result as CoreResult, Role,
};
use async_trait::async_trait;
use axum::{Router, http::StatusCode, routing::post};
use chrono::NaiveDate;
use trip_planner::{PlannerConfig, PlannerError, TripCrew, TripRequest};

/// Plays each persona: one tool call, then a final answer naming the agent
#[derive(Default)]
struct PersonaProvider {
    calls: Mutex<Vec<String>>,
    tool_outputs: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl PersonaProvider {
    fn persona(messages: &[Message]) -> &'static str {
        let system = messages.first().map(|m| m.content.as_str()).unwrap_or_default();
        if system.starts_with("You are City Selection Expert") {
            "city"
        } else if system.starts_with("You are Local Expert") {
            "guide"
        } else {
            "concierge"
        }
    }
}

#[async_trait]
impl LlmProvider for PersonaProvider {
    async fn info(&self) -> CoreResult<ProviderInfo> {
        Ok(ProviderInfo {
            name: "persona".into(),
            default_model: "test".into(),
            endpoint: "memory".into(),
        })
    }

    async fn health_check(&self) -> CoreResult<bool> {
        Ok(true)
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> CoreResult<Completion> {
        let persona = Self::persona(messages);
        self.calls.lock().unwrap().push(persona.to_string());

        let tool_message = messages.iter().rev().find(|m| m.role == Role::Tool);
        let reply = match tool_message {
            None => {
                if let Some(prompt) = messages.iter().find(|m| m.role == Role::User) {
                    self.prompts.lock().unwrap().push(prompt.content.clone());
                }
                match persona {
                    "city" => "```tool\n{\"tool\": \"search_internet\", \"arguments\": {\"query\": \"Krabi weather September\"}}\n```".to_string(),
                    "guide" => "```tool\n{\"tool\": \"scrape_website\", \"arguments\": {\"website_url\": \"https://example.com/krabi\"}}\n```".to_string(),
                    _ => "```tool\n{\"tool\": \"make_calculation\", \"arguments\": {\"operation\": \"(1200 + 800) / 0\"}}\n```".to_string(),
                }
            }
            Some(tool) => {
                self.tool_outputs.lock().unwrap().push(tool.content.clone());
                match persona {
                    "city" => "Final Answer: Krabi is the pick: warm sea, monsoon showers, flights from 9,000 INR.".to_string(),
                    "guide" => "Final Answer: Krabi guide: Railay, Tiger Cave Temple, night markets.".to_string(),
                    _ => "Final Answer: # Krabi Itinerary\n\n## Day 1\nArrive and visit Ao Nang night market.".to_string(),
                }
            }
        };

        Ok(Completion::text(reply, &options.model))
    }
}

async fn rejecting_services() -> String {
    let router = Router::new()
        .route("/search", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "search down") }))
        .route("/content", post(|| async { (StatusCode::BAD_GATEWAY, "browser down") }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{}", addr)
}

fn krabi(start: u32, end: u32) -> TripRequest {
    TripRequest {
        origin: "Bangalore, India".into(),
        destination: "Krabi, Thailand".into(),
        start_date: NaiveDate::from_ymd_opt(2025, 9, start).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 9, end).unwrap(),
        interests: "2 adults who love swimming, hiking, local food, and water sports.".into(),
    }
}

async fn config() -> PlannerConfig {
    let base = rejecting_services().await;
    PlannerConfig {
        serper_url: format!("{}/search", base),
        browserless_url: base,
        http_timeout_secs: 5,
        ..PlannerConfig::with_credentials("gemini", "serper", "browserless")
    }
}

#[tokio::test]
async fn test_bangalore_to_krabi_runs_three_tasks_in_order() {
    let provider = Arc::new(PersonaProvider::default());
    let crew = TripCrew::new(config().await, provider.clone()).unwrap();

    let output = crew.run(&krabi(10, 20)).await.unwrap();

    let names: Vec<&str> = output.tasks_output.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["city_selection", "local_guide", "itinerary"]);
    assert_eq!(output.final_task, "itinerary");
    assert!(output.raw.starts_with("# Krabi Itinerary"));
    assert!(output.tasks_output.iter().all(|t| t.tool_calls == 1 && !t.exhausted));

    let calls = provider.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["city", "city", "guide", "guide", "concierge", "concierge"]);

    let tool_outputs = provider.tool_outputs.lock().unwrap().clone();
    assert!(tool_outputs[0].contains("Error: Search API request failed. Status: 500"));
    assert!(tool_outputs[1].contains("Error fetching website. Status: 502 browser down"));
    assert!(tool_outputs[2].contains("Error performing calculation: division by zero"));

    let prompts = provider.prompts.lock().unwrap().clone();
    assert!(prompts[0].contains("From: Bangalore, India, To: Krabi, Thailand"));
    assert!(prompts[0].contains("September 10, 2025 to September 20, 2025"));
    assert!(prompts[1].contains("Krabi is the pick"));
    assert!(prompts[2].contains("Krabi guide: Railay"));
    assert!(!prompts[2].contains("Krabi is the pick"));
}

#[tokio::test]
async fn test_equal_dates_rejected_before_any_model_call() {
    let provider = Arc::new(PersonaProvider::default());
    let crew = TripCrew::new(config().await, provider.clone()).unwrap();

    let err = crew.run(&krabi(15, 15)).await.unwrap_err();
    assert!(matches!(err, PlannerError::InvalidRequest(_)));
    assert!(provider.calls.lock().unwrap().is_empty());
}
