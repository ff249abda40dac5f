//! Internet Search Tool
//!
//! Runs a web search and hands the top organic results to the agent.

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
    Result as CoreResult,
};

use crate::backend::{SearchClient, SearchHit};
use crate::error::PlannerError;

const TOOL_NAME: &str = "search_internet";

/// Tool for searching the internet about a topic
pub struct SearchTool {
    client: Arc<dyn SearchClient>,
    max_results: usize,
}

impl SearchTool {
    pub fn new(client: Arc<dyn SearchClient>, max_results: usize) -> Self {
        Self {
            client,
            max_results: max_results.max(1),
        }
    }
}

fn render_hit(hit: &SearchHit) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".into());
    format!(
        "Title: {}\nLink: {}\nSnippet: {}\n-----------------",
        field(&hit.title),
        field(&hit.link),
        field(&hit.snippet)
    )
}

#[async_trait]
impl Tool for SearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Useful to search the internet about a given topic and return relevant results".into(),
            parameters: vec![ParameterSchema::required_string(
                "query",
                "The search query to look up",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query")?;

        let output = match self.client.search(query).await {
            Ok(hits) if hits.is_empty() => return Ok(ToolResult::success(TOOL_NAME, "No results found.")),
            Ok(hits) => hits
                .iter()
                .take(self.max_results)
                .map(render_hit)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(PlannerError::Status { code, .. }) => {
                tracing::warn!(backend = self.client.name(), code, "Search request rejected");
                return Ok(ToolResult::failure(
                    TOOL_NAME,
                    format!("Error: Search API request failed. Status: {}", code),
                ));
            }
            Err(e) => {
                tracing::warn!(backend = self.client.name(), error = %e, "Search failed");
                return Ok(ToolResult::failure(TOOL_NAME, format!("Error during search: {}", e)));
            }
        };

        Ok(ToolResult::success(TOOL_NAME, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    enum Canned {
        Hits(Vec<SearchHit>),
        Status(u16),
        Broken,
    }

    struct CannedSearch(Canned);

    #[async_trait]
    impl SearchClient for CannedSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            match &self.0 {
                Canned::Hits(hits) => Ok(hits.clone()),
                Canned::Status(code) => Err(PlannerError::Status {
                    service: "canned",
                    code: *code,
                    body: String::new(),
                }),
                Canned::Broken => Err(PlannerError::Serialization(
                    serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
                )),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    async fn run(canned: Canned) -> ToolResult {
        SearchTool::new(Arc::new(CannedSearch(canned)), 4)
            .execute(&ToolCall::new(TOOL_NAME).with_arg("query", "Krabi in September"))
            .await
            .unwrap()
    }

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: Some(format!("Result {}", n)),
            link: Some(format!("https://example.com/{}", n)),
            snippet: Some(format!("Snippet {}", n)),
        }
    }

    #[tokio::test]
    async fn test_renders_top_four_hits() {
        let result = run(Canned::Hits((1..=6).map(hit).collect())).await;
        assert!(result.success);
        assert_eq!(result.output.matches("Title: ").count(), 4);
        assert!(result.output.starts_with(
            "Title: Result 1\nLink: https://example.com/1\nSnippet: Snippet 1\n-----------------\nTitle: Result 2"
        ));
        assert!(!result.output.contains("Result 5"));
    }

    #[tokio::test]
    async fn test_missing_fields_render_na() {
        let result = run(Canned::Hits(vec![SearchHit { title: Some("Only title".into()), ..Default::default() }])).await;
        assert_eq!(result.output, "Title: Only title\nLink: N/A\nSnippet: N/A\n-----------------");
    }

    #[tokio::test]
    async fn test_empty_and_failed_searches_are_text() {
        assert_eq!(run(Canned::Hits(vec![])).await.output, "No results found.");

        let status = run(Canned::Status(503)).await;
        assert!(!status.success);
        assert_eq!(status.output, "Error: Search API request failed. Status: 503");

        assert!(run(Canned::Broken).await.output.starts_with("Error during search: "));
    }
}
