//! Website Scrape Tool
//!
//! Fetches a rendered page, reduces it to readable text and summarizes it
//! chunk by chunk so long pages fit in the agent's context.

use std::sync::Arc;
use async_trait::async_trait;

use agent_core::{
    Summarizer, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
    Result as CoreResult,
};

use super::HtmlExtractor;
use crate::backend::PageFetcher;
use crate::error::PlannerError;

const TOOL_NAME: &str = "scrape_website";

/// Tool for scraping and summarizing a website
pub struct ScrapeTool {
    fetcher: Arc<dyn PageFetcher>,
    summarizer: Summarizer,
    extractor: Arc<HtmlExtractor>,
}

impl ScrapeTool {
    pub fn new(fetcher: Arc<dyn PageFetcher>, summarizer: Summarizer, extractor: Arc<HtmlExtractor>) -> Self {
        Self {
            fetcher,
            summarizer,
            extractor,
        }
    }
}

#[async_trait]
impl Tool for ScrapeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Useful to scrape and summarize a website's content".into(),
            parameters: vec![ParameterSchema::required_string(
                "website_url",
                "The website URL to scrape",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let url = call.str_arg("website_url")?;

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(PlannerError::Status { code, body, .. }) => {
                tracing::warn!(url, code, "Page fetch rejected");
                return Ok(ToolResult::failure(
                    TOOL_NAME,
                    format!("Error fetching website. Status: {} {}", code, body),
                ));
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Page fetch failed");
                return Ok(ToolResult::failure(
                    TOOL_NAME,
                    format!("Error while processing website: {}", e),
                ));
            }
        };

        let text = self.extractor.extract(&html);
        if text.is_empty() {
            return Ok(ToolResult::success(TOOL_NAME, format!("No readable content found at {}", url)));
        }

        tracing::debug!(url, chars = text.chars().count(), "Summarizing page");
        match self.summarizer.summarize(&text).await {
            Ok(summary) => Ok(ToolResult::success(TOOL_NAME, summary)),
            Err(e) => {
                tracing::warn!(url, error = %e, "Page summarization failed");
                Ok(ToolResult::failure(
                    TOOL_NAME,
                    format!("Error while processing website: {}", e),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use agent_core::{
        AgentError, Completion, GenerationOptions, LlmProvider, Message, ProviderInfo,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticPage(std::result::Result<String, u16>);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, _url: &str) -> Result<String> {
            self.0.clone().map_err(|code| PlannerError::Status {
                service: "static",
                code,
                body: "upstream said no".into(),
            })
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    /// Answers every summary request with its call number
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn info(&self) -> agent_core::Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "counting".into(),
                default_model: "test".into(),
                endpoint: "memory".into(),
            })
        }

        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(&self, _messages: &[Message], options: &GenerationOptions) -> agent_core::Result<Completion> {
            if self.fail {
                return Err(AgentError::ProviderUnavailable("model offline".into()));
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Completion::text(format!("Final Answer: summary {}", n), &options.model))
        }
    }

    fn tool(page: std::result::Result<String, u16>, provider: CountingProvider, chunk_size: usize) -> ScrapeTool {
        let summarizer = Summarizer::new(Arc::new(provider), GenerationOptions::default())
            .with_chunk_size(chunk_size)
            .with_concurrency(1);
        ScrapeTool::new(
            Arc::new(StaticPage(page)),
            summarizer,
            Arc::new(HtmlExtractor::new().unwrap()),
        )
    }

    fn call() -> ToolCall {
        ToolCall::new(TOOL_NAME).with_arg("website_url", "https://example.com/krabi")
    }

    #[tokio::test]
    async fn test_summarizes_each_chunk() {
        let page = format!("<html><body><p>{}</p></body></html>", "x".repeat(25));
        let result = tool(Ok(page), CountingProvider::default(), 10).execute(&call()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.output, "summary 1\n\nsummary 2\n\nsummary 3");
    }

    #[tokio::test]
    async fn test_status_error_is_text() {
        let result = tool(Err(502), CountingProvider::default(), 10).execute(&call()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Error fetching website. Status: 502 upstream said no");
    }

    #[tokio::test]
    async fn test_empty_page_and_model_failure() {
        let empty = tool(Ok("<html><script>x()</script></html>".into()), CountingProvider::default(), 10)
            .execute(&call())
            .await
            .unwrap();
        assert_eq!(empty.output, "No readable content found at https://example.com/krabi");

        let offline = CountingProvider { fail: true, ..Default::default() };
        let failed = tool(Ok("<p>Beaches</p>".into()), offline, 10).execute(&call()).await.unwrap();
        assert!(!failed.success);
        assert!(failed.output.starts_with("Error while processing website: "));
    }
}
