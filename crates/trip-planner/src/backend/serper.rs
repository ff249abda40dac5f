//! Serper search client

use async_trait::async_trait;
use serde::Deserialize;

use super::{SearchClient, SearchHit, http_client};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

pub struct SerperClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for SerperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerperClient").field("url", &self.url).finish_non_exhaustive()
    }
}

impl SerperClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Self::new(&config.serper_url, config.serper_key(), config.http_timeout_secs)
    }
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        tracing::debug!(query, "Serper search");

        let response = self
            .client
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({ "q": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::Status {
                service: "serper",
                code: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: SerperResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.organic)
    }

    fn name(&self) -> &str {
        "serper"
    }
}
