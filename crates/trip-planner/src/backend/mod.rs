//! External Backends
//!
//! Clients for the web search and page rendering services the tools call.
//! Both sit behind traits so tools can be driven by in-memory fakes.

mod browserless;
mod serper;

pub use browserless::BrowserlessFetcher;
pub use serper::SerperClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One organic search result; every field may be missing upstream
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub snippet: Option<String>,
}

/// Web search client (Strategy pattern)
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Organic results in ranking order
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

/// Rendered page fetcher
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw HTML of the page at `url`
    async fn fetch(&self, url: &str) -> Result<String>;

    fn name(&self) -> &str;
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}
