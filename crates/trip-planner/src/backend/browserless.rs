//! Browserless content client
//!
//! Renders a page in a hosted headless browser and returns its HTML.

use async_trait::async_trait;

use super::{PageFetcher, http_client};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};

pub struct BrowserlessFetcher {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for BrowserlessFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserlessFetcher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BrowserlessFetcher {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Self::new(&config.browserless_url, config.browserless_key(), config.http_timeout_secs)
    }
}

#[async_trait]
impl PageFetcher for BrowserlessFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "Browserless fetch");

        let response = self
            .client
            .post(format!("{}/content", self.base_url))
            .query(&[("token", self.token.as_str())])
            .header("cache-control", "no-cache")
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlannerError::Status {
                service: "browserless",
                code: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }

    fn name(&self) -> &str {
        "browserless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::post};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_fetch_passes_token_and_url() {
        let router = Router::new().route(
            "/content",
            post(|Query(q): Query<HashMap<String, String>>, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(q["token"], "bl-token");
                format!("<html><body><p>{}</p></body></html>", body["url"].as_str().unwrap_or_default())
            }),
        );
        let fetcher = BrowserlessFetcher::new(serve(router).await, "bl-token", 5).unwrap();

        let html = fetcher.fetch("https://example.com/krabi").await.unwrap();
        assert!(html.contains("https://example.com/krabi"));
    }

    #[tokio::test]
    async fn test_non_success_keeps_status_and_body() {
        let router = Router::new().route("/content", post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }));
        let fetcher = BrowserlessFetcher::new(serve(router).await, "t", 5).unwrap();

        match fetcher.fetch("https://example.com").await {
            Err(PlannerError::Status { code, body, .. }) => {
                assert_eq!(code, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_truncated_error_body_still_reports_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            // Drain the request up to the end of its JSON body
            while !request.ends_with(b"}") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 502 Bad Gateway\r\ncontent-length: 100\r\nconnection: close\r\n\r\npartial")
                .await
                .unwrap();
        });

        let fetcher = BrowserlessFetcher::new(format!("http://{}", addr), "t", 5).unwrap();
        match fetcher.fetch("https://example.com").await {
            Err(PlannerError::Status { service, code, .. }) => {
                assert_eq!(service, "browserless");
                assert_eq!(code, 502);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
