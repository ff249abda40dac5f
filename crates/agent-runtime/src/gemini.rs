//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` over the Gemini `generateContent` REST API.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,

    /// API root, without the `/v1beta` suffix
    pub base_url: String,

    /// Model used by `info` and `health_check`
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: agent_core::provider::DEFAULT_MODEL.into(),
            timeout_secs: 120,
        }
    }

    /// Read `GEMINI_API_KEY`, `GEMINI_URL` and `PLANNER_MODEL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AgentError::Config("GEMINI_API_KEY is not set".into()))?;
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("GEMINI_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("PLANNER_MODEL") {
            config.model = model;
        }
        Ok(config)
    }
}

/// Gemini LLM provider
pub struct GeminiProvider {
    http: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(GeminiConfig::new(api_key))
    }

    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?)
    }

    fn endpoint(&self, model: &str, action: &str) -> String {
        format!(
            "{}/v1beta/models/{}{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            action
        )
    }

    /// System messages become the system instruction; consecutive turns
    /// with the same Gemini role are merged.
    fn build_request(messages: &[Message], options: &GenerationOptions) -> GenerateRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let mut contents: Vec<Content> = Vec::new();
        for message in messages.iter().filter(|m| m.role != Role::System) {
            let role = match message.role {
                Role::Assistant => "model",
                // Tool observations are fed back as user turns
                Role::User | Role::Tool | Role::System => "user",
            };
            match contents.last_mut() {
                Some(last) if last.role.as_deref() == Some(role) => {
                    last.parts.push(Part { text: message.content.clone() });
                }
                _ => contents.push(Content {
                    role: Some(role.into()),
                    parts: vec![Part { text: message.content.clone() }],
                }),
            }
        }

        GenerateRequest {
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part { text: system.join("\n\n") }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
                stop_sequences: options.stop_sequences.clone(),
            },
        }
    }

    fn convert_completion(response: GenerateResponse, model: &str) -> Result<Completion> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("Gemini returned no candidates".into()))?;

        let content = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        let finish_reason = candidate.finish_reason.as_deref().map(|reason| match reason {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
            _ => FinishReason::Error,
        });

        Ok(Completion {
            content,
            model: model.to_string(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            truncated: finish_reason == Some(FinishReason::Length),
            finish_reason,
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("Gemini returned {}: {}", status.as_u16(), body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Gemini".into(),
            default_model: self.config.model.clone(),
            endpoint: self.config.base_url.clone(),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .http
            .get(self.endpoint(&self.config.model, ""))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => Ok(true),
            Ok(r) => {
                tracing::warn!(status = %r.status(), "Gemini health check failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options);

        let response = self
            .http
            .post(self.endpoint(&options.model, ":generateContent"))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("Malformed Gemini response: {}", e)))?;

        Self::convert_completion(body, &options.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Path, http::StatusCode as AxumStatus, routing::post};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> GeminiProvider {
        let mut config = GeminiConfig::new("test-key");
        config.base_url = base_url;
        GeminiProvider::from_config(config).unwrap()
    }

    #[test]
    fn test_request_mapping() {
        let messages = vec![
            Message::system("You are a Local Expert."),
            Message::user("Compile a guide"),
            Message::assistant("```tool\n{}\n```"),
            Message::tool("[Tool 'search_internet' returned]\nresults", None),
        ];
        let request = GeminiProvider::build_request(&messages, &GenerationOptions::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "You are a Local Expert.");
        assert_eq!(value["contents"].as_array().unwrap().len(), 3);
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["role"], "user");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
        assert!(value["generationConfig"].get("stopSequences").is_none());
    }

    #[tokio::test]
    async fn test_complete_success() {
        let router = Router::new().route(
            "/v1beta/models/{action}",
            post(|Path(action): Path<String>, Json(body): Json<Value>| async move {
                assert_eq!(action, "gemini-2.0-flash:generateContent");
                assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
                Json(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "Final Answer: "}, {"text": "Hello"}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
                }))
            }),
        );
        let provider = provider(serve(router).await);

        let completion = provider
            .complete(&[Message::user("Hi")], &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(completion.content, "Final Answer: Hello");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 5);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let router = Router::new().route(
            "/v1beta/models/{action}",
            post(|Path(action): Path<String>| async move {
                if action.starts_with("busy") {
                    (AxumStatus::TOO_MANY_REQUESTS, "quota")
                } else if action.starts_with("down") {
                    (AxumStatus::SERVICE_UNAVAILABLE, "overloaded")
                } else {
                    (AxumStatus::OK, "{\"candidates\": []}")
                }
            }),
        );
        let provider = provider(serve(router).await);
        let messages = [Message::user("Hi")];

        let busy = provider.complete(&messages, &GenerationOptions::for_model("busy")).await;
        assert!(matches!(busy, Err(AgentError::RateLimited(_))));

        let down = provider.complete(&messages, &GenerationOptions::for_model("down")).await;
        assert!(matches!(down, Err(AgentError::ProviderUnavailable(ref m)) if m.contains("503")));

        let empty = provider.complete(&messages, &GenerationOptions::for_model("empty")).await;
        assert!(matches!(empty, Err(AgentError::Provider(_))));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
