//! Planner Configuration
//!
//! Everything a run needs, read once from the environment and handed to
//! [`crate::TripCrew`] explicitly. Credentials may be absent at load time;
//! [`PlannerConfig::validate`] rejects the config before any run starts.

use agent_core::provider::DEFAULT_MODEL;

use crate::error::{PlannerError, Result};

pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";
pub const DEFAULT_BROWSERLESS_URL: &str = "https://chrome.browserless.io";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct PlannerConfig {
    pub gemini_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub browserless_api_key: Option<String>,

    /// Model used by every agent
    pub model: String,

    pub gemini_url: String,
    pub serper_url: String,
    pub browserless_url: String,

    /// Characters per summarization chunk
    pub chunk_size: usize,

    /// Organic search results passed to the agent
    pub search_results: usize,

    /// Completion budget per task
    pub max_iterations: usize,

    /// Chunks summarized concurrently
    pub summary_concurrency: usize,

    /// Timeout for each search / fetch HTTP call
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("PlannerConfig")
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("serper_api_key", &redact(&self.serper_api_key))
            .field("browserless_api_key", &redact(&self.browserless_api_key))
            .field("model", &self.model)
            .field("gemini_url", &self.gemini_url)
            .field("serper_url", &self.serper_url)
            .field("browserless_url", &self.browserless_url)
            .field("chunk_size", &self.chunk_size)
            .field("search_results", &self.search_results)
            .field("max_iterations", &self.max_iterations)
            .field("summary_concurrency", &self.summary_concurrency)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            serper_api_key: None,
            browserless_api_key: None,
            model: DEFAULT_MODEL.into(),
            gemini_url: DEFAULT_GEMINI_URL.into(),
            serper_url: DEFAULT_SERPER_URL.into(),
            browserless_url: DEFAULT_BROWSERLESS_URL.into(),
            chunk_size: agent_core::summarize::DEFAULT_CHUNK_SIZE,
            search_results: 4,
            max_iterations: agent_core::agent::DEFAULT_MAX_ITERATIONS,
            summary_concurrency: agent_core::summarize::DEFAULT_CONCURRENCY,
            http_timeout_secs: 60,
        }
    }
}

impl PlannerConfig {
    /// Config with all three credentials set and defaults elsewhere
    pub fn with_credentials(
        gemini: impl Into<String>,
        serper: impl Into<String>,
        browserless: impl Into<String>,
    ) -> Self {
        Self {
            gemini_api_key: Some(gemini.into()),
            serper_api_key: Some(serper.into()),
            browserless_api_key: Some(browserless.into()),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default);

        Ok(Self {
            gemini_api_key: lookup("GEMINI_API_KEY"),
            serper_api_key: lookup("SERPER_API_KEY"),
            browserless_api_key: lookup("BROWSERLESS_API_KEY"),
            model: text("PLANNER_MODEL", defaults.model),
            gemini_url: text("GEMINI_URL", defaults.gemini_url),
            serper_url: text("SERPER_URL", defaults.serper_url),
            browserless_url: text("BROWSERLESS_URL", defaults.browserless_url),
            chunk_size: parse_number(&lookup, "CHUNK_SIZE", defaults.chunk_size)?,
            search_results: parse_number(&lookup, "SEARCH_RESULTS", defaults.search_results)?,
            max_iterations: parse_number(&lookup, "MAX_ITERATIONS", defaults.max_iterations)?,
            summary_concurrency: parse_number(&lookup, "SUMMARY_CONCURRENCY", defaults.summary_concurrency)?,
            http_timeout_secs: parse_number(&lookup, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
        })
    }

    /// Names of the credentials that are absent or blank
    pub fn missing_credentials(&self) -> Vec<String> {
        [
            ("GEMINI_API_KEY", &self.gemini_api_key),
            ("SERPER_API_KEY", &self.serper_api_key),
            ("BROWSERLESS_API_KEY", &self.browserless_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// Check credentials and limits; must pass before a run is accepted
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            return Err(PlannerError::MissingCredentials(missing));
        }

        for (name, value) in [
            ("CHUNK_SIZE", self.chunk_size),
            ("SEARCH_RESULTS", self.search_results),
            ("MAX_ITERATIONS", self.max_iterations),
            ("SUMMARY_CONCURRENCY", self.summary_concurrency),
        ] {
            if value == 0 {
                return Err(PlannerError::Config(format!("{} must be greater than zero", name)));
            }
        }
        if self.http_timeout_secs == 0 {
            return Err(PlannerError::Config("HTTP_TIMEOUT_SECS must be greater than zero".into()));
        }

        Ok(())
    }

    pub fn gemini_key(&self) -> &str {
        self.gemini_api_key.as_deref().unwrap_or_default()
    }

    pub fn serper_key(&self) -> &str {
        self.serper_api_key.as_deref().unwrap_or_default()
    }

    pub fn browserless_key(&self) -> &str {
        self.browserless_api_key.as_deref().unwrap_or_default()
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| PlannerError::Config(format!("{} must be a positive number, got '{}'", key, raw))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = PlannerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.chunk_size, 8000);
        assert_eq!(config.search_results, 4);
        assert_eq!(config.serper_url, DEFAULT_SERPER_URL);
        assert_eq!(config.missing_credentials().len(), 3);
        assert!(matches!(config.validate(), Err(PlannerError::MissingCredentials(ref m)) if m.len() == 3));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = PlannerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("SERPER_API_KEY", "  "),
            ("BROWSERLESS_API_KEY", "b"),
        ]))
        .unwrap();
        assert_eq!(config.missing_credentials(), vec!["SERPER_API_KEY".to_string()]);
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = PlannerConfig::from_lookup(lookup(&[("CHUNK_SIZE", "500"), ("PLANNER_MODEL", "gemini-1.5-pro")])).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.model, "gemini-1.5-pro");

        assert!(PlannerConfig::from_lookup(lookup(&[("MAX_ITERATIONS", "many")])).is_err());

        let mut zero = PlannerConfig::with_credentials("g", "s", "b");
        zero.chunk_size = 0;
        assert!(matches!(zero.validate(), Err(PlannerError::Config(_))));
        assert!(PlannerConfig::with_credentials("g", "s", "b").validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = PlannerConfig::with_credentials("gem-secret", "serp-secret", "bl-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
    }
}
