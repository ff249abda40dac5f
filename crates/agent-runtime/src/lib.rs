//! # agent-runtime
//!
//! Model clients for the trip-crew agents.
//!
//! ## Providers
//!
//! - **Gemini** (default): hosted inference over the `generateContent` REST API
//! - **Ollama** (feature `ollama`): local inference, no credential needed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::GeminiProvider;
//!
//! let provider = GeminiProvider::new(api_key)?;
//! let agent = Agent::builder()
//!     .role("Local Expert")
//!     .goal("Provide the best local insights")
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{AgentError, LlmProvider, Message, Result, Role};
