//! # agent-core
//!
//! Role-bound agents, dependent tasks and a crew that runs them in order,
//! over a provider-agnostic LLM abstraction and a pluggable tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── Crew ─────────────────────────────┐
//! │   Task ──context──► Task ──context──► Task   (topological)    │
//! │     │                 │                 │                     │
//! │   Agent             Agent             Agent                   │
//! │  ┌───────────┐  ┌──────────────┐  ┌─────────────────────┐     │
//! │  │ Reasoning │──│ ToolRegistry │──│ LlmProvider         │     │
//! │  │   Loop    │  │  (per agent) │  │ (Strategy)          │     │
//! │  └───────────┘  └──────────────┘  └─────────────────────┘     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the same crew run against Gemini, Ollama or
//! a scripted test double without changing agent logic.

pub mod agent;
pub mod crew;
pub mod error;
pub mod message;
pub mod provider;
pub mod summarize;
pub mod task;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentConfig, AgentRun};
pub use crew::{Crew, CrewOutput, CrewState};
pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
pub use summarize::{Summarizer, split_chunks};
pub use task::{Task, TaskId, TaskOutput};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
