//! Tasks
//!
//! A [`Task`] is one unit of crew work: fully rendered instructions, a
//! description of what "done" looks like, the agent that does it, and the
//! upstream tasks whose outputs are handed over as context.
//!
//! The output slot is write-once. It stays empty until the crew records the
//! result of [`Task::execute`].

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::Agent;
use crate::error::{AgentError, Result};

/// Unique task identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a completed task
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task: TaskId,

    /// Task name
    pub name: String,

    /// Role of the agent that produced it
    pub agent: String,

    /// Final answer text
    pub raw: String,

    pub iterations: usize,

    pub tool_calls: usize,

    /// The agent hit its iteration bound and returned a partial answer
    pub exhausted: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// A unit of work assigned to one agent
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    expected_output: String,
    agent: Arc<Agent>,
    context: Vec<TaskId>,
    output: OnceLock<TaskOutput>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("agent", &self.agent.role())
            .field("context", &self.context)
            .field("completed", &self.is_complete())
            .finish_non_exhaustive()
    }
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            context: Vec::new(),
            output: OnceLock::new(),
        }
    }

    /// Declare upstream tasks whose outputs feed this one, in order
    #[must_use]
    pub fn with_context(mut self, upstream: &[&Self]) -> Self {
        self.set_context(upstream);
        self
    }

    /// Replace the upstream list
    pub fn set_context(&mut self, upstream: &[&Self]) {
        self.context = upstream.iter().map(|t| t.id).collect();
    }

    pub const fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub const fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Upstream task ids in declaration order
    pub fn context(&self) -> &[TaskId] {
        &self.context
    }

    pub fn output(&self) -> Option<&TaskOutput> {
        self.output.get()
    }

    pub fn is_complete(&self) -> bool {
        self.output.get().is_some()
    }

    /// Instructions sent to the agent, with upstream results appended
    pub fn prompt(&self, context: &[&TaskOutput]) -> String {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description.trim(),
            self.expected_output
        );

        if !context.is_empty() {
            let joined = context
                .iter()
                .map(|output| output.raw.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(&joined);
        }

        prompt
    }

    /// Run the assigned agent
    ///
    /// The caller guarantees every upstream output is available and passes
    /// them in the order of [`Task::context`]. The result is not stored;
    /// record it with [`Task::complete`].
    pub async fn execute(&self, context: &[&TaskOutput]) -> Result<TaskOutput> {
        let started_at = Utc::now();
        tracing::info!(task = %self.name, agent = %self.agent.role(), upstream = context.len(), "Task started");

        let run = self.agent.execute(&self.prompt(context)).await?;

        let finished_at = Utc::now();
        tracing::info!(
            task = %self.name,
            iterations = run.iterations,
            tool_calls = run.tool_calls,
            exhausted = run.exhausted,
            "Task finished"
        );

        Ok(TaskOutput {
            task: self.id,
            name: self.name.clone(),
            agent: self.agent.role().to_string(),
            raw: run.answer,
            iterations: run.iterations,
            tool_calls: run.tool_calls,
            exhausted: run.exhausted,
            started_at,
            finished_at,
        })
    }

    /// Record the output; a task completes exactly once
    pub fn complete(&self, output: TaskOutput) -> Result<&TaskOutput> {
        if output.task != self.id {
            return Err(AgentError::task(
                &self.name,
                format!("output belongs to task '{}'", output.name),
            ));
        }
        self.output
            .set(output)
            .map_err(|_| AgentError::task(&self.name, "output has already been recorded"))?;
        self.output
            .get()
            .ok_or_else(|| AgentError::task(&self.name, "output was not recorded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
    use async_trait::async_trait;

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "echo".into(),
                default_model: "echo".into(),
                endpoint: "memory".into(),
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
            let words = messages.last().map_or(0, |m| m.content.split_whitespace().count());
            Ok(Completion::text(format!("Final Answer: {} words", words), &options.model))
        }
    }

    fn agent() -> Arc<Agent> {
        Arc::new(
            Agent::builder()
                .role("Principal Researcher")
                .goal("Summarize")
                .provider(Arc::new(EchoProvider))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_prompt_appends_context_in_order() {
        let first = Task::new("a", "Pick a city", "A city", agent());
        let second = Task::new("b", "Guide the city", "A guide", agent()).with_context(&[&first]);
        assert_eq!(second.context(), &[first.id()]);

        let now = Utc::now();
        let upstream = TaskOutput {
            task: first.id(),
            name: "a".into(),
            agent: "Principal Researcher".into(),
            raw: "Krabi".into(),
            iterations: 1,
            tool_calls: 0,
            exhausted: false,
            started_at: now,
            finished_at: now,
        };

        let prompt = second.prompt(&[&upstream]);
        assert!(prompt.starts_with("Guide the city"));
        assert!(prompt.contains("expected criteria for your final answer: A guide"));
        assert!(prompt.ends_with("This is the context you're working with:\nKrabi"));
        assert!(!first.prompt(&[]).contains("context you're working with"));
    }

    #[tokio::test]
    async fn test_output_is_write_once() {
        let task = Task::new("summary", "Summarize this", "A summary", agent());
        assert!(task.output().is_none());

        let output = task.execute(&[]).await.unwrap();
        assert_eq!(output.agent, "Principal Researcher");
        assert!(output.raw.ends_with("words"));

        task.complete(output.clone()).unwrap();
        assert!(task.is_complete());
        assert!(matches!(task.complete(output), Err(AgentError::Task { .. })));
    }

    #[tokio::test]
    async fn test_foreign_output_is_rejected() {
        let a = Task::new("a", "one", "x", agent());
        let b = Task::new("b", "two", "y", agent());
        let output = a.execute(&[]).await.unwrap();
        assert!(b.complete(output).is_err());
        assert!(!b.is_complete());
    }
}
