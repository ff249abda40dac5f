//! Agents and their reasoning loop
//!
//! An [`Agent`] is a role descriptor (role, goal, backstory) bound to a tool
//! set and a model client. It runs a ReAct-style loop: the model either asks
//! for a tool with a ```` ```tool ```` block or answers with `Final Answer:`.
//!
//! Loop policy:
//! - a parsable tool block runs the tool and feeds its output back
//! - an unparsable tool block or an empty reply gets a corrective message
//! - `Final Answer:` ends the loop with the text after the marker
//! - any other reply is taken as the final answer as a whole
//! - after `max_iterations` completions the best partial answer is returned
//!
//! Tool failures never leave the loop. Provider failures do.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message, Role};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Default completion budget per task
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

const TOOL_BLOCK_START: &str = "```tool";
const TOOL_BLOCK_END: &str = "```";
const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum model completions before settling for a partial answer
    pub max_iterations: usize,

    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            generation: GenerationOptions::default(),
        }
    }
}

/// Outcome of one agent run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentRun {
    pub answer: String,

    /// Completions requested from the provider
    pub iterations: usize,

    pub tool_calls: usize,

    /// True when the iteration bound cut the run short
    pub exhausted: bool,
}

/// What the model asked for in one reply
#[derive(Debug, PartialEq)]
enum Step {
    Act(ToolCall),
    Malformed(String),
    Finish(String),
}

/// A role-bound execution persona
pub struct Agent {
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    tools: ToolRegistry,
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("allow_delegation", &self.allow_delegation)
            .field("tools", &self.tools)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub const fn allows_delegation(&self) -> bool {
        self.allow_delegation
    }

    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Persona, goal, tool catalogue and response protocol
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        );

        if self.tools.is_empty() {
            prompt.push_str("\n\nYou have no tools available; answer from the information you are given.");
        } else {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
            prompt.push_str(
                "Use one tool per reply and write nothing after the tool block. \
                 The tool output will be sent back to you.",
            );
        }

        prompt.push_str(&format!(
            "\n\nWhen you have the complete answer, reply with:\n{} <your complete answer>",
            FINAL_ANSWER_MARKER
        ));
        prompt
    }

    /// Drive the model until it produces a final answer for `instructions`
    pub async fn execute(&self, instructions: &str) -> Result<AgentRun> {
        let mut conversation = Conversation::with_system_prompt(self.system_prompt());
        conversation.push(Message::user(instructions));

        let mut tool_calls = 0;

        for iteration in 1..=self.config.max_iterations {
            let completion = self
                .provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            let content = completion.content;
            conversation.push(Message::assistant(&content));

            match parse_step(&content) {
                Step::Act(mut call) => {
                    if call.id.is_none() {
                        call.id = Some(uuid::Uuid::new_v4().to_string());
                    }
                    tracing::debug!(agent = %self.role, tool = %call.name, iteration, "Executing tool");

                    let result = self.invoke_tool(&call).await;
                    tool_calls += 1;
                    conversation.push(Message::tool(format_tool_result(&result), call.id.clone()));
                }
                Step::Malformed(reason) => {
                    tracing::debug!(agent = %self.role, iteration, %reason, "Rejected model reply");
                    conversation.push(Message::tool(reason, None));
                }
                Step::Finish(answer) => {
                    return Ok(AgentRun {
                        answer,
                        iterations: iteration,
                        tool_calls,
                        exhausted: false,
                    });
                }
            }
        }

        tracing::warn!(
            agent = %self.role,
            max_iterations = self.config.max_iterations,
            "Iteration limit reached, returning best partial answer"
        );

        Ok(AgentRun {
            answer: best_partial_answer(&conversation, self.config.max_iterations),
            iterations: self.config.max_iterations,
            tool_calls,
            exhausted: true,
        })
    }

    /// Run a bound tool, turning every failure into text for the model
    async fn invoke_tool(&self, call: &ToolCall) -> ToolResult {
        let result = match self.tools.execute(call).await {
            Ok(result) => result,
            Err(AgentError::ToolNotFound(name)) => {
                let available = if self.tools.is_empty() {
                    "none".to_string()
                } else {
                    self.tools.names().join(", ")
                };
                ToolResult::failure(
                    &name,
                    format!("Error: tool '{}' is not available. Available tools: {}", name, available),
                )
            }
            Err(e) => ToolResult::failure(&call.name, format!("Error: {}", e)),
        };

        if !result.success {
            tracing::warn!(agent = %self.role, tool = %call.name, output = %result.output, "Tool call failed");
        }

        match &call.id {
            Some(id) => result.with_id(id),
            None => result,
        }
    }
}

fn format_tool_result(result: &ToolResult) -> String {
    if result.success {
        format!("[Tool '{}' returned]\n{}", result.name, result.output)
    } else {
        format!("[Tool '{}' failed]\n{}", result.name, result.output)
    }
}

fn parse_step(content: &str) -> Step {
    if let Some(start_idx) = content.find(TOOL_BLOCK_START) {
        let after_marker = &content[start_idx + TOOL_BLOCK_START.len()..];
        let json_str = after_marker
            .find(TOOL_BLOCK_END)
            .map_or(after_marker, |end_idx| &after_marker[..end_idx])
            .trim();

        return match serde_json::from_str::<ToolCall>(json_str) {
            Ok(call) => Step::Act(call),
            Err(e) => Step::Malformed(format!(
                "Error: could not parse the tool call ({}). Use exactly:\n{}\n{{\"tool\": \"tool_name\", \"arguments\": {{\"arg\": \"value\"}}}}\n{}",
                e, TOOL_BLOCK_START, TOOL_BLOCK_END
            )),
        };
    }

    if let Some(call) = parse_inline_tool_call(content) {
        return Step::Act(call);
    }

    let answer = content
        .find(FINAL_ANSWER_MARKER)
        .map_or(content, |idx| &content[idx + FINAL_ANSWER_MARKER.len()..])
        .trim();

    if answer.is_empty() {
        return Step::Malformed(format!(
            "Error: your reply was empty. Use a tool or reply with '{} <your complete answer>'.",
            FINAL_ANSWER_MARKER
        ));
    }

    Step::Finish(answer.to_string())
}

/// A reply that is nothing but a JSON object with a "tool" key
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    let trimmed = content.trim();
    if !trimmed.starts_with('{') || !trimmed.ends_with('}') || !trimmed.contains(r#""tool""#) {
        return None;
    }
    serde_json::from_str::<ToolCall>(trimmed).ok()
}

fn strip_tool_blocks(content: &str) -> String {
    let mut remaining = content;
    let mut prose = String::new();

    while let Some(start) = remaining.find(TOOL_BLOCK_START) {
        prose.push_str(&remaining[..start]);
        let after = &remaining[start + TOOL_BLOCK_START.len()..];
        remaining = after
            .find(TOOL_BLOCK_END)
            .map_or("", |end| &after[end + TOOL_BLOCK_END.len()..]);
    }
    prose.push_str(remaining);
    prose.trim().to_string()
}

fn best_partial_answer(conversation: &Conversation, max_iterations: usize) -> String {
    conversation
        .messages()
        .iter()
        .rev()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| strip_tool_blocks(&m.content))
        .find(|prose| !prose.is_empty())
        .unwrap_or_else(|| {
            format!(
                "Agent stopped after reaching the maximum of {} iterations without a final answer.",
                max_iterations
            )
        })
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    role: Option<String>,
    goal: Option<String>,
    backstory: String,
    allow_delegation: bool,
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            role: None,
            goal: None,
            backstory: String::new(),
            allow_delegation: false,
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub const fn allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn shared_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register_shared(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn generation(mut self, options: GenerationOptions) -> Self {
        self.config.generation = options;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let role = self
            .role
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| AgentError::Config("Agent role is required".into()))?;
        let goal = self
            .goal
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| AgentError::Config(format!("Agent '{}' needs a goal", role)))?;
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.allow_delegation {
            return Err(AgentError::Config(format!(
                "Agent '{}' requests delegation, which is not supported",
                role
            )));
        }
        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent {
            role,
            goal,
            backstory: self.backstory,
            allow_delegation: false,
            tools: self.tools,
            provider,
            config: self.config,
        })
    }
}
