//! Crew - the pipeline coordinator
//!
//! Owns a set of agents and a dependency graph of tasks. Tasks run one at a
//! time in a topological order of their `context` edges; ties keep
//! declaration order, so a linear chain runs exactly as declared.
//!
//! ```text
//!   Pending ──► Running(0) ──► Running(1) ──► … ──► Completed
//!                   │              │
//!                   └──────────────┴──────────────► Failed
//! ```
//!
//! A failed task fails the whole run. There is no retry and no partial result.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::task::{Task, TaskId, TaskOutput};

/// Lifecycle of one crew run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CrewState {
    Pending,
    Running { index: usize, task: String },
    Completed,
    Failed { task: String, reason: String },
}

/// Result of a successful run
#[derive(Clone, Debug, Serialize)]
pub struct CrewOutput {
    /// Output of the last task executed
    pub raw: String,

    /// Name of the task that produced `raw`
    pub final_task: String,

    /// Every task output, in execution order
    pub tasks_output: Vec<TaskOutput>,
}

/// Sequential executor over a task DAG
pub struct Crew {
    agents: Vec<Arc<Agent>>,
    tasks: Vec<Task>,
    order: Vec<usize>,
    state: CrewState,
}

impl std::fmt::Debug for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crew")
            .field("agents", &self.agents.iter().map(|a| a.role()).collect::<Vec<_>>())
            .field("order", &self.execution_order())
            .field("state", &self.state)
            .finish()
    }
}

impl Crew {
    /// Validate the task graph and fix the execution order
    pub fn new(agents: Vec<Arc<Agent>>, tasks: Vec<Task>) -> Result<Self> {
        if tasks.is_empty() {
            return Err(AgentError::Config("A crew needs at least one task".into()));
        }

        for task in &tasks {
            if !agents.iter().any(|agent| Arc::ptr_eq(agent, task.agent())) {
                return Err(AgentError::Config(format!(
                    "Task '{}' is assigned to agent '{}', which is not part of the crew",
                    task.name(),
                    task.agent().role()
                )));
            }
        }

        let order = topological_order(&tasks)?;

        Ok(Self {
            agents,
            tasks,
            order,
            state: CrewState::Pending,
        })
    }

    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    pub const fn state(&self) -> &CrewState {
        &self.state
    }

    /// Task names in the order they will run
    pub fn execution_order(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.tasks[i].name()).collect()
    }

    /// Run every task once, in dependency order
    pub async fn kickoff(&mut self) -> Result<CrewOutput> {
        if self.state != CrewState::Pending {
            return Err(AgentError::Config(format!(
                "Crew has already been kicked off (state: {:?})",
                self.state
            )));
        }

        tracing::info!(tasks = self.tasks.len(), order = ?self.execution_order(), "Crew kickoff");

        let mut tasks_output = Vec::with_capacity(self.order.len());

        for (index, &task_idx) in self.order.iter().enumerate() {
            let task = &self.tasks[task_idx];
            transition(
                &mut self.state,
                CrewState::Running {
                    index,
                    task: task.name().to_string(),
                },
            );

            let result = match upstream_outputs(&self.tasks, task) {
                Ok(upstream) => task.execute(&upstream).await,
                Err(e) => Err(e),
            };

            let recorded = result.and_then(|output| task.complete(output).cloned());

            match recorded {
                Ok(output) => tasks_output.push(output),
                Err(e) => {
                    let reason = e.to_string();
                    tracing::error!(task = %task.name(), error = %reason, "Task failed, aborting crew");
                    transition(
                        &mut self.state,
                        CrewState::Failed {
                            task: task.name().to_string(),
                            reason: reason.clone(),
                        },
                    );
                    return Err(match e {
                        AgentError::Task { .. } => e,
                        other => AgentError::task(task.name(), other.to_string()),
                    });
                }
            }
        }

        transition(&mut self.state, CrewState::Completed);

        let last = tasks_output
            .last()
            .ok_or_else(|| AgentError::Config("Crew finished without running a task".into()))?;

        Ok(CrewOutput {
            raw: last.raw.clone(),
            final_task: last.name.clone(),
            tasks_output,
        })
    }
}

fn transition(state: &mut CrewState, next: CrewState) {
    tracing::debug!(from = ?state, to = ?next, "Crew state change");
    *state = next;
}

/// Outputs of every upstream task, in the task's declared context order
fn upstream_outputs<'a>(tasks: &'a [Task], task: &Task) -> Result<Vec<&'a TaskOutput>> {
    task.context()
        .iter()
        .map(|id| {
            tasks
                .iter()
                .find(|t| t.id() == *id)
                .and_then(Task::output)
                .ok_or_else(|| {
                    AgentError::task(task.name(), format!("upstream task {} has no output yet", id))
                })
        })
        .collect()
}

/// Kahn's algorithm; among ready tasks the earliest declared runs first
fn topological_order(tasks: &[Task]) -> Result<Vec<usize>> {
    let mut index_of: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if index_of.insert(task.id(), i).is_some() {
            return Err(AgentError::Config(format!(
                "Task '{}' appears more than once in the crew",
                task.name()
            )));
        }
    }

    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];

    for (i, task) in tasks.iter().enumerate() {
        for upstream in task.context() {
            let &j = index_of.get(upstream).ok_or_else(|| {
                AgentError::Config(format!(
                    "Task '{}' depends on a task that is not part of the crew",
                    task.name()
                ))
            })?;
            if j == i {
                return Err(AgentError::Config(format!(
                    "Task '{}' cannot depend on itself",
                    task.name()
                )));
            }
            in_degree[i] += 1;
            dependents[j].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(tasks.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() != tasks.len() {
        let stuck: Vec<&str> = (0..tasks.len())
            .filter(|i| !order.contains(i))
            .map(|i| tasks[i].name())
            .collect();
        return Err(AgentError::Config(format!(
            "Task dependencies form a cycle involving: {}",
            stuck.join(", ")
        )));
    }

    Ok(order)
}
