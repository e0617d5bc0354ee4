//! Binds declared agents and tasks to registered stages.
//!
//! The resulting [`PipelineGraph`] is built once at startup and shared
//! read-only between runs. Runs that need per-document changes work on the
//! copy returned by [`PipelineGraph::prepare`].

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{AgentDefinition, LlmConfig, PipelineDefinition, TaskDefinition};
use crate::error::ConfigError;
use crate::stages::{Stage, StageRegistry};

use super::context::ExecutionContext;
use super::error::GraphWarning;

/// Per-agent budget the engine enforces for each task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub max_iter: u32,
    pub max_execution_time: Duration,
    pub max_retry_limit: u32,
}

impl From<&AgentDefinition> for ExecutionLimits {
    fn from(agent: &AgentDefinition) -> Self {
        Self {
            max_iter: agent.max_iter,
            max_execution_time: Duration::from_secs(agent.max_execution_time),
            max_retry_limit: agent.max_retry_limit,
        }
    }
}

pub struct BoundAgent {
    id: String,
    role: String,
    goal: String,
    llm: LlmConfig,
    stages: Vec<Arc<dyn Stage>>,
    limits: ExecutionLimits,
}

impl BoundAgent {
    fn bind(
        definition: &AgentDefinition,
        registry: &StageRegistry,
        warnings: &mut Vec<GraphWarning>,
    ) -> Self {
        let mut stages = Vec::with_capacity(definition.tools.len());
        for tool in &definition.tools {
            match registry.get(tool) {
                Some(stage) => stages.push(stage),
                None => {
                    let warning = GraphWarning::UnknownTool {
                        agent_id: definition.id.clone(),
                        tool: tool.clone(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Self {
            id: definition.id.clone(),
            role: definition.role.clone(),
            goal: definition.goal.clone(),
            llm: definition.llm.clone(),
            stages,
            limits: ExecutionLimits::from(definition),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn llm(&self) -> &LlmConfig {
        &self.llm
    }

    /// Resolved stages in declaration order.
    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }
}

impl std::fmt::Debug for BoundAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundAgent")
            .field("id", &self.id)
            .field("stages", &self.stage_names())
            .field("limits", &self.limits)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BoundTask {
    pub id: String,
    pub description: String,
    pub expected_output: String,
    pub agent: Arc<BoundAgent>,
    /// Ids of earlier tasks this task reads from. Empty means all of them.
    pub context: Vec<String>,
    pub output_file: Option<PathBuf>,
}

/// Ordered, fully resolved task list.
#[derive(Debug)]
pub struct PipelineGraph {
    agents: Vec<Arc<BoundAgent>>,
    tasks: Vec<BoundTask>,
    warnings: Vec<GraphWarning>,
}

impl PipelineGraph {
    pub fn build(
        definition: &PipelineDefinition,
        registry: &StageRegistry,
    ) -> Result<Self, ConfigError> {
        check_unique("agent", definition.agents.iter().map(|a| a.id.as_str()))?;
        check_unique("task", definition.tasks.iter().map(|t| t.id.as_str()))?;

        let mut warnings = Vec::new();

        let agents: Vec<Arc<BoundAgent>> = definition
            .agents
            .iter()
            .map(|a| Arc::new(BoundAgent::bind(a, registry, &mut warnings)))
            .collect();
        if agents.is_empty() {
            return Err(ConfigError::NoAgents);
        }

        let by_id: HashMap<&str, &Arc<BoundAgent>> =
            agents.iter().map(|a| (a.id.as_str(), a)).collect();

        let mut tasks: Vec<BoundTask> = Vec::with_capacity(definition.tasks.len());
        for task in &definition.tasks {
            let Some(agent) = by_id.get(task.agent_id.as_str()) else {
                let warning = GraphWarning::UnknownAgent {
                    task_id: task.id.clone(),
                    agent_id: task.agent_id.clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                continue;
            };

            let context = resolve_context(task, &tasks, &mut warnings);
            note_unsupported(task, &mut warnings);

            tasks.push(BoundTask {
                id: task.id.clone(),
                description: task.description.clone(),
                expected_output: task.expected_output.clone(),
                agent: Arc::clone(agent),
                context,
                output_file: task.output_file.clone(),
            });
        }
        if tasks.is_empty() {
            return Err(ConfigError::NoTasks);
        }

        info!(
            agents = agents.len(),
            tasks = tasks.len(),
            warnings = warnings.len(),
            "Pipeline graph built"
        );

        Ok(Self {
            agents,
            tasks,
            warnings,
        })
    }

    pub fn agents(&self) -> &[Arc<BoundAgent>] {
        &self.agents
    }

    pub fn tasks(&self) -> &[BoundTask] {
        &self.tasks
    }

    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Copy of the task list with the run's provenance appended to the
    /// first task's description. `self` is left untouched.
    pub fn prepare(&self, ctx: &ExecutionContext) -> Vec<BoundTask> {
        let mut tasks = self.tasks.clone();
        if let Some(first) = tasks.first_mut() {
            first.description = format!("{}\n\n{}", first.description, ctx.context_block());
        }
        tasks
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Keeps context references that point at already bound tasks.
fn resolve_context(
    task: &TaskDefinition,
    bound: &[BoundTask],
    warnings: &mut Vec<GraphWarning>,
) -> Vec<String> {
    let mut context = Vec::with_capacity(task.context.len());
    for id in &task.context {
        if bound.iter().any(|t| &t.id == id) {
            context.push(id.clone());
        } else {
            let warning = GraphWarning::UnresolvedContext {
                task_id: task.id.clone(),
                context_id: id.clone(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
    }
    context
}

fn note_unsupported(task: &TaskDefinition, warnings: &mut Vec<GraphWarning>) {
    let flags = [
        ("async_execution", task.async_execution),
        ("human_input", task.human_input),
    ];
    for (field, set) in flags {
        if set {
            let warning = GraphWarning::Unsupported {
                task_id: task.id.clone(),
                field,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
    }
}
