use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Model selection carried by an agent. Recorded, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
        }
    }
}

/// One configured actor and the stages it may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: String,
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub allow_delegation: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,
    /// Seconds.
    #[serde(default = "default_max_execution_time")]
    pub max_execution_time: u64,
    #[serde(default = "default_true")]
    pub respect_context_window: bool,
    #[serde(default = "default_max_retry_limit")]
    pub max_retry_limit: u32,
    #[serde(default)]
    pub memory: bool,
}

fn default_max_iter() -> u32 {
    12
}

fn default_max_execution_time() -> u64 {
    300
}

fn default_max_retry_limit() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
    pub agent_id: String,
    /// Ids of earlier tasks whose output this task consumes.
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub human_input: bool,
    #[serde(default)]
    pub async_execution: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AgentsDocument {
    pub agents: Vec<AgentDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TasksDocument {
    pub tasks: Vec<TaskDefinition>,
}

/// Agents and tasks exactly as declared, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub agents: Vec<AgentDefinition>,
    pub tasks: Vec<TaskDefinition>,
}
