use serde_json::{Map, Value};
use thiserror::Error;

use super::context::ExecutionContext;
use super::graph::BoundTask;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Task '{task_id}' failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Output of a single task, as reported by an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    Text(String),
    Mapping(Map<String, Value>),
    Other(Value),
}

impl TaskOutput {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(map) => Self::Mapping(map),
            other => Self::Other(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Mapping(map) => Value::Object(map.clone()),
            Self::Other(value) => value.clone(),
        }
    }
}

/// Every shape an engine may hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Text(String),
    TaskOutputs(Vec<TaskOutput>),
    Mapping(Map<String, Value>),
    Other(Value),
}

impl EngineOutput {
    /// Classifies a raw JSON result. An object with a `tasks_output` array is
    /// a per-task result list.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(mut map) => match map.remove("tasks_output") {
                Some(Value::Array(items)) => {
                    Self::TaskOutputs(items.into_iter().map(TaskOutput::from_value).collect())
                }
                Some(other) => {
                    map.insert("tasks_output".to_string(), other);
                    Self::Mapping(map)
                }
                None => Self::Mapping(map),
            },
            other => Self::Other(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::TaskOutputs(outputs) => {
                let mut map = Map::new();
                map.insert(
                    "tasks_output".to_string(),
                    Value::Array(outputs.iter().map(TaskOutput::to_value).collect()),
                );
                Value::Object(map)
            }
            Self::Mapping(map) => Value::Object(map.clone()),
            Self::Other(value) => value.clone(),
        }
    }
}

impl std::fmt::Display for EngineOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

/// Runs an ordered task list once and reports the combined result.
pub trait Engine: Send + Sync {
    fn run(
        &self,
        tasks: &[BoundTask],
        ctx: &ExecutionContext,
    ) -> Result<EngineOutput, EngineError>;
}

impl<F> Engine for F
where
    F: Fn(&[BoundTask], &ExecutionContext) -> Result<EngineOutput, EngineError> + Send + Sync,
{
    fn run(
        &self,
        tasks: &[BoundTask],
        ctx: &ExecutionContext,
    ) -> Result<EngineOutput, EngineError> {
        self(tasks, ctx)
    }
}
