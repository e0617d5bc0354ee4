use std::path::PathBuf;

use thiserror::Error;

use super::engine::EngineError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to materialize upload at '{path}': {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Temporary file already exists: {0}")]
    TempFileExists(PathBuf),

    #[error("Engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Engine panicked: {0}")]
    EnginePanicked(String),
}

/// Non-fatal problems found while binding the configured graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    UnknownTool { agent_id: String, tool: String },
    UnknownAgent { task_id: String, agent_id: String },
    UnresolvedContext { task_id: String, context_id: String },
    Unsupported { task_id: String, field: &'static str },
}

impl std::fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTool { agent_id, tool } => write!(
                f,
                "Tool '{}' of agent '{}' not found in registry, skipping",
                tool, agent_id
            ),
            Self::UnknownAgent { task_id, agent_id } => write!(
                f,
                "Could not find agent '{}' for task '{}', skipping",
                agent_id, task_id
            ),
            Self::UnresolvedContext {
                task_id,
                context_id,
            } => write!(
                f,
                "Context '{}' of task '{}' is not an earlier task, ignoring",
                context_id, task_id
            ),
            Self::Unsupported { task_id, field } => write!(
                f,
                "Task '{}' sets '{}', which sequential execution ignores",
                task_id, field
            ),
        }
    }
}
