use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::schema::{
    AgentDefinition, AgentsDocument, PipelineDefinition, TaskDefinition, TasksDocument,
};
use crate::error::ConfigError;

pub const AGENTS_FILE: &str = "agents.yaml";
pub const TASKS_FILE: &str = "tasks.yaml";

const AGENTS_SCHEMA_JSON: &str = include_str!("../../../../schema/agents-v1.json");
const TASKS_SCHEMA_JSON: &str = include_str!("../../../../schema/tasks-v1.json");

/// Loads `agents.yaml` and `tasks.yaml` from `config_dir`.
pub fn load_pipeline_definition<P: AsRef<Path>>(
    config_dir: P,
) -> Result<PipelineDefinition, ConfigError> {
    let config_dir = config_dir.as_ref();
    if !config_dir.is_dir() {
        return Err(ConfigError::MissingSource(config_dir.to_path_buf()));
    }

    let agents_path = config_dir.join(AGENTS_FILE);
    let agents = load_agents_from_str(&read_source(&agents_path)?, AGENTS_FILE)?;
    log::info!("Loaded {} agents from {}", agents.len(), agents_path.display());

    let tasks_path = config_dir.join(TASKS_FILE);
    let tasks = load_tasks_from_str(&read_source(&tasks_path)?, TASKS_FILE)?;
    log::info!("Loaded {} tasks from {}", tasks.len(), tasks_path.display());

    Ok(PipelineDefinition { agents, tasks })
}

pub fn load_agents_from_str(
    content: &str,
    source_name: &str,
) -> Result<Vec<AgentDefinition>, ConfigError> {
    let document: AgentsDocument = parse_document(content, source_name, AGENTS_SCHEMA_JSON)?;
    Ok(document.agents)
}

pub fn load_tasks_from_str(
    content: &str,
    source_name: &str,
) -> Result<Vec<TaskDefinition>, ConfigError> {
    let document: TasksDocument = parse_document(content, source_name, TASKS_SCHEMA_JSON)?;
    Ok(document.tasks)
}

fn read_source(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingSource(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_document<T: DeserializeOwned>(
    content: &str,
    source_name: &str,
    schema_json: &str,
) -> Result<T, ConfigError> {
    let value: serde_json::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

    validate_schema(&value, source_name, schema_json)?;

    serde_json::from_value(value).map_err(|e| ConfigError::Validation {
        message: format!("{}: {}", source_name, e),
    })
}

fn validate_schema(
    value: &serde_json::Value,
    source_name: &str,
    schema_json: &str,
) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(schema_json).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ConfigError::SchemaValidation {
            source_name: source_name.to_string(),
            errors: errors.join("; "),
        });
    }

    Ok(())
}
