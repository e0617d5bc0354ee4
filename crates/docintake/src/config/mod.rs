pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{
    load_agents_from_str, load_pipeline_definition, load_tasks_from_str, AGENTS_FILE, TASKS_FILE,
};
pub use schema::{AgentDefinition, LlmConfig, PipelineDefinition, TaskDefinition};
pub use settings::{load_settings, load_settings_from_str, ServiceSettings, SETTINGS_FILE};
