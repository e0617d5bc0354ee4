use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocintakeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration source not found: {0}")]
    MissingSource(PathBuf),

    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in '{source_name}': {message}")]
    ParseYaml {
        source_name: String,
        message: String,
    },

    #[error("Schema validation failed for '{source_name}': {errors}")]
    SchemaValidation { source_name: String, errors: String },

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("No agents remain after resolving the pipeline configuration")]
    NoAgents,

    #[error("No tasks remain after resolving the pipeline configuration")]
    NoTasks,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("File already exists: {0}")]
    FileExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, DocintakeError>;
