//! Stage contracts and the registry that resolves them by name.
//!
//! A stage never fails its caller: any error is reported as a
//! [`StagePayload::Error`] inside the returned [`StageResult`].

pub mod audit;
pub mod compliance;
pub mod extraction;
pub mod hris;
pub mod imaging;
#[cfg(feature = "ocr")]
pub mod ocr;
pub mod validation;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use audit::AuditLoggingStage;
pub use compliance::ComplianceValidationStage;
pub use extraction::TextExtractionStage;
pub use hris::HrisIntegrationStage;
pub use imaging::ImageProcessingStage;
pub use validation::DocumentValidationStage;

/// What a stage contributes to a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Extraction,
    ImageProcessing,
    Validation,
    Compliance,
    Audit,
    Sync,
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("File not found at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode document: {0}")]
    Decode(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),
}

/// Named arguments handed to a stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageInput {
    args: Map<String, Value>,
}

impl StageInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.args.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &'static str) -> Result<&str, StageError> {
        self.str_arg(key)
            .filter(|v| !v.is_empty())
            .ok_or(StageError::MissingArgument(key))
    }

    /// The `file_path` argument, checked for existence.
    pub fn existing_file(&self) -> Result<&Path, StageError> {
        let path = Path::new(self.require_str("file_path")?);
        if !path.exists() {
            return Err(StageError::FileNotFound(path.to_path_buf()));
        }
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StagePayload {
    Text(String),
    Mapping(Map<String, Value>),
    Error(String),
}

/// Raw output of one stage invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    pub stage: String,
    pub payload: StagePayload,
    pub status: String,
}

impl StageResult {
    pub fn text(stage: &str, text: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            stage: stage.to_string(),
            payload: StagePayload::Text(text.into()),
            status: status.into(),
        }
    }

    /// Mapping payload; the status is read from the mapping's `status` field.
    pub fn mapping(stage: &str, map: Map<String, Value>) -> Self {
        let status = map
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("ok")
            .to_string();
        Self {
            stage: stage.to_string(),
            payload: StagePayload::Mapping(map),
            status,
        }
    }

    pub fn error(stage: &str, message: impl Into<String>) -> Self {
        Self {
            stage: stage.to_string(),
            payload: StagePayload::Error(message.into()),
            status: "error".to_string(),
        }
    }

    /// Converts a fallible stage body into a result that never fails.
    pub fn from_outcome(stage: &str, outcome: Result<Map<String, Value>, StageError>) -> Self {
        match outcome {
            Ok(map) => Self::mapping(stage, map),
            Err(e) => {
                tracing::warn!(stage, "Stage failed: {}", e);
                Self::error(stage, e.to_string())
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, StagePayload::Error(_))
    }

    /// JSON view of the payload; errors become `{"status": "error", "message": ...}`.
    pub fn payload_value(&self) -> Value {
        match &self.payload {
            StagePayload::Text(text) => Value::String(text.clone()),
            StagePayload::Mapping(map) => Value::Object(map.clone()),
            StagePayload::Error(message) => serde_json::json!({
                "status": "error",
                "message": message,
            }),
        }
    }
}

/// A named document-processing capability.
pub trait Stage: Send + Sync {
    /// Registry key. Matched exactly against configured tool names.
    fn name(&self) -> &str;

    fn kind(&self) -> StageKind;

    fn invoke(&self, input: &StageInput) -> StageResult;
}

/// Lookup table from stage name to capability. Immutable once shared.
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: BTreeMap<String, Arc<dyn Stage>>,
}

impl StageRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in stage.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(TextExtractionStage::new());
        registry.register(ImageProcessingStage);
        registry.register(DocumentValidationStage);
        registry.register(ComplianceValidationStage);
        registry.register(AuditLoggingStage);
        registry.register(HrisIntegrationStage);
        registry
    }

    /// Adds a stage, replacing (and returning) any stage with the same name.
    pub fn register<S: Stage + 'static>(&mut self, stage: S) -> Option<Arc<dyn Stage>> {
        self.register_arc(Arc::new(stage))
    }

    pub fn register_arc(&mut self, stage: Arc<dyn Stage>) -> Option<Arc<dyn Stage>> {
        self.stages.insert(stage.name().to_string(), stage)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Stage>> {
        self.stages.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.stages.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}
