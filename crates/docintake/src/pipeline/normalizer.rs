//! Turns whatever an engine returned into one canonical result.
//!
//! Normalization never fails. Output it cannot interpret is captured
//! verbatim under `raw_result`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::document::{DocumentStatus, DocumentType};

use super::engine::{EngineOutput, TaskOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    Valid,
    NeedsReview,
    Invalid,
    Error,
    Unknown,
    Processed,
}

impl ValidationStatus {
    /// Unrecognized strings map to [`ValidationStatus::Unknown`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "valid" => Self::Valid,
            "needs-review" | "needs_review" => Self::NeedsReview,
            "invalid" => Self::Invalid,
            "error" => Self::Error,
            "processed" => Self::Processed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::NeedsReview => "needs-review",
            Self::Invalid => "invalid",
            Self::Error => "error",
            Self::Unknown => "unknown",
            Self::Processed => "processed",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    document_id: Uuid,
    document_type: DocumentType,
    extracted_data: Map<String, Value>,
    validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compliance_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compliance_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProcessingResult {
    /// Result for a run that never produced engine output.
    pub fn failed(
        document_id: Uuid,
        document_type: DocumentType,
        error: impl std::fmt::Display,
    ) -> Self {
        Self {
            document_id,
            document_type,
            extracted_data: Map::new(),
            validation_status: ValidationStatus::Error,
            compliance_status: None,
            compliance_data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn extracted_data(&self) -> &Map<String, Value> {
        &self.extracted_data
    }

    pub fn validation_status(&self) -> ValidationStatus {
        self.validation_status
    }

    pub fn compliance_status(&self) -> Option<&str> {
        self.compliance_status.as_deref()
    }

    pub fn compliance_data(&self) -> Option<&Value> {
        self.compliance_data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Terminal document status this result leads to.
    pub fn document_status(&self) -> DocumentStatus {
        if self.error.is_some() {
            DocumentStatus::Error
        } else {
            DocumentStatus::Verified
        }
    }
}

#[derive(Error, Debug)]
enum NormalizeError {
    #[error("decoded JSON is not an object")]
    NotAnObject,

    #[error("extracted_data is not an object")]
    ExtractedDataNotObject,

    #[error("unrecognized output shape")]
    UnrecognizedShape,
}

struct Fields {
    extracted_data: Map<String, Value>,
    validation_status: ValidationStatus,
    compliance_status: Option<String>,
    compliance_data: Option<Value>,
}

pub fn normalize(
    output: &EngineOutput,
    document_id: Uuid,
    document_type: DocumentType,
) -> ProcessingResult {
    let fields = try_normalize(output).unwrap_or_else(|e| {
        tracing::warn!(%document_id, "Error parsing engine result: {}, capturing raw output", e);
        let mut extracted_data = Map::new();
        extracted_data.insert("raw_result".to_string(), Value::String(output.to_string()));
        Fields {
            extracted_data,
            validation_status: ValidationStatus::Processed,
            compliance_status: None,
            compliance_data: None,
        }
    });

    ProcessingResult {
        document_id,
        document_type,
        extracted_data: fields.extracted_data,
        validation_status: fields.validation_status,
        compliance_status: fields.compliance_status,
        compliance_data: fields.compliance_data,
        error: None,
    }
}

fn try_normalize(output: &EngineOutput) -> Result<Fields, NormalizeError> {
    match output {
        EngineOutput::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => lift(&map, ValidationStatus::Unknown, Map::new()),
            Ok(_) => Err(NormalizeError::NotAnObject),
            Err(_) => {
                let mut extracted_data = Map::new();
                extracted_data.insert("raw_text".to_string(), Value::String(text.clone()));
                Ok(Fields {
                    extracted_data,
                    validation_status: ValidationStatus::Processed,
                    compliance_status: None,
                    compliance_data: None,
                })
            }
        },
        EngineOutput::TaskOutputs(outputs) => Ok(fold_task_outputs(outputs)),
        EngineOutput::Mapping(map) => lift(map, ValidationStatus::Processed, map.clone()),
        EngineOutput::Other(_) => Err(NormalizeError::UnrecognizedShape),
    }
}

/// Reads the four canonical fields of a mapping.
fn lift(
    map: &Map<String, Value>,
    default_status: ValidationStatus,
    default_data: Map<String, Value>,
) -> Result<Fields, NormalizeError> {
    let extracted_data = match map.get("extracted_data") {
        None => default_data,
        Some(Value::Object(data)) => data.clone(),
        Some(_) => return Err(NormalizeError::ExtractedDataNotObject),
    };

    Ok(Fields {
        extracted_data,
        validation_status: status_field(map).unwrap_or(default_status),
        compliance_status: compliance_status_field(map),
        compliance_data: compliance_data_field(map),
    })
}

fn fold_task_outputs(outputs: &[TaskOutput]) -> Fields {
    let mut fields = Fields {
        extracted_data: Map::new(),
        validation_status: ValidationStatus::Processed,
        compliance_status: None,
        compliance_data: None,
    };

    for output in outputs {
        match output {
            TaskOutput::Mapping(map) => {
                if let Some(status) = status_field(map) {
                    fields.validation_status = status;
                }
                if let Some(status) = compliance_status_field(map) {
                    fields.compliance_status = Some(status);
                }
                if let Some(data) = compliance_data_field(map) {
                    fields.compliance_data = Some(data);
                }
                for (key, value) in map {
                    fields.extracted_data.insert(key.clone(), value.clone());
                }
            }
            TaskOutput::Text(text) => {
                fields
                    .extracted_data
                    .insert("task_output".to_string(), Value::String(text.clone()));
            }
            TaskOutput::Other(_) => {}
        }
    }

    fields
}

fn status_field(map: &Map<String, Value>) -> Option<ValidationStatus> {
    match map.get("validation_status")? {
        Value::String(s) => Some(ValidationStatus::parse(s)),
        Value::Null => None,
        _ => Some(ValidationStatus::Unknown),
    }
}

fn compliance_status_field(map: &Map<String, Value>) -> Option<String> {
    match map.get("compliance_status")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn compliance_data_field(map: &Map<String, Value>) -> Option<Value> {
    map.get("compliance_data").filter(|v| !v.is_null()).cloned()
}
