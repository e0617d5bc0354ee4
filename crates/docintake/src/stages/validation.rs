use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{Stage, StageError, StageInput, StageKind, StageResult};
use crate::upload::validation::MAX_FILE_SIZE;

pub const NAME: &str = "document_validation_tool";

const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckResult {
    Passed,
    Failed,
    Warning,
}

#[derive(Debug, Serialize)]
struct Check {
    check: &'static str,
    result: CheckResult,
    message: String,
}

/// Format, size and emptiness checks on the materialized upload.
///
/// A failed check marks the document `invalid`; an unusual extension only
/// downgrades a still-valid document to `needs-review`.
pub struct DocumentValidationStage;

impl DocumentValidationStage {
    fn validate(&self, input: &StageInput) -> Result<Map<String, Value>, StageError> {
        let path = input.existing_file()?;
        let document_type = input.str_arg("document_type").unwrap_or_default();
        let size = std::fs::metadata(path)
            .map_err(|e| StageError::Read {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        let size_mb = size as f64 / (1024.0 * 1024.0);

        let mut status = "valid";
        let mut checks = Vec::with_capacity(3);

        if size > MAX_FILE_SIZE {
            status = "invalid";
            checks.push(Check {
                check: "file_size",
                result: CheckResult::Failed,
                message: format!("File size {:.2}MB exceeds 10MB limit", size_mb),
            });
        } else {
            checks.push(Check {
                check: "file_size",
                result: CheckResult::Passed,
                message: format!("File size {:.2}MB is within limits", size_mb),
            });
        }

        if size == 0 {
            status = "invalid";
            checks.push(Check {
                check: "file_empty",
                result: CheckResult::Failed,
                message: "File is empty".to_string(),
            });
        } else {
            checks.push(Check {
                check: "file_empty",
                result: CheckResult::Passed,
                message: "File has content".to_string(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            checks.push(Check {
                check: "file_format",
                result: CheckResult::Passed,
                message: format!("File format .{} is supported", extension),
            });
        } else {
            if status == "valid" {
                status = "needs-review";
            }
            checks.push(Check {
                check: "file_format",
                result: CheckResult::Warning,
                message: format!("File format .{} may not be optimal", extension),
            });
        }

        let mime = mime_guess::from_path(path).first_or_octet_stream();

        tracing::info!(
            status,
            "Document validation completed for {}",
            crate::sanitize::redact_path(path)
        );

        let mut map = Map::new();
        map.insert("status".into(), json!(status));
        map.insert("file_size_mb".into(), json!((size_mb * 100.0).round() / 100.0));
        map.insert("document_type".into(), json!(document_type));
        map.insert("mime_type".into(), json!(mime.essence_str()));
        map.insert("checks".into(), json!(checks));
        Ok(map)
    }
}

impl Stage for DocumentValidationStage {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StageKind {
        StageKind::Validation
    }

    fn invoke(&self, input: &StageInput) -> StageResult {
        let _span = tracing::info_span!("stage.validation").entered();
        StageResult::from_outcome(NAME, self.validate(input))
    }
}
