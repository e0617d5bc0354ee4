use serde_json::{json, Map, Value};

use super::{Stage, StagePayload, StageError, StageInput, StageKind, StageResult};
use crate::document::DocumentType;

pub const NAME: &str = "compliance_validation_tool";

/// Per-type regulatory checks over previously extracted data.
pub struct ComplianceValidationStage;

impl ComplianceValidationStage {
    fn check(&self, input: &StageInput) -> Result<Map<String, Value>, StageError> {
        let document_type = input.require_str("document_type")?;
        let data = parse_extracted(input.get("extracted_data"));

        let mut checks = Vec::new();
        let mut warnings: Vec<&str> = Vec::new();
        let mut status = "compliant";

        match DocumentType::parse(document_type) {
            Some(DocumentType::I9) => checks.push(passed("I-9 form identified".to_string())),
            Some(DocumentType::W4) => checks.push(passed("W-4 form identified".to_string())),
            Some(t) if t.is_identity() => {
                checks.push(passed(format!("{} document identified", document_type)))
            }
            _ => {}
        }

        if !has_content(&data) {
            status = "needs-review";
            warnings.push("Limited data extracted from document");
        }

        tracing::info!(
            document_type,
            compliance_status = status,
            "Compliance validation completed"
        );

        let mut map = Map::new();
        map.insert("compliance_status".into(), json!(status));
        map.insert("document_type".into(), json!(document_type));
        map.insert("checks".into(), Value::Array(checks));
        map.insert("warnings".into(), json!(warnings));
        Ok(map)
    }
}

impl Stage for ComplianceValidationStage {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StageKind {
        StageKind::Compliance
    }

    fn invoke(&self, input: &StageInput) -> StageResult {
        let _span = tracing::info_span!("stage.compliance").entered();
        let mut result = StageResult::from_outcome(NAME, self.check(input));
        if let StagePayload::Mapping(map) = &result.payload {
            if let Some(status) = map.get("compliance_status").and_then(Value::as_str) {
                result.status = status.to_string();
            }
        }
        result
    }
}

fn passed(message: String) -> Value {
    json!({
        "check": "document_type",
        "result": "passed",
        "message": message,
    })
}

/// Accepts a JSON object, a JSON-encoded string, or free text.
fn parse_extracted(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(Value::String(text)) => serde_json::from_str::<Value>(text)
            .unwrap_or_else(|_| json!({ "raw_text": text })),
        Some(other) => other.clone(),
    }
}

fn has_content(data: &Value) -> bool {
    match data {
        Value::Object(map) => map.get("raw_text").is_some_and(is_truthy),
        other => is_truthy(other),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
