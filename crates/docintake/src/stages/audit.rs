use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use super::{Stage, StageError, StageInput, StageKind, StageResult};

pub const NAME: &str = "audit_logging_tool";

/// Records an audit trail entry for a processing action.
pub struct AuditLoggingStage;

impl AuditLoggingStage {
    fn record(&self, input: &StageInput) -> Result<Map<String, Value>, StageError> {
        let document_id = input.require_str("document_id")?;
        let user_id = input.require_str("user_id")?;
        let action = input.require_str("action")?;
        let details = input.str_arg("details").unwrap_or_default();

        tracing::info!(document_id, action, "Audit log entry recorded");

        let mut map = Map::new();
        map.insert(
            "timestamp".into(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        map.insert("document_id".into(), json!(document_id));
        map.insert("user_id".into(), json!(user_id));
        map.insert("action".into(), json!(action));
        map.insert("details".into(), json!(details));
        map.insert("status".into(), json!("logged"));
        Ok(map)
    }
}

impl Stage for AuditLoggingStage {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StageKind {
        StageKind::Audit
    }

    fn invoke(&self, input: &StageInput) -> StageResult {
        StageResult::from_outcome(NAME, self.record(input))
    }
}
