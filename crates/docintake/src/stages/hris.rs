use serde_json::{json, Map, Value};

use super::{Stage, StageError, StageInput, StageKind, StageResult};

pub const NAME: &str = "hris_integration_tool";

/// Placeholder for pushing document data to an HRIS. Nothing is sent.
pub struct HrisIntegrationStage;

impl HrisIntegrationStage {
    fn sync(&self, input: &StageInput) -> Result<Map<String, Value>, StageError> {
        let user_id = input.require_str("user_id")?;
        let document_type = input.require_str("document_type")?;

        tracing::info!(document_type, "HRIS sync skipped, integration not configured");

        let mut map = Map::new();
        map.insert("status".into(), json!("stub"));
        map.insert("message".into(), json!("HRIS integration is not configured"));
        map.insert("user_id".into(), json!(user_id));
        map.insert("document_type".into(), json!(document_type));
        map.insert("sync_status".into(), json!("not_synced"));
        Ok(map)
    }
}

impl Stage for HrisIntegrationStage {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StageKind {
        StageKind::Sync
    }

    fn invoke(&self, input: &StageInput) -> StageResult {
        StageResult::from_outcome(NAME, self.sync(input))
    }
}
