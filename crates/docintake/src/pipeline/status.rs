use tracing::{info, warn};
use uuid::Uuid;

use crate::document::DocumentStatus;

use super::normalizer::ProcessingResult;

/// Receives document lifecycle changes. Persistence lives behind this trait.
pub trait StatusSink: Send + Sync {
    fn transition(&self, document_id: Uuid, status: DocumentStatus);

    /// Called once per run with the canonical result.
    fn completed(&self, _result: &ProcessingResult) {}
}

/// Discards everything. Used when no persistence is attached.
pub struct NoopStatus;

impl StatusSink for NoopStatus {
    fn transition(&self, _document_id: Uuid, _status: DocumentStatus) {}
}

/// Writes transitions to the tracing log.
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn transition(&self, document_id: Uuid, status: DocumentStatus) {
        info!(%document_id, status = %status, "Document status changed");
    }

    fn completed(&self, result: &ProcessingResult) {
        match result.error() {
            Some(error) => warn!(
                document_id = %result.document_id(),
                "Document processing failed: {}",
                error
            ),
            None => info!(
                document_id = %result.document_id(),
                validation_status = %result.validation_status(),
                compliance_status = result.compliance_status().unwrap_or("none"),
                "Document processing completed"
            ),
        }
    }
}
