use uuid::Uuid;

use crate::document::DocumentType;
use crate::upload::service::extension_of;

/// A validated upload queued for one pipeline run.
#[derive(Debug, Clone)]
pub struct DocumentJob {
    pub document_id: Uuid,
    pub document_type: DocumentType,
    pub user_id: Uuid,
    /// Original client-side name; only its extension is used.
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

impl DocumentJob {
    pub fn new(document_type: DocumentType, user_id: Uuid, content: Vec<u8>) -> Self {
        Self {
            document_id: Uuid::new_v4(),
            document_type,
            user_id,
            filename: None,
            content,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_document_id(mut self, document_id: Uuid) -> Self {
        self.document_id = document_id;
        self
    }

    /// Extension for the materialized copy, without the dot.
    pub fn extension(&self) -> String {
        extension_of(self.filename.as_deref())
    }

    /// Name shown in provenance blocks when the client sent none.
    pub fn display_filename(&self) -> &str {
        self.filename.as_deref().unwrap_or("document")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_defaults_to_jpg() {
        let job = DocumentJob::new(DocumentType::W4, Uuid::new_v4(), vec![1]);
        assert_eq!(job.extension(), "jpg");
        assert_eq!(job.display_filename(), "document");

        let job = job.with_filename("Scan.PDF");
        assert_eq!(job.extension(), "pdf");
        assert_eq!(job.display_filename(), "Scan.PDF");
    }
}
