use serde::Serialize;
use uuid::Uuid;

/// Successful upload: the document has an id and entered the `uploaded` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSuccess {
    document_id: Uuid,
    status: String,
    message: String,
}

impl UploadSuccess {
    /// Builds a success for a freshly generated document id.
    pub fn uploaded() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub(crate) fn with_id(document_id: Uuid) -> Self {
        Self {
            document_id,
            status: crate::document::DocumentStatus::Uploaded.to_string(),
            message: "Document uploaded successfully".to_string(),
        }
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Rejected or failed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    error_code: u16,
    error_message: String,
}

impl UploadFailure {
    pub fn new(error_code: u16, error_message: impl Into<String>) -> Self {
        Self {
            error_code,
            error_message: error_message.into(),
        }
    }

    /// 400: the request was rejected by validation.
    pub fn bad_request(error_message: impl Into<String>) -> Self {
        Self::new(400, error_message)
    }

    /// 500: the request was valid but could not be handled.
    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self::new(500, format!("Internal error: {}", error))
    }

    pub fn error_code(&self) -> u16 {
        self.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// Result of validating and triggering an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UploadOutcome {
    Success(UploadSuccess),
    Failure(UploadFailure),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn document_id(&self) -> Option<Uuid> {
        match self {
            Self::Success(s) => Some(s.document_id()),
            Self::Failure(_) => None,
        }
    }
}

impl From<UploadSuccess> for UploadOutcome {
    fn from(value: UploadSuccess) -> Self {
        Self::Success(value)
    }
}

impl From<UploadFailure> for UploadOutcome {
    fn from(value: UploadFailure) -> Self {
        Self::Failure(value)
    }
}
