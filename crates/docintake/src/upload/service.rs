use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::document::{DocumentStatus, DocumentType};
use crate::pipeline::{DocumentJob, PipelineService, ProcessingResult};
use crate::sanitize;
use crate::storage::{DocumentStorage, LocalStorage};

use super::outcome::{UploadFailure, UploadOutcome, UploadSuccess};
use super::validation::validate;

/// Extension used when the uploaded file carries no usable name.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Any seekable byte source can be uploaded.
pub trait UploadSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> UploadSource for T {}

/// One inbound upload, as received from the transport layer.
pub struct UploadRequest {
    pub file: Option<Box<dyn UploadSource>>,
    /// Original client-side file name, used only for its extension.
    pub filename: Option<String>,
    pub document_type: String,
    pub user_id: String,
}

impl UploadRequest {
    pub fn new(
        file: Option<Box<dyn UploadSource>>,
        document_type: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            file,
            filename: None,
            document_type: document_type.into(),
            user_id: user_id.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// An upload that passed the gatekeeper. The reader is positioned at 0.
pub struct ValidatedRequest {
    pub file: Box<dyn UploadSource>,
    pub filename: Option<String>,
    pub document_type: DocumentType,
    pub user_id: Uuid,
}

/// Handles an upload once it has been validated.
#[async_trait]
pub trait UploadClient: Send + Sync {
    async fn document_upload_request(&self, request: ValidatedRequest) -> UploadOutcome;
}

/// Front door for uploads: validates, then delegates to an [`UploadClient`].
pub struct DocumentUploadService<C> {
    client: C,
}

impl<C: UploadClient> DocumentUploadService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn upload_document(&self, mut request: UploadRequest) -> UploadOutcome {
        let validated = match validate(
            request.file.as_deref_mut(),
            &request.document_type,
            &request.user_id,
        ) {
            Ok(validated) => validated,
            Err(failure) => {
                warn!(
                    error_code = failure.error_code(),
                    "Upload rejected: {}",
                    failure.error_message()
                );
                return failure.into();
            }
        };

        let Some(file) = request.file else {
            return UploadFailure::bad_request("No file provided").into();
        };

        self.client
            .document_upload_request(ValidatedRequest {
                file,
                filename: request.filename,
                document_type: validated.document_type,
                user_id: validated.user_id,
            })
            .await
    }
}

/// In-process client: assigns the document id, stores the bytes and hands
/// the document to the pipeline in the background.
#[derive(Default)]
pub struct DirectUploadClient {
    storage: Option<Arc<dyn DocumentStorage>>,
    pipeline: Option<Arc<PipelineService>>,
}

impl DirectUploadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client that stores uploads under the pipeline's configured upload
    /// directory and processes them with that pipeline.
    pub fn for_pipeline(pipeline: Arc<PipelineService>) -> Self {
        let storage = LocalStorage::new(&pipeline.settings().upload_directory);
        Self::new()
            .with_storage(Arc::new(storage))
            .with_pipeline(pipeline)
    }

    pub fn with_storage(mut self, storage: Arc<dyn DocumentStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_pipeline(mut self, pipeline: Arc<PipelineService>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    fn store(&self, content: &[u8], stored_name: &str, user_id: Uuid) {
        let Some(storage) = &self.storage else {
            return;
        };
        match storage.save(content, stored_name, &user_id.to_string()) {
            Ok(location) => info!("Document saved to storage: {}", location),
            // Storage is best effort; the upload still succeeds.
            Err(e) => error!("Failed to save document to storage: {}", e),
        }
    }
}

#[async_trait]
impl UploadClient for DirectUploadClient {
    async fn document_upload_request(&self, mut request: ValidatedRequest) -> UploadOutcome {
        let document_id = Uuid::new_v4();

        let mut content = Vec::new();
        if let Err(e) = request.file.read_to_end(&mut content) {
            error!(%document_id, "Failed to read uploaded document: {}", e);
            return UploadFailure::internal(e).into();
        }

        let extension = extension_of(request.filename.as_deref());
        self.store(&content, &format!("{}.{}", document_id, extension), request.user_id);

        if let Some(pipeline) = &self.pipeline {
            pipeline
                .status_sink()
                .transition(document_id, DocumentStatus::Uploaded);
            let job = DocumentJob {
                document_id,
                document_type: request.document_type,
                user_id: request.user_id,
                filename: request.filename.clone(),
                content,
            };
            // The result surfaces through the status sink.
            tokio::spawn(await_run(document_id, pipeline.spawn(job)));
        }

        info!(
            %document_id,
            document_type = %request.document_type,
            user = %sanitize::redact_user_id(&request.user_id),
            "Document upload accepted"
        );
        UploadSuccess::with_id(document_id).into()
    }
}

/// Waits for a background run, logging it if the task itself died.
async fn await_run(
    document_id: Uuid,
    handle: JoinHandle<ProcessingResult>,
) -> Option<ProcessingResult> {
    match handle.await {
        Ok(result) => Some(result),
        Err(e) => {
            error!(%document_id, "Pipeline task did not complete: {}", e);
            None
        }
    }
}

/// Lowercase extension of `filename` without the dot, or [`DEFAULT_EXTENSION`].
pub fn extension_of(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
