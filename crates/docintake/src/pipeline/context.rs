use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::document::DocumentType;
use crate::sanitize;
use crate::stages::StageInput;

use super::error::PipelineError;
use super::job::DocumentJob;

/// Per-run state shared with every stage. Fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    execution_id: Uuid,
    document_id: Uuid,
    file_path: PathBuf,
    document_type: DocumentType,
    user_id: Uuid,
    filename: String,
}

impl ExecutionContext {
    pub fn new(job: &DocumentJob, file_path: impl Into<PathBuf>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            document_id: job.document_id,
            file_path: file_path.into(),
            document_type: job.document_type,
            user_id: job.user_id,
            filename: job.display_filename().to_string(),
        }
    }

    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Provenance block appended to the first task's description.
    pub fn context_block(&self) -> String {
        let mut block = String::from("Document Processing Context:\n");
        let _ = writeln!(block, "- File Path: {}", self.file_path.display());
        let _ = writeln!(block, "- Document ID: {}", self.document_id);
        let _ = writeln!(block, "- Document Type: {}", self.document_type);
        let _ = writeln!(block, "- User ID: {}", self.user_id);
        let _ = writeln!(block, "- Filename: {}", self.filename);
        let _ = write!(block, "- Execution ID: {}", self.execution_id);
        block
    }

    /// Arguments every stage invocation starts from.
    pub fn stage_input(&self) -> StageInput {
        StageInput::new()
            .with("file_path", self.file_path.to_string_lossy().into_owned())
            .with("document_id", self.document_id.to_string())
            .with("document_type", self.document_type.as_str())
            .with("user_id", self.user_id.to_string())
    }
}

/// The upload materialized on disk for the duration of one run.
///
/// The file is removed when the guard drops, whatever the exit path.
#[derive(Debug)]
pub struct TempDocument {
    path: PathBuf,
}

impl TempDocument {
    /// Writes `content` to `{dir}/{document_id}.{extension}`. Never overwrites.
    pub fn create(
        dir: &Path,
        document_id: Uuid,
        extension: &str,
        content: &[u8],
    ) -> Result<Self, PipelineError> {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::Materialize {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = dir.join(format!("{}.{}", document_id, extension));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    PipelineError::TempFileExists(path.clone())
                } else {
                    PipelineError::Materialize {
                        path: path.clone(),
                        source: e,
                    }
                }
            })?;

        // The guard exists from here on, so a failed write still cleans up.
        let guard = Self { path };
        file.write_all(content)
            .and_then(|_| file.sync_all())
            .map_err(|e| PipelineError::Materialize {
                path: guard.path.clone(),
                source: e,
            })?;

        tracing::debug!(
            file = %sanitize::redact_path(&guard.path),
            bytes = content.len(),
            "Materialized upload"
        );
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDocument {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(
                file = %sanitize::redact_path(&self.path),
                "Removed temporary file"
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                file = %sanitize::redact_path(&self.path),
                "Failed to clean up temp file: {}",
                e
            ),
        }
    }
}
