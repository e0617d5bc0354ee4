pub mod outcome;
pub mod service;
pub mod validation;

pub use outcome::{UploadFailure, UploadOutcome, UploadSuccess};
pub use service::{
    DirectUploadClient, DocumentUploadService, UploadClient, UploadRequest, UploadSource,
    ValidatedRequest,
};
pub use validation::{validate, ValidatedUpload, MAX_FILE_SIZE};
