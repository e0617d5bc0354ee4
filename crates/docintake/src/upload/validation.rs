//! Upload gatekeeper. Checks run in a fixed order and the first failure wins.

use std::io::{Seek, SeekFrom};

use uuid::Uuid;

use crate::document::DocumentType;

use super::outcome::UploadFailure;

/// Largest accepted upload: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A request that passed every gatekeeper check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub document_type: DocumentType,
    pub user_id: Uuid,
    pub size: u64,
}

/// Validates an upload before anything else touches it.
///
/// On success the reader is rewound to position 0 so downstream consumers see
/// the whole content.
pub fn validate<R>(
    file: Option<&mut R>,
    document_type: &str,
    user_id: &str,
) -> Result<ValidatedUpload, UploadFailure>
where
    R: Seek + ?Sized,
{
    let file = file.ok_or_else(|| UploadFailure::bad_request("No file provided"))?;

    let size = probe_size(file).map_err(|_| UploadFailure::bad_request("Invalid file object"))?;

    if size == 0 {
        return Err(UploadFailure::bad_request("File is empty"));
    }

    if size > MAX_FILE_SIZE {
        let size_mb = size as f64 / (1024.0 * 1024.0);
        return Err(UploadFailure::bad_request(format!(
            "File size ({:.2}MB) exceeds maximum (10MB)",
            size_mb
        )));
    }

    let document_type = DocumentType::parse(document_type).ok_or_else(|| {
        UploadFailure::bad_request(format!(
            "Invalid document type. Valid types: {}",
            DocumentType::valid_list()
        ))
    })?;

    if user_id.is_empty() {
        return Err(UploadFailure::bad_request("User ID is required"));
    }
    let user_id =
        Uuid::parse_str(user_id).map_err(|_| UploadFailure::bad_request("Invalid user ID format"))?;

    Ok(ValidatedUpload {
        document_type,
        user_id,
        size,
    })
}

fn probe_size<R: Seek + ?Sized>(file: &mut R) -> std::io::Result<u64> {
    let size = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;
    Ok(size)
}
