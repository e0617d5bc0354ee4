//! Uploads through the gatekeeper, storage and the background pipeline.

mod common;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use common::{png_bytes, RecordingStatus, TestHarness};
use docintake::upload::{UploadFailure, MAX_FILE_SIZE};
use docintake::{
    DirectUploadClient, DocumentStatus, DocumentUploadService, LocalStorage, ProcessingResult,
    UploadOutcome, UploadRequest,
};

fn request(content: Vec<u8>, document_type: &str, user_id: &str) -> UploadRequest {
    UploadRequest::new(Some(Box::new(Cursor::new(content))), document_type, user_id)
}

fn failure(outcome: UploadOutcome) -> UploadFailure {
    match outcome {
        UploadOutcome::Failure(f) => f,
        UploadOutcome::Success(s) => panic!("expected failure, got {:?}", s),
    }
}

/// Upload service wired to local storage only.
fn storage_only(harness: &TestHarness) -> DocumentUploadService<DirectUploadClient> {
    let storage = Arc::new(LocalStorage::new(&harness.upload_dir));
    DocumentUploadService::new(DirectUploadClient::new().with_storage(storage))
}

async fn wait_for_results(status: &RecordingStatus, count: usize) -> Vec<ProcessingResult> {
    for _ in 0..200 {
        let results = status.results();
        if results.len() >= count {
            return results;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("pipeline did not finish in time");
}

#[tokio::test]
async fn test_upload_stores_and_processes_document() {
    let harness = TestHarness::with_fixture("valid");
    let status = RecordingStatus::new();
    let pipeline = Arc::new(harness.service().with_status_sink(status.clone()));
    // Storage comes from the uploadDirectory in the harness settings.
    let service = DocumentUploadService::new(DirectUploadClient::for_pipeline(pipeline));
    let user_id = Uuid::new_v4();

    let outcome = service
        .upload_document(
            request(png_bytes(4, 4), "i9", &user_id.to_string()).with_filename("form.png"),
        )
        .await;

    assert!(outcome.is_success());
    let document_id = outcome.document_id().unwrap();
    assert_eq!(
        harness.stored_files(user_id),
        vec![harness
            .upload_dir
            .join(user_id.to_string())
            .join(format!("{}.png", document_id))]
    );

    let results = wait_for_results(&status, 1).await;
    assert_eq!(results[0].document_id(), document_id);
    assert!(results[0].error().is_none());
    let statuses = status.statuses_for(document_id);
    assert_eq!(
        statuses,
        vec![
            DocumentStatus::Uploaded,
            DocumentStatus::Processing,
            DocumentStatus::Verified
        ]
    );
    assert!(statuses.windows(2).all(|w| w[0].can_transition_to(w[1])));
    assert!(statuses.last().unwrap().is_terminal());
    assert!(harness.work_files().is_empty());
}

#[tokio::test]
async fn test_success_serializes_to_wire_shape() {
    let harness = TestHarness::new();
    let outcome = storage_only(&harness)
        .upload_document(request(b"scan".to_vec(), "W4", &Uuid::new_v4().to_string()))
        .await;

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["status"], "uploaded");
    assert_eq!(value["message"], "Document uploaded successfully");
    let id = value["document_id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_missing_filename_defaults_to_jpg() {
    let harness = TestHarness::new();
    let user_id = Uuid::new_v4();
    let outcome = storage_only(&harness)
        .upload_document(request(b"scan".to_vec(), "ID", &user_id.to_string()))
        .await;

    let document_id = outcome.document_id().unwrap();
    let stored = harness.stored_files(user_id);
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with(format!("{}.jpg", document_id)));
    assert_eq!(std::fs::read(&stored[0]).unwrap(), b"scan");
}

#[tokio::test]
async fn test_invalid_user_id_is_rejected() {
    let harness = TestHarness::new();
    let outcome = storage_only(&harness)
        .upload_document(request(b"scan".to_vec(), "I9", "not-a-valid-uuid"))
        .await;

    let failure = failure(outcome);
    assert_eq!(failure.error_code(), 400);
    assert_eq!(failure.error_message(), "Invalid user ID format");
    assert!(!harness.upload_dir.exists());

    let value = serde_json::to_value(UploadOutcome::Failure(failure)).unwrap();
    assert_eq!(value["error_code"], 400);
    assert_eq!(value["error_message"], "Invalid user ID format");
}

#[tokio::test]
async fn test_invalid_document_type_lists_valid_types() {
    let harness = TestHarness::new();
    let outcome = storage_only(&harness)
        .upload_document(request(b"scan".to_vec(), "RESUME", &Uuid::new_v4().to_string()))
        .await;

    assert_eq!(
        failure(outcome).error_message(),
        "Invalid document type. Valid types: I9, W4, ID, PASSPORT, DRIVERSLICENSE, SOCIALSECURITYCARD"
    );
}

#[tokio::test]
async fn test_size_limit_is_inclusive() {
    let harness = TestHarness::new();
    let service = storage_only(&harness);
    let user_id = Uuid::new_v4().to_string();

    let at_limit = service
        .upload_document(request(vec![0u8; MAX_FILE_SIZE as usize], "I9", &user_id))
        .await;
    assert!(at_limit.is_success());

    let over_limit = service
        .upload_document(request(
            vec![0u8; MAX_FILE_SIZE as usize + 1],
            "I9",
            &user_id,
        ))
        .await;
    let failure = failure(over_limit);
    assert_eq!(failure.error_code(), 400);
    assert_eq!(
        failure.error_message(),
        "File size (10.00MB) exceeds maximum (10MB)"
    );
}

#[tokio::test]
async fn test_empty_and_missing_files_are_rejected() {
    let harness = TestHarness::new();
    let service = storage_only(&harness);
    let user_id = Uuid::new_v4().to_string();

    let empty = service
        .upload_document(request(Vec::new(), "I9", &user_id))
        .await;
    assert_eq!(failure(empty).error_message(), "File is empty");

    let missing = service
        .upload_document(UploadRequest::new(None, "I9", user_id))
        .await;
    assert_eq!(failure(missing).error_message(), "No file provided");
}
