//! Onboarding document intake.
//!
//! Uploads pass the [`upload`] gatekeeper, are stored, and then run through a
//! configurable sequence of [`stages`] bound by the [`pipeline`]. Whatever
//! the engine returns is normalized into a [`pipeline::ProcessingResult`].

pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod sanitize;
pub mod stages;
pub mod storage;
pub mod telemetry;
pub mod upload;

pub use config::{load_pipeline_definition, load_settings, PipelineDefinition, ServiceSettings};
pub use document::{DocumentStatus, DocumentType};
pub use error::{ConfigError, DocintakeError, Result, StorageError};
pub use pipeline::{
    DocumentJob, Engine, EngineOutput, PipelineGraph, PipelineService, ProcessingResult,
    StatusSink, ToolChainEngine, ValidationStatus,
};
pub use stages::{Stage, StageRegistry};
pub use storage::{DocumentStorage, LocalStorage};
pub use upload::{DirectUploadClient, DocumentUploadService, UploadOutcome, UploadRequest};
