pub mod context;
pub mod engine;
pub mod error;
pub mod executor;
pub mod graph;
pub mod job;
pub mod normalizer;
pub mod service;
pub mod status;
pub mod toolchain;

pub use context::{ExecutionContext, TempDocument};
pub use engine::{Engine, EngineError, EngineOutput, TaskOutput};
pub use error::{GraphWarning, PipelineError};
pub use executor::Executor;
pub use graph::{BoundAgent, BoundTask, ExecutionLimits, PipelineGraph};
pub use job::DocumentJob;
pub use normalizer::{normalize, ProcessingResult, ValidationStatus};
pub use service::PipelineService;
pub use status::{LogStatus, NoopStatus, StatusSink};
pub use toolchain::ToolChainEngine;
