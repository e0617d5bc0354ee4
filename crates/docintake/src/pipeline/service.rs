use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{self, PipelineDefinition, ServiceSettings};
use crate::document::DocumentStatus;
use crate::error::ConfigError;
use crate::stages::StageRegistry;

use super::engine::Engine;
use super::executor::Executor;
use super::graph::PipelineGraph;
use super::job::DocumentJob;
use super::normalizer::{normalize, ProcessingResult};
use super::status::{NoopStatus, StatusSink};
use super::toolchain::ToolChainEngine;

/// Owns the bound graph and runs documents through it.
///
/// Built once with [`PipelineService::init`]; share it behind an `Arc`.
pub struct PipelineService {
    registry: Arc<StageRegistry>,
    graph: Arc<PipelineGraph>,
    engine: Arc<dyn Engine>,
    executor: Executor,
    settings: ServiceSettings,
    status: Arc<dyn StatusSink>,
}

impl PipelineService {
    pub fn init(
        definition: &PipelineDefinition,
        registry: StageRegistry,
        engine: Arc<dyn Engine>,
        settings: ServiceSettings,
    ) -> Result<Self, ConfigError> {
        let graph = PipelineGraph::build(definition, &registry)?;
        info!(
            tasks = graph.tasks().len(),
            stages = registry.len(),
            "Pipeline service initialized"
        );

        Ok(Self {
            registry: Arc::new(registry),
            graph: Arc::new(graph),
            engine,
            executor: Executor::new(&settings.temp_directory),
            settings,
            status: Arc::new(NoopStatus),
        })
    }

    /// Loads definitions and settings from `config_dir` and wires the
    /// built-in stages to the [`ToolChainEngine`].
    pub fn from_config_dir<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let definition = config::load_pipeline_definition(config_dir)?;
        let settings = config::load_settings(config_dir)?;
        Self::init(
            &definition,
            StageRegistry::with_defaults(),
            Arc::new(ToolChainEngine::new()),
            settings,
        )
    }

    pub fn with_status_sink(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn status_sink(&self) -> &dyn StatusSink {
        self.status.as_ref()
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Runs one document to completion. Blocks the calling thread.
    pub fn process_document(&self, job: &DocumentJob) -> ProcessingResult {
        self.status
            .transition(job.document_id, DocumentStatus::Processing);

        let result = match self
            .executor
            .execute(&self.graph, job, self.engine.as_ref())
        {
            Ok(output) => normalize(&output, job.document_id, job.document_type),
            Err(e) => {
                error!(document_id = %job.document_id, "Error processing document: {}", e);
                ProcessingResult::failed(job.document_id, job.document_type, e)
            }
        };

        let terminal = result.document_status();
        debug_assert!(
            DocumentStatus::Processing.can_transition_to(terminal) && terminal.is_terminal(),
            "run must end in a terminal status"
        );
        self.status.transition(job.document_id, terminal);
        self.status.completed(&result);
        result
    }

    /// Runs [`process_document`](Self::process_document) on tokio's blocking pool.
    pub async fn process_document_async(self: &Arc<Self>, job: DocumentJob) -> ProcessingResult {
        let document_id = job.document_id;
        let document_type = job.document_type;
        match self.spawn(job).await {
            Ok(result) => result,
            Err(e) => {
                error!(%document_id, "Pipeline task did not complete: {}", e);
                ProcessingResult::failed(document_id, document_type, e)
            }
        }
    }

    /// Starts a run in the background. Must be called within a tokio runtime.
    pub fn spawn(self: &Arc<Self>, job: DocumentJob) -> JoinHandle<ProcessingResult> {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.process_document(&job))
    }

    /// Consumes the service. In-flight runs keep their own `Arc` and finish.
    pub fn shutdown(self) {
        info!(
            tasks = self.graph.tasks().len(),
            "Pipeline service shut down"
        );
    }
}

impl std::fmt::Debug for PipelineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineService")
            .field("graph", &self.graph)
            .field("temp_dir", &self.executor.temp_dir())
            .finish()
    }
}
