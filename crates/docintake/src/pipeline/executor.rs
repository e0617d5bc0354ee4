use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span};

use crate::sanitize;

use super::context::{ExecutionContext, TempDocument};
use super::engine::{Engine, EngineOutput};
use super::error::PipelineError;
use super::graph::PipelineGraph;
use super::job::DocumentJob;

/// Runs a bound graph once per document.
#[derive(Debug, Clone)]
pub struct Executor {
    temp_dir: PathBuf,
}

impl Executor {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Materializes the upload, invokes `engine` exactly once with the full
    /// task list and removes the temporary file on every exit path.
    pub fn execute(
        &self,
        graph: &PipelineGraph,
        job: &DocumentJob,
        engine: &dyn Engine,
    ) -> Result<EngineOutput, PipelineError> {
        let temp = TempDocument::create(
            &self.temp_dir,
            job.document_id,
            &job.extension(),
            &job.content,
        )?;
        let ctx = ExecutionContext::new(job, temp.path());

        let _span = info_span!("pipeline",
            document_id = %ctx.document_id(),
            execution_id = %ctx.execution_id(),
            document_type = %ctx.document_type(),
            file = %sanitize::redact_path(temp.path()),
        )
        .entered();

        let tasks = graph.prepare(&ctx);
        debug!(tasks = tasks.len(), "Invoking engine");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.run(&tasks, &ctx)));

        match outcome {
            Ok(Ok(output)) => {
                info!("Engine run completed");
                Ok(output)
            }
            Ok(Err(e)) => {
                error!("Engine run failed: {}", e);
                Err(PipelineError::Engine(e))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Engine panicked: {}", message);
                Err(PipelineError::EnginePanicked(message))
            }
        }
        // `temp` drops here and removes the materialized file.
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
