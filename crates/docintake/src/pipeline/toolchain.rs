//! Deterministic in-process engine.
//!
//! Each task invokes its agent's stages in order. A task reads the outputs
//! of its declared context tasks, or of every earlier task when it declares
//! none. Stage verdicts are surfaced as `validation_status`,
//! `compliance_status` and `compliance_data` on the task output.

use std::path::Path;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, info_span, warn};

use crate::stages::{Stage, StageInput, StageKind, StagePayload, StageResult};

use super::context::ExecutionContext;
use super::engine::{Engine, EngineError, EngineOutput, TaskOutput};
use super::graph::BoundTask;

#[derive(Debug, Clone, Copy, Default)]
pub struct ToolChainEngine;

impl ToolChainEngine {
    pub fn new() -> Self {
        Self
    }

    fn run_task(&self, task: &BoundTask, mut input: StageInput) -> Map<String, Value> {
        let limits = task.agent.limits();
        // A limit too large to represent as an instant means no deadline.
        let deadline = Instant::now().checked_add(limits.max_execution_time);
        let mut invocations = 0u32;
        let mut output = Map::new();

        'stages: for stage in task.agent.stages() {
            let mut retries = 0u32;
            let result = loop {
                if invocations >= limits.max_iter {
                    warn!(max_iter = limits.max_iter, "Iteration limit reached, stopping task");
                    output.insert("stopped".into(), Value::String("max_iter".into()));
                    break 'stages;
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    warn!(
                        seconds = limits.max_execution_time.as_secs(),
                        "Execution time limit reached, stopping task"
                    );
                    output.insert("stopped".into(), Value::String("max_execution_time".into()));
                    break 'stages;
                }

                invocations += 1;
                let result = stage.invoke(&input);
                if result.is_error() && retries < limits.max_retry_limit {
                    retries += 1;
                    debug!(stage = stage.name(), retries, "Stage failed, retrying");
                    continue;
                }
                break result;
            };

            surface_verdict(stage.as_ref(), &result, &mut output, &mut input);
            output.insert(result.stage.clone(), result.payload_value());
        }

        output
    }
}

impl Engine for ToolChainEngine {
    fn run(
        &self,
        tasks: &[BoundTask],
        ctx: &ExecutionContext,
    ) -> Result<EngineOutput, EngineError> {
        let mut completed: Vec<(&str, Map<String, Value>)> = Vec::with_capacity(tasks.len());

        for task in tasks {
            let _span = info_span!("task", task_id = %task.id, agent = %task.agent.id()).entered();

            let upstream = upstream_data(task, &completed);
            let mut input = ctx.stage_input();
            input.insert("action", task.id.clone());
            input.insert("details", task.expected_output.clone());
            input.insert("extracted_data", Value::Object(upstream.clone()));
            input.insert("document_data", Value::Object(upstream));

            let output = self.run_task(task, input);
            if let Some(path) = &task.output_file {
                write_output_file(path, &output);
            }
            completed.push((task.id.as_str(), output));
        }

        Ok(EngineOutput::TaskOutputs(
            completed
                .into_iter()
                .map(|(_, output)| TaskOutput::Mapping(output))
                .collect(),
        ))
    }
}

/// Merged outputs of the tasks `task` depends on, in execution order.
fn upstream_data(task: &BoundTask, completed: &[(&str, Map<String, Value>)]) -> Map<String, Value> {
    let mut merged = Map::new();
    for (id, output) in completed {
        if task.context.is_empty() || task.context.iter().any(|c| c == id) {
            for (key, value) in output {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

fn surface_verdict(
    stage: &dyn Stage,
    result: &StageResult,
    output: &mut Map<String, Value>,
    input: &mut StageInput,
) {
    match stage.kind() {
        StageKind::Extraction => {
            let text = match &result.payload {
                StagePayload::Text(text) => Some(Value::String(text.clone())),
                StagePayload::Mapping(map) => map.get("raw_text").cloned(),
                StagePayload::Error(_) => None,
            };
            if let Some(text) = text {
                output.insert("raw_text".into(), text.clone());
                // Later stages of the same task see the fresh text.
                let mut data = match input.get("extracted_data") {
                    Some(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                data.insert("raw_text".into(), text);
                input.insert("extracted_data", Value::Object(data));
            }
        }
        StageKind::Validation => {
            output.insert(
                "validation_status".into(),
                Value::String(result.status.clone()),
            );
        }
        StageKind::Compliance => {
            output.insert(
                "compliance_status".into(),
                Value::String(result.status.clone()),
            );
            output.insert("compliance_data".into(), result.payload_value());
        }
        StageKind::ImageProcessing | StageKind::Audit | StageKind::Sync => {}
    }
}

fn write_output_file(path: &Path, output: &Map<String, Value>) {
    let written = serde_json::to_string_pretty(output)
        .map_err(std::io::Error::other)
        .and_then(|json| {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)
        });
    if let Err(e) = written {
        warn!("Failed to write task output to {}: {}", path.display(), e);
    }
}
