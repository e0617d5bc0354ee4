//! Loading and binding pipeline definitions from a config directory.

mod common;

use common::{fixture_dir, AgentBuilder, DefinitionBuilder, TaskBuilder, TestHarness};
use docintake::config::{load_pipeline_definition, load_settings, AGENTS_FILE, TASKS_FILE};
use docintake::pipeline::{GraphWarning, PipelineGraph};
use docintake::stages::StageRegistry;
use docintake::ConfigError;

#[test]
fn test_valid_fixture_binds_every_task_in_order() {
    let definition = load_pipeline_definition(fixture_dir("valid")).unwrap();
    assert_eq!(definition.agents.len(), 4);
    assert_eq!(definition.tasks.len(), 4);

    let graph = PipelineGraph::build(&definition, &StageRegistry::with_defaults()).unwrap();
    assert_eq!(
        graph.task_ids(),
        vec![
            "process_document_upload",
            "validate_document",
            "check_compliance",
            "log_audit_trail"
        ]
    );
    assert!(graph.warnings().is_empty());

    let processor = &graph.tasks()[0].agent;
    assert_eq!(processor.stage_names(), vec!["ocr_tool", "image_processing_tool"]);
    assert_eq!(processor.llm().model, "gpt-4o-mini");
    assert_eq!(graph.tasks()[2].context, vec!["process_document_upload"]);
}

#[test]
fn test_partial_fixture_degrades_with_warnings() {
    let definition = load_pipeline_definition(fixture_dir("partial")).unwrap();
    let graph = PipelineGraph::build(&definition, &StageRegistry::with_defaults()).unwrap();

    assert_eq!(
        graph.task_ids(),
        vec!["process_document_upload", "validate_document"]
    );
    assert_eq!(graph.tasks()[0].agent.stage_names(), vec!["ocr_tool"]);
    // The dropped task cannot serve as context.
    assert_eq!(graph.tasks()[1].context, vec!["process_document_upload"]);

    let warnings = graph.warnings();
    assert!(warnings.contains(&GraphWarning::UnknownTool {
        agent_id: "document_processor".into(),
        tool: "handwriting_tool".into(),
    }));
    assert!(warnings.contains(&GraphWarning::UnknownAgent {
        task_id: "notify_employee".into(),
        agent_id: "notification_agent".into(),
    }));
    assert!(warnings.contains(&GraphWarning::UnresolvedContext {
        task_id: "validate_document".into(),
        context_id: "notify_employee".into(),
    }));
    assert!(warnings.contains(&GraphWarning::Unsupported {
        task_id: "validate_document".into(),
        field: "async_execution",
    }));
}

#[test]
fn test_missing_tasks_file_is_fatal() {
    let harness = TestHarness::new();
    std::fs::copy(
        fixture_dir("valid").join(AGENTS_FILE),
        harness.config_dir.join(AGENTS_FILE),
    )
    .unwrap();

    let err = load_pipeline_definition(&harness.config_dir).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSource(_)), "got {:?}", err);
}

#[test]
fn test_missing_config_dir_is_fatal() {
    let harness = TestHarness::new();
    let err = load_pipeline_definition(harness.temp_path().join("absent")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSource(_)));
}

#[test]
fn test_schema_violation_names_the_source() {
    let harness = TestHarness::with_fixture("valid");
    harness.write_config(TASKS_FILE, "tasks:\n  - id: orphan\n");

    let err = load_pipeline_definition(&harness.config_dir).unwrap_err();
    match err {
        ConfigError::SchemaValidation { source_name, errors } => {
            assert!(source_name.ends_with(TASKS_FILE));
            assert!(!errors.is_empty());
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_malformed_yaml_is_fatal() {
    let harness = TestHarness::with_fixture("valid");
    harness.write_config(AGENTS_FILE, "agents: [unterminated\n");

    let err = load_pipeline_definition(&harness.config_dir).unwrap_err();
    assert!(matches!(err, ConfigError::ParseYaml { .. }), "got {:?}", err);
}

#[test]
fn test_all_tasks_unbound_is_fatal() {
    let definition = DefinitionBuilder::new()
        .agent(AgentBuilder::new("extractor").tool("ocr_tool"))
        .task(TaskBuilder::new("orphan", "missing_agent"))
        .build();

    let err = PipelineGraph::build(&definition, &StageRegistry::with_defaults()).unwrap_err();
    assert!(matches!(err, ConfigError::NoTasks));
}

#[test]
fn test_duplicate_task_id_is_fatal() {
    let definition = DefinitionBuilder::new()
        .agent(AgentBuilder::new("extractor").tool("ocr_tool"))
        .task(TaskBuilder::new("extract", "extractor"))
        .task(TaskBuilder::new("extract", "extractor"))
        .build();

    let err = PipelineGraph::build(&definition, &StageRegistry::with_defaults()).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateId { kind: "task", .. }), "got {:?}", err);
}

#[test]
fn test_settings_written_by_harness_are_loaded() {
    let harness = TestHarness::new();
    let settings = load_settings(&harness.config_dir).unwrap();
    assert_eq!(settings.upload_directory, harness.upload_dir);
    assert_eq!(settings.temp_directory, harness.work_dir);
}
