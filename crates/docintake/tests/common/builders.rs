//! Builders for pipeline definitions and jobs.

#![allow(dead_code)]

use uuid::Uuid;

use docintake::config::{AgentDefinition, LlmConfig, PipelineDefinition, TaskDefinition};
use docintake::pipeline::DocumentJob;
use docintake::DocumentType;

pub struct AgentBuilder {
    agent: AgentDefinition,
}

impl AgentBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            agent: AgentDefinition {
                id: id.to_string(),
                role: format!("{} role", id),
                goal: format!("{} goal", id),
                backstory: String::new(),
                llm: LlmConfig::default(),
                tools: Vec::new(),
                allow_delegation: false,
                verbose: false,
                max_iter: 12,
                max_execution_time: 300,
                respect_context_window: true,
                max_retry_limit: 2,
                memory: false,
            },
        }
    }

    pub fn tool(mut self, name: &str) -> Self {
        self.agent.tools.push(name.to_string());
        self
    }

    pub fn max_iter(mut self, max_iter: u32) -> Self {
        self.agent.max_iter = max_iter;
        self
    }

    pub fn max_retry_limit(mut self, limit: u32) -> Self {
        self.agent.max_retry_limit = limit;
        self
    }

    pub fn build(self) -> AgentDefinition {
        self.agent
    }
}

pub struct TaskBuilder {
    task: TaskDefinition,
}

impl TaskBuilder {
    pub fn new(id: &str, agent_id: &str) -> Self {
        Self {
            task: TaskDefinition {
                id: id.to_string(),
                description: format!("Run {}", id),
                expected_output: String::new(),
                agent_id: agent_id.to_string(),
                context: Vec::new(),
                output_file: None,
                human_input: false,
                async_execution: false,
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.task.description = description.to_string();
        self
    }

    pub fn context(mut self, task_id: &str) -> Self {
        self.task.context.push(task_id.to_string());
        self
    }

    pub fn build(self) -> TaskDefinition {
        self.task
    }
}

#[derive(Default)]
pub struct DefinitionBuilder {
    definition: PipelineDefinition,
}

impl DefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(mut self, agent: AgentBuilder) -> Self {
        self.definition.agents.push(agent.build());
        self
    }

    pub fn task(mut self, task: TaskBuilder) -> Self {
        self.definition.tasks.push(task.build());
        self
    }

    pub fn build(self) -> PipelineDefinition {
        self.definition
    }

    /// One agent with the extraction stage and one task bound to it.
    pub fn single_task() -> PipelineDefinition {
        Self::new()
            .agent(AgentBuilder::new("extractor").tool("ocr_tool"))
            .task(TaskBuilder::new("extract", "extractor"))
            .build()
    }
}

pub struct JobBuilder {
    document_type: DocumentType,
    user_id: Uuid,
    filename: Option<String>,
    content: Vec<u8>,
}

impl JobBuilder {
    pub fn new() -> Self {
        Self {
            document_type: DocumentType::I9,
            user_id: Uuid::new_v4(),
            filename: Some("document.txt".to_string()),
            content: b"Employment Eligibility Verification".to_vec(),
        }
    }

    pub fn document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn filename(mut self, filename: Option<&str>) -> Self {
        self.filename = filename.map(str::to_string);
        self
    }

    pub fn content(mut self, content: &[u8]) -> Self {
        self.content = content.to_vec();
        self
    }

    pub fn build(self) -> DocumentJob {
        let job = DocumentJob::new(self.document_type, self.user_id, self.content);
        match self.filename {
            Some(name) => job.with_filename(name),
            None => job,
        }
    }
}
