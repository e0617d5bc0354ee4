//! Isolated environment for integration tests.
//!
//! Every `TestHarness` owns a temporary directory with separate config,
//! upload and work (materialization) subdirectories, so tests never share
//! files with each other.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use uuid::Uuid;

use docintake::config::{ServiceSettings, AGENTS_FILE, SETTINGS_FILE, TASKS_FILE};
use docintake::pipeline::{Engine, PipelineService, ProcessingResult, StatusSink};
use docintake::stages::StageRegistry;
use docintake::{DocumentStatus, PipelineDefinition};

/// Status sink that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingStatus {
    transitions: Mutex<Vec<(Uuid, DocumentStatus)>>,
    results: Mutex<Vec<ProcessingResult>>,
}

impl RecordingStatus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn transitions(&self) -> Vec<(Uuid, DocumentStatus)> {
        self.transitions.lock().unwrap().clone()
    }

    /// Statuses seen for one document, in order.
    pub fn statuses_for(&self, document_id: Uuid) -> Vec<DocumentStatus> {
        self.transitions()
            .into_iter()
            .filter(|(id, _)| *id == document_id)
            .map(|(_, status)| status)
            .collect()
    }

    pub fn results(&self) -> Vec<ProcessingResult> {
        self.results.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingStatus {
    fn transition(&self, document_id: Uuid, status: DocumentStatus) {
        self.transitions.lock().unwrap().push((document_id, status));
    }

    fn completed(&self, result: &ProcessingResult) {
        self.results.lock().unwrap().push(result.clone());
    }
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub work_dir: PathBuf,
}

impl TestHarness {
    /// Empty config directory with a `settings.yaml` pointing into the harness.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let config_dir = base.join("config");
        let upload_dir = base.join("uploads");
        let work_dir = base.join("work");

        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        std::fs::create_dir_all(&work_dir).expect("Failed to create work dir");

        let harness = Self {
            temp_dir,
            config_dir,
            upload_dir,
            work_dir,
        };
        harness.write_settings();
        harness
    }

    /// Harness whose config directory holds the named fixture pipeline.
    pub fn with_fixture(name: &str) -> Self {
        let harness = Self::new();
        let source = fixture_dir(name);
        for file in [AGENTS_FILE, TASKS_FILE] {
            std::fs::copy(source.join(file), harness.config_dir.join(file))
                .unwrap_or_else(|e| panic!("Failed to copy fixture {}/{}: {}", name, file, e));
        }
        harness
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            upload_directory: self.upload_dir.clone(),
            temp_directory: self.work_dir.clone(),
            ..ServiceSettings::default()
        }
    }

    fn write_settings(&self) {
        let yaml = format!(
            "uploadDirectory: {}\ntempDirectory: {}\n",
            self.upload_dir.display(),
            self.work_dir.display()
        );
        self.write_config(SETTINGS_FILE, &yaml);
    }

    pub fn write_config(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.config_dir.join(filename);
        std::fs::write(&path, content).expect("Failed to write config file");
        path
    }

    /// Service built from the config directory with the default engine.
    pub fn service(&self) -> PipelineService {
        PipelineService::from_config_dir(&self.config_dir).expect("Failed to init service")
    }

    pub fn service_with_engine(
        &self,
        definition: &PipelineDefinition,
        engine: Arc<dyn Engine>,
    ) -> PipelineService {
        PipelineService::init(
            definition,
            StageRegistry::with_defaults(),
            engine,
            self.settings(),
        )
        .expect("Failed to init service")
    }

    /// Files currently left in the materialization directory.
    pub fn work_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.work_dir)
            .expect("Failed to read work dir")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect()
    }

    /// Files stored for `user_id` under the upload directory.
    pub fn stored_files(&self, user_id: Uuid) -> Vec<PathBuf> {
        let dir = self.upload_dir.join(user_id.to_string());
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.filter_map(|e| e.ok().map(|e| e.path())).collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("pipeline")
        .join(name)
}

/// A small encoded RGB PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes
}
