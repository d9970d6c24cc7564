//! Scripted collaborators for command tests

use async_trait::async_trait;
use orchestra_client::{ClientError, PipelineApi, Result};
use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::domain::run::{RunHandle, RunStatus};
use orchestra_core::domain::validation::ValidationResult;
use orchestra_core::dto::pipeline::{ImportPipeline, PipelineCreated, UpsertPipeline};
use orchestra_core::dto::run::StartRun;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use crate::git::{CommandExecutor, CommandOutput};

/// Answers git queries from a fixed table keyed by argument list
///
/// Unscripted queries fail with exit code 1.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: HashMap<Vec<String>, CommandOutput>,
    unavailable: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every spawn fails as if git were not installed
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn ok(self, args: &[&str], stdout: &str) -> Self {
        self.respond(args, Some(0), stdout)
    }

    pub fn fail(self, args: &[&str], code: i32) -> Self {
        self.respond(args, Some(code), "")
    }

    fn respond(mut self, args: &[&str], code: Option<i32>, stdout: &str) -> Self {
        self.responses.insert(
            args.iter().map(|arg| arg.to_string()).collect(),
            CommandOutput {
                code,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> io::Result<CommandOutput> {
        assert_eq!(program, "git");
        if self.unavailable {
            return Err(io::Error::new(io::ErrorKind::NotFound, "git: command not found"));
        }

        let key: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.calls.lock().unwrap().push(key.clone());

        Ok(self.responses.get(&key).cloned().unwrap_or(CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "unscripted".to_string(),
        }))
    }
}

/// In-memory API that records which operations were called
pub struct FakeApi {
    validation: Mutex<Option<Result<ValidationResult>>>,
    import: Mutex<Option<Result<PipelineCreated>>>,
    upsert: Mutex<Option<Result<PipelineCreated>>>,
    start: Mutex<Option<Result<RunHandle>>>,
    statuses: Mutex<VecDeque<Result<RunStatus>>>,
    calls: Mutex<Vec<&'static str>>,
    imported: Mutex<Vec<ImportPipeline>>,
    upserted: Mutex<Vec<UpsertPipeline>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            validation: Mutex::new(None),
            import: Mutex::new(None),
            upsert: Mutex::new(None),
            start: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            imported: Mutex::new(Vec::new()),
            upserted: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(self, result: Result<ValidationResult>) -> Self {
        *self.validation.lock().unwrap() = Some(result);
        self
    }

    pub fn with_import(self, result: Result<PipelineCreated>) -> Self {
        *self.import.lock().unwrap() = Some(result);
        self
    }

    pub fn with_upsert(self, result: Result<PipelineCreated>) -> Self {
        *self.upsert.lock().unwrap() = Some(result);
        self
    }

    pub fn with_start(self, result: Result<RunHandle>) -> Self {
        *self.start.lock().unwrap() = Some(result);
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<RunStatus>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| **call == name).count()
    }

    pub fn imported(&self) -> Vec<ImportPipeline> {
        self.imported.lock().unwrap().clone()
    }

    pub fn upserted(&self) -> Vec<UpsertPipeline> {
        self.upserted.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

/// A created-pipeline body carrying `id`
pub fn created(id: &str) -> PipelineCreated {
    PipelineCreated {
        pipeline_id: None,
        id: Some(id.to_string()),
    }
}

#[async_trait]
impl PipelineApi for FakeApi {
    async fn validate_schema(&self, _document: &JsonValue) -> Result<ValidationResult> {
        self.record("validate_schema");
        self.validation
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(ValidationResult::valid()))
    }

    async fn import_pipeline(&self, req: &ImportPipeline) -> Result<PipelineCreated> {
        self.record("import_pipeline");
        self.imported.lock().unwrap().push(req.clone());
        self.import
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(created("abc-123")))
    }

    async fn create_pipeline(&self, req: &UpsertPipeline) -> Result<PipelineCreated> {
        self.record("create_pipeline");
        self.upserted.lock().unwrap().push(req.clone());
        self.upsert
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(created("p-1")))
    }

    async fn update_pipeline(
        &self,
        _alias: &PipelineAlias,
        req: &UpsertPipeline,
    ) -> Result<PipelineCreated> {
        self.record("update_pipeline");
        self.upserted.lock().unwrap().push(req.clone());
        self.upsert
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(created("p-1")))
    }

    async fn start_run(&self, _alias: &PipelineAlias, _req: &StartRun) -> Result<RunHandle> {
        self.record("start_run");
        self.start
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(RunHandle::new("run-1")))
    }

    async fn get_run_status(&self, _handle: &RunHandle) -> Result<RunStatus> {
        self.record("get_run_status");
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::ParseError("status script exhausted".to_string())))
    }
}
