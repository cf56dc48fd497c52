//! Recording engine for testing.
//!
//! Captures every engine call instead of running Terraform, so the dump
//! pipeline can be exercised without the binary installed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tfdump_common::error::{Result, TfdumpError};
use tfdump_compose::backend::InitOption;

use super::{EngineFactory, TerraformEngine};

/// A captured engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    /// An engine was created for a working directory.
    Create(PathBuf),
    /// `init` with its options.
    Init(Vec<InitOption>),
    /// `workspace select` with the workspace name.
    WorkspaceSelect(String),
}

/// Factory and engine that record calls into a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    fail_on: Option<&'static str>,
    working_dir: PathBuf,
}

impl RecordingEngine {
    /// Creates a recorder whose calls all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation (`"init"` or `"workspace select"`) fail.
    #[must_use]
    pub const fn failing_on(mut self, command: &'static str) -> Self {
        self.fail_on = Some(command);
        self
    }

    /// Returns a snapshot of the recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: EngineCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn outcome(&self, command: &'static str, out: &mut dyn Write) -> Result<()> {
        if self.fail_on == Some(command) {
            return Err(TfdumpError::Engine {
                command: command.to_string(),
                message: "simulated failure".into(),
            });
        }
        writeln!(out, "recorded {command}").map_err(|e| TfdumpError::Io {
            path: self.working_dir.clone(),
            source: e,
        })
    }
}

impl TerraformEngine for RecordingEngine {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn init(&self, options: &[InitOption], out: &mut dyn Write) -> Result<()> {
        self.record(EngineCall::Init(options.to_vec()));
        self.outcome("init", out)
    }

    fn workspace_select(&self, workspace: &str, out: &mut dyn Write) -> Result<()> {
        self.record(EngineCall::WorkspaceSelect(workspace.to_string()));
        self.outcome("workspace select", out)
    }
}

impl EngineFactory for RecordingEngine {
    fn create(&self, working_dir: &Path) -> Result<Box<dyn TerraformEngine>> {
        self.record(EngineCall::Create(working_dir.to_path_buf()));
        Ok(Box::new(Self {
            calls: Arc::clone(&self.calls),
            fail_on: self.fail_on,
            working_dir: working_dir.to_path_buf(),
        }))
    }
}
