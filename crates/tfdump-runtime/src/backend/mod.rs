//! Terraform execution engine abstraction.
//!
//! The dump pipeline only needs `init` and `workspace select`; plan and
//! apply are left to the caller, which picks up the generated var file from
//! the working directory.

pub mod cli;
pub mod recording;

use std::io::Write;
use std::path::Path;

use tfdump_common::error::Result;
use tfdump_compose::backend::InitOption;

/// A Terraform engine bound to one working directory.
pub trait TerraformEngine {
    /// Returns the working directory the engine operates in.
    fn working_dir(&self) -> &Path;

    /// Initializes the working directory, streaming engine output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure unchanged.
    fn init(&self, options: &[InitOption], out: &mut dyn Write) -> Result<()>;

    /// Selects a workspace, streaming engine output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure unchanged.
    fn workspace_select(&self, workspace: &str, out: &mut dyn Write) -> Result<()>;
}

/// Creates engines for working directories that only exist once the
/// artifact has been extracted.
pub trait EngineFactory {
    /// Creates an engine for `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot operate in `working_dir`.
    fn create(&self, working_dir: &Path) -> Result<Box<dyn TerraformEngine>>;
}
