//! Engine backed by the Terraform binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use tfdump_common::config::DumpConfig;
use tfdump_common::error::{Result, TfdumpError};
use tfdump_compose::backend::InitOption;

use super::{EngineFactory, TerraformEngine};
use crate::exec::{ExecOutput, run_terraform};

/// Runs Terraform subcommands as child processes in a working directory.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    exec_path: PathBuf,
    working_dir: PathBuf,
}

impl TerraformCli {
    /// Binds the binary at `exec_path` to `working_dir`.
    ///
    /// A bare binary name is looked up on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::Config` if the binary cannot be found and
    /// `TfdumpError::NotFound` if the working directory does not exist.
    pub fn new(working_dir: &Path, exec_path: &Path) -> Result<Self> {
        let exec_path = which::which(exec_path).map_err(|e| TfdumpError::Config {
            message: format!("terraform binary {}: {e}", exec_path.display()),
        })?;
        if !working_dir.is_dir() {
            return Err(TfdumpError::NotFound {
                kind: "working directory",
                id: working_dir.display().to_string(),
            });
        }
        Ok(Self {
            exec_path,
            working_dir: working_dir.to_path_buf(),
        })
    }

    /// Returns the resolved binary path.
    #[must_use]
    pub fn exec_path(&self) -> &Path {
        &self.exec_path
    }

    fn run(&self, command: &str, args: Vec<String>, out: &mut dyn Write) -> Result<()> {
        let output = run_terraform(&self.exec_path, &self.working_dir, &args, out)?;
        check(command, &output)
    }
}

fn check(command: &str, output: &ExecOutput) -> Result<()> {
    let stderr = output.stderr.trim();
    if output.success() {
        if !stderr.is_empty() {
            tracing::warn!(command, stderr, "terraform wrote to stderr");
        }
        return Ok(());
    }
    let message = if stderr.is_empty() {
        format!("exit status {}", output.exit_code)
    } else {
        stderr.to_string()
    };
    Err(TfdumpError::Engine {
        command: command.to_string(),
        message,
    })
}

impl TerraformEngine for TerraformCli {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn init(&self, options: &[InitOption], out: &mut dyn Write) -> Result<()> {
        tracing::info!(
            dir = %self.working_dir.display(),
            options = options.len(),
            "terraform init"
        );
        let args = ["init", "-input=false", "-no-color"]
            .into_iter()
            .map(str::to_string)
            .chain(options.iter().map(InitOption::to_arg))
            .collect();
        self.run("init", args, out)
    }

    fn workspace_select(&self, workspace: &str, out: &mut dyn Write) -> Result<()> {
        tracing::info!(dir = %self.working_dir.display(), workspace, "terraform workspace select");
        let args = ["workspace", "select", "-no-color", workspace]
            .into_iter()
            .map(str::to_string)
            .collect();
        self.run("workspace select", args, out)
    }
}

/// Creates [`TerraformCli`] engines for the configured binary.
#[derive(Debug, Clone)]
pub struct TerraformCliFactory {
    exec_path: PathBuf,
}

impl TerraformCliFactory {
    /// Creates a factory from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns `TfdumpError::Config` if no Terraform binary is configured.
    pub fn from_config(config: &DumpConfig) -> Result<Self> {
        Ok(Self {
            exec_path: config.require_tf_bin()?.clone(),
        })
    }
}

impl EngineFactory for TerraformCliFactory {
    fn create(&self, working_dir: &Path) -> Result<Box<dyn TerraformEngine>> {
        Ok(Box::new(TerraformCli::new(working_dir, &self.exec_path)?))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    /// Writes an executable script that logs its arguments and exits with `code`.
    fn fake_terraform(dir: &Path, code: i32) -> PathBuf {
        let path = dir.join("terraform");
        let script = format!(
            "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/calls.log\"\necho \"ran $1\"\necho \"boom\" >&2\nexit {code}\n"
        );
        std::fs::write(&path, script).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[test]
    fn init_passes_options_in_order() {
        let bin_dir = tempfile::tempdir().expect("failed to create tempdir");
        let work = tempfile::tempdir().expect("failed to create tempdir");
        let bin = fake_terraform(bin_dir.path(), 0);

        let engine = TerraformCli::new(work.path(), &bin).expect("engine");
        let mut out = Vec::new();
        engine
            .init(
                &[
                    InitOption::Upgrade(true),
                    InitOption::BackendConfig("bucket=b1".into()),
                    InitOption::BackendConfig("bucket=b2".into()),
                ],
                &mut out,
            )
            .expect("init");

        let log = std::fs::read_to_string(bin_dir.path().join("calls.log")).expect("log");
        assert_eq!(
            log.trim(),
            "init -input=false -no-color -upgrade=true -backend-config=bucket=b1 -backend-config=bucket=b2"
        );
        assert_eq!(String::from_utf8(out).expect("utf8"), "ran init\n");
    }

    #[test]
    fn failing_workspace_select_surfaces_stderr() {
        let bin_dir = tempfile::tempdir().expect("failed to create tempdir");
        let work = tempfile::tempdir().expect("failed to create tempdir");
        let bin = fake_terraform(bin_dir.path(), 1);

        let engine = TerraformCli::new(work.path(), &bin).expect("engine");
        let err = engine
            .workspace_select("prod", &mut std::io::sink())
            .expect_err("should fail");
        match err {
            TfdumpError::Engine { command, message } => {
                assert_eq!(command, "workspace select");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_working_dir_is_not_found() {
        let bin_dir = tempfile::tempdir().expect("failed to create tempdir");
        let bin = fake_terraform(bin_dir.path(), 0);
        let err = TerraformCli::new(&bin_dir.path().join("absent"), &bin).expect_err("no dir");
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_binary_is_config_error() {
        let work = tempfile::tempdir().expect("failed to create tempdir");
        let err = TerraformCli::new(work.path(), Path::new("/nonexistent/terraform"))
            .expect_err("no binary");
        assert!(matches!(err, TfdumpError::Config { .. }));
    }

    #[test]
    fn factory_requires_tf_bin() {
        let err = TerraformCliFactory::from_config(&DumpConfig::default()).expect_err("unset");
        assert!(matches!(err, TfdumpError::Config { .. }));
    }
}
