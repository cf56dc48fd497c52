//! Terraform process invocation.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tfdump_common::error::{Result, TfdumpError};

/// Outcome of a Terraform invocation whose stdout was streamed.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code returned by the command.
    pub exit_code: i32,
}

impl ExecOutput {
    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs `exec_path` with `args` inside `working_dir` and waits for it.
///
/// Stdout is copied to `out` as it is produced; stderr is collected.
///
/// # Errors
///
/// Returns `TfdumpError::Io` if the process cannot be spawned or its output
/// cannot be forwarded. A non-zero exit is reported through
/// [`ExecOutput::exit_code`], not as an error.
pub fn run_terraform(
    exec_path: &Path,
    working_dir: &Path,
    args: &[String],
    out: &mut dyn Write,
) -> Result<ExecOutput> {
    tracing::debug!(
        bin = %exec_path.display(),
        dir = %working_dir.display(),
        ?args,
        "running terraform"
    );

    let io_err = |e: std::io::Error| TfdumpError::Io {
        path: exec_path.to_path_buf(),
        source: e,
    };

    let mut child = Command::new(exec_path)
        .args(args)
        .current_dir(working_dir)
        .env("TF_IN_AUTOMATION", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(io_err)?;

    // Drained on its own thread so a chatty stderr cannot block stdout.
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    let copied = match child.stdout.take() {
        Some(mut pipe) => std::io::copy(&mut pipe, out).map(|_| ()),
        None => Ok(()),
    };
    if copied.is_err() {
        let _ = child.kill();
    }
    let status = child.wait().map_err(io_err)?;
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    copied.map_err(|e| TfdumpError::Io {
        path: working_dir.to_path_buf(),
        source: e,
    })?;

    Ok(ExecOutput {
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: status.code().unwrap_or(-1),
    })
}
