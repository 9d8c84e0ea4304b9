//! Subprocess execution for the version-control tool.
use std::path::Path;
use std::process::Stdio;

use log::error;
use tokio::process::Command;

use crate::errors::{GitFerryError, GitFerryErrorKind};

/// Captured output of a finished subprocess.
#[derive(Debug, Default, Clone)]
pub struct CommandOutput {
    /// Captured standard output, trimmed.
    pub stdout: String,

    /// Captured standard error, trimmed.
    pub stderr: String,

    /// Whether the process exited with status zero.
    pub success: bool,
}

/// Run a shell command in the given working directory and capture its output.
///
/// A non-zero exit is not an error: it is reported through
/// [`CommandOutput::success`] together with the captured stderr, and logged at
/// error level. Only a failure to spawn the process at all is an `Err`.
///
/// # Errors
/// Error if the process can't be spawned (e.g. the directory does not exist).
pub(crate) async fn run_command(cmd: &str, cwd: &Path) -> Result<CommandOutput, GitFerryError> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            GitFerryError::new_with_source(
                GitFerryErrorKind::Command,
                &format!("Unable to run '{cmd}'"),
                e,
            )
        })?;
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let success = output.status.success();
    if !success {
        error!("Failed to run {cmd}: {stderr}");
    }
    Ok(CommandOutput {
        stdout,
        stderr,
        success,
    })
}
