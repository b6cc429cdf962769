use std::path::Path;
use std::process::Stdio;

use crate::error::ExecError;

/// Abstraction over process execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` in `cwd` and capture stdout.
    async fn exec(&self, program: &str, args: &[String], cwd: &Path) -> Result<String, ExecError>;

    /// Run a shell command line in `cwd`, streaming output to the terminal.
    /// A non-zero exit is an error.
    async fn exec_shell(&self, command: &str, cwd: &Path) -> Result<(), ExecError>;
}

/// Executes real processes with `tokio::process`.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn exec(&self, program: &str, args: &[String], cwd: &Path) -> Result<String, ExecError> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "exec");

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                cwd: cwd.to_path_buf(),
                source: e,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
                program: program.to_owned(),
                source: e,
            })
        } else {
            Err(ExecError::CommandFailed {
                command: format!("{program} {}", args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }

    async fn exec_shell(&self, command: &str, cwd: &Path) -> Result<(), ExecError> {
        tracing::debug!(command, cwd = %cwd.display(), "exec shell");

        let status = shell(command)
            .current_dir(cwd)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::NotFound {
                program: command.to_owned(),
                cwd: cwd.to_path_buf(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                command: command.to_owned(),
                status: status.to_string(),
                stderr: String::new(),
            })
        }
    }
}

#[cfg(unix)]
fn shell(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
