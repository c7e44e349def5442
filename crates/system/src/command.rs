//! Shared subprocess execution for the admin tools.
//!
//! Two entry points: [`run`] for plain invocations, [`run_with_stdin`]
//! for tools fed a secret on standard input (`chpasswd`, `newlist`).
//! Stdin contents are never logged.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::SystemError;

/// Captured output of a finished tool.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a tool to completion and capture its output.
///
/// Non-zero exit becomes [`SystemError::Command`] with the captured
/// stderr, so job logs show what the tool actually said.
pub async fn run(program: &str, args: &[&str]) -> Result<CommandOutput, SystemError> {
    tracing::debug!(%program, ?args, "exec");

    let output = Command::new(program).args(args).output().await?;
    finish(program, output)
}

/// Run a tool with the given input piped to stdin.
pub async fn run_with_stdin(
    program: &str,
    args: &[&str],
    input: &str,
) -> Result<CommandOutput, SystemError> {
    tracing::debug!(%program, ?args, "exec with stdin");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
        drop(stdin);
    }

    let output = child.wait_with_output().await?;
    finish(program, output)
}

fn finish(
    program: &str,
    output: std::process::Output,
) -> Result<CommandOutput, SystemError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(SystemError::Command {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}
