use std::path::Path;
use std::process::Output;

use anyhow::Context;
use bstr::ByteSlice;
use tokio::process::Command;

use crate::common::error::PspaceError;

pub fn create_command(arguments: &[&str], workdir: &Path) -> Command {
    let mut command = Command::new(arguments[0]);
    command.args(&arguments[1..]);
    command.current_dir(workdir);
    command
}

/// Creates a command that runs `script` through `sh -c` inside `workdir`.
pub fn create_shell_command(script: &str, workdir: &Path) -> Command {
    create_command(&["sh", "-c", script], workdir)
}

pub fn check_command_output(output: Output) -> anyhow::Result<Output> {
    let status = output.status;
    if !status.success() {
        return Err(anyhow::anyhow!(
            "Exit code: {}\nStderr: {}\nStdout: {}",
            status.code().unwrap_or(-1),
            output.stderr.to_str_lossy().trim(),
            output.stdout.to_str_lossy().trim()
        ));
    }
    Ok(output)
}

/// Runs `script` through the shell and returns its stdout followed by its stderr.
/// Fails if the script exits with a non-zero code.
pub async fn run_shell_merged(script: &str, workdir: &Path) -> anyhow::Result<String> {
    log::debug!("Running `{script}` in {}", workdir.display());
    let output = create_shell_command(script, workdir)
        .output()
        .await
        .with_context(|| format!("Cannot start `{script}`"))?;
    let output = check_command_output(output).with_context(|| format!("`{script}` failed"))?;

    let mut merged = output.stdout.to_str_lossy().into_owned();
    merged.push_str(&output.stderr.to_str_lossy());
    Ok(merged)
}

/// Runs `script` through the shell, inheriting stdout and stderr.
pub async fn run_shell_inherited(script: &str, workdir: &Path) -> anyhow::Result<()> {
    log::debug!("Running `{script}` in {}", workdir.display());
    let status = create_shell_command(script, workdir)
        .status()
        .await
        .with_context(|| format!("Cannot start `{script}`"))?;
    if !status.success() {
        return Err(PspaceError::CommandFailed {
            command: script.to_string(),
            message: format!("exit code {}", status.code().unwrap_or(-1)),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run_shell_inherited, run_shell_merged};

    #[tokio::test]
    async fn test_run_shell_merged() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_shell_merged("echo out; echo err >&2", dir.path())
            .await
            .unwrap();
        assert_eq!(output, "out\nerr\n");
    }

    #[tokio::test]
    async fn test_run_shell_merged_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("value"), "0.25").unwrap();
        let output = run_shell_merged("cat value", dir.path()).await.unwrap();
        assert_eq!(output, "0.25");
    }

    #[tokio::test]
    async fn test_run_shell_failure() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_shell_merged("exit 3", dir.path()).await.is_err());
        assert!(run_shell_inherited("exit 3", dir.path()).await.is_err());
    }
}
