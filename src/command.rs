//! External program execution
//!
//! Everything that shells out (docker, git, kubectl, minikube, ollama) goes
//! through a [`CommandRunner`] so the callers can be exercised with
//! [`MockRunner`] instead of real processes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` to completion; `Err` only when it could not be spawned
    async fn run(&self, program: &str, args: &[String], stdin: Option<&str>)
        -> Result<CommandOutput>;
}

/// Spawns real processes with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput> {
        debug!(program, args = ?args, "Running command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            // A timed-out caller drops this future; the child must not outlive it
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start '{}'", program))?;

        if let Some(input) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes())
                    .await
                    .with_context(|| format!("Failed to write stdin of '{}'", program))?;
                // Dropping the pipe closes stdin so the program sees EOF
            }
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("Failed to wait for '{}'", program))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}

/// One invocation seen by [`MockRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl RecordedCommand {
    /// Program and arguments joined by spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Records invocations and replays scripted outputs
///
/// Outputs are matched by command-line prefix in registration order and each
/// scripted output is consumed once. Unmatched commands succeed with empty
/// output.
#[derive(Default)]
pub struct MockRunner {
    scripted: Mutex<VecDeque<(String, CommandOutput)>>,
    calls: Mutex<Vec<RecordedCommand>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, prefix: impl Into<String>, output: CommandOutput) -> &Self {
        self.scripted
            .lock()
            .unwrap()
            .push_back((prefix.into(), output));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCommand::command_line).collect()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput> {
        let recorded = RecordedCommand {
            program: program.to_string(),
            args: args.to_vec(),
            stdin: stdin.map(str::to_string),
        };
        let line = recorded.command_line();
        self.calls.lock().unwrap().push(recorded);

        let mut scripted = self.scripted.lock().unwrap();
        let hit = scripted.iter().position(|(prefix, _)| line.starts_with(prefix));
        Ok(hit
            .and_then(|i| scripted.remove(i))
            .map(|(_, output)| output)
            .unwrap_or_else(|| CommandOutput::ok("")))
    }
}

/// `&["a", "b"]` into owned arguments
pub fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let runner = MockRunner::new();
        runner
            .run("docker", &args(["ps", "-a"]), None)
            .await
            .unwrap();
        runner
            .run("ollama", &args(["run", "llama3"]), Some("hello"))
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].command_line(), "docker ps -a");
        assert_eq!(calls[1].stdin.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_mock_scripted_outputs_consumed_in_order() {
        let runner = MockRunner::new();
        runner
            .respond("docker inspect", CommandOutput::ok("exited"))
            .respond("docker inspect", CommandOutput::ok("running"));

        let inspect = args(["inspect", "-f", "{{.State.Status}}", "x"]);
        let first = runner.run("docker", &inspect, None).await.unwrap();
        let second = runner.run("docker", &inspect, None).await.unwrap();
        let third = runner.run("docker", &inspect, None).await.unwrap();

        assert_eq!(first.stdout, "exited");
        assert_eq!(second.stdout, "running");
        assert_eq!(third, CommandOutput::ok(""));
    }

    #[tokio::test]
    async fn test_mock_failure_output() {
        let runner = MockRunner::new();
        runner.respond("git clone", CommandOutput::failed("repository not found"));
        let out = runner
            .run("git", &args(["clone", "--depth=1", "u", "d"]), None)
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.stderr, "repository not found");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_pipes_stdin() {
        let out = ProcessRunner
            .run("cat", &[], Some("FROM alpine"))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "FROM alpine");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_kills_child_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let script = format!("sleep 1; touch '{}'", marker.display());

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            ProcessRunner.run("sh", &args(["-c", &script]), Some("prompt")),
        )
        .await;
        assert!(result.is_err(), "run should still be pending at the timeout");

        tokio::time::sleep(std::time::Duration::from_millis(1800)).await;
        assert!(!marker.exists(), "child kept running after its caller gave up");
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let result = ProcessRunner
            .run("dockgen-definitely-not-installed", &[], None)
            .await;
        assert!(result.is_err());
    }
}
