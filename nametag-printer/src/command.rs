//! Print service commands and the runner that executes them
//!
//! Every interaction with the platform print service (probing, scanning,
//! submitting) is expressed as a [`PrintCommand`] and executed through a
//! [`CommandRunner`]. Tests substitute a scripted runner.

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// A single candidate command: program, arguments and execution deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl PrintCommand {
    pub fn new<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Full argument vector, program first
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for PrintCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into [`PrintError::CommandFailed`]
    pub fn ensure_success(self, program: &str) -> PrintResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(PrintError::CommandFailed {
                program: program.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Executes print service commands
///
/// `Err` means the command could not be run to completion (spawn failure,
/// timeout). A command that ran and exited non-zero is `Ok` with its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &PrintCommand) -> PrintResult<CommandOutput>;
}

/// Runs commands as child processes of this process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    #[instrument(skip(self), fields(command = %command))]
    async fn run(&self, command: &PrintCommand) -> PrintResult<CommandOutput> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PrintError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(command.timeout, child.wait_with_output())
            .await
            .map_err(|_| PrintError::Timeout {
                program: command.program.clone(),
                timeout: command.timeout,
            })??;

        let output = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(code = ?output.code, "Command finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_and_display() {
        let cmd = PrintCommand::new("lp", ["-d", "QL", "a.png"], Duration::from_secs(10));
        assert_eq!(cmd.argv(), vec!["lp", "-d", "QL", "a.png"]);
        assert_eq!(cmd.to_string(), "lp -d QL a.png");
    }

    #[test]
    fn test_ensure_success() {
        let ok = CommandOutput {
            code: Some(0),
            ..Default::default()
        };
        assert!(ok.ensure_success("lp").is_ok());

        let failed = CommandOutput {
            code: Some(1),
            stderr: "lp: The printer or class does not exist.\n".to_string(),
            ..Default::default()
        };
        match failed.ensure_success("lp") {
            Err(PrintError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "lp: The printer or class does not exist.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_system_runner_spawn_failure() {
        let cmd = PrintCommand::new(
            "definitely-not-a-print-command-4711",
            Vec::<String>::new(),
            Duration::from_secs(1),
        );
        let result = SystemRunner.run(&cmd).await;
        assert!(matches!(result, Err(PrintError::Spawn { .. })));
    }
}
