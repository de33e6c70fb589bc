//! Scripted command runner for tests

use crate::command::{CommandOutput, CommandRunner, PrintCommand};
use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays canned results in order and records every command it was given
pub(crate) struct ScriptedRunner {
    responses: Mutex<VecDeque<PrintResult<CommandOutput>>>,
    calls: Mutex<Vec<PrintCommand>>,
}

impl ScriptedRunner {
    pub(crate) fn new(responses: Vec<PrintResult<CommandOutput>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<PrintCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &PrintCommand) -> PrintResult<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(spawn_error(&command.program)))
    }
}

pub(crate) fn exit(code: i32) -> PrintResult<CommandOutput> {
    Ok(CommandOutput {
        code: Some(code),
        ..Default::default()
    })
}

pub(crate) fn stdout(text: &str) -> PrintResult<CommandOutput> {
    Ok(CommandOutput {
        code: Some(0),
        stdout: text.to_string(),
        stderr: String::new(),
    })
}

pub(crate) fn stderr(code: i32, text: &str) -> PrintResult<CommandOutput> {
    Ok(CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: text.to_string(),
    })
}

pub(crate) fn timed_out(program: &str) -> PrintResult<CommandOutput> {
    Err(PrintError::Timeout {
        program: program.to_string(),
        timeout: Duration::from_secs(10),
    })
}

pub(crate) fn spawn_error(program: &str) -> PrintError {
    PrintError::Spawn {
        program: program.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    }
}
