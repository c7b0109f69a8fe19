//! Native manager command execution.
//!
//! Every subprocess the lifecycle issues goes through a [`CommandRunner`], so
//! the native manager can be replaced by a fake in tests.

use std::fmt;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, ServiceError};

/// A program plus its arguments, as handed to the native manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl NativeCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

impl fmt::Display for NativeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and capture its output.
    ///
    /// An `Err` means the program could not be executed; a nonzero exit is
    /// reported through [`CommandOutput::success`].
    async fn output(&self, command: &NativeCommand) -> std::io::Result<CommandOutput>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn output(&self, command: &NativeCommand) -> std::io::Result<CommandOutput> {
        debug!(program = %command.program, args = ?command.args, "Executing native command");

        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run a command and turn both spawn failures and nonzero exits into errors.
pub async fn run_checked(runner: &dyn CommandRunner, command: NativeCommand) -> Result<CommandOutput> {
    let output = runner
        .output(&command)
        .await
        .map_err(|source| ServiceError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if !output.success {
        return Err(ServiceError::Command {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    Ok(output)
}
