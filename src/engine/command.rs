//! Process invocation for pipeline steps
//!
//! Every external tool is consumed as a black box: a shell command whose
//! stdout, stderr, and exit status are captured. The `CommandRunner` trait
//! is the seam between the executor and the host system; tests substitute
//! a canned implementation.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

/// Errors raised before a tool produces an exit status
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to spawn command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// One tool invocation: a shell command plus the environment it runs in
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Shell command, already expression-expanded
    pub command: String,

    /// Environment overlay applied on top of the inherited environment
    pub env: HashMap<String, String>,

    /// Working directory, if overridden
    pub working_dir: Option<String>,
}

/// Captured result of one tool invocation
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam between the executor and the host system
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// Runs invocations through `sh -c` with captured output
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        debug!("Executing command: {}", invocation.command);

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&invocation.command);

        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Invocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: HashMap::new(),
            working_dir: None,
        }
    }
}
