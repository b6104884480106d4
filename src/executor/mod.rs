//! Command execution abstraction for stackops.
//!
//! This module provides:
//! - [`CommandSpec`]: Specification for commands to execute
//! - [`ExecutionResult`]: Result of command execution with captured output
//! - [`CommandExecutor`]: Trait for command execution strategies
//! - [`RealCommandExecutor`]: Production implementation using `std::process::Command`
//!
//! Unlike a plain process wrapper, the executor both streams output to the
//! log in real time and captures it, because the harness must parse
//! playbook output after a container run completes.

mod pipe;
mod real;

use std::process::ExitStatus;

use anyhow::Result;
use camino::Utf8PathBuf;

pub use real::RealCommandExecutor;

/// Placeholder used in place of secret arguments in any logged or
/// error-facing rendering of a command line.
const SECRET_MASK: &str = "***";

/// Specification for a command to be executed.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The command to execute (e.g., "podman")
    pub command: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Working directory (optional, defaults to current directory)
    pub cwd: Option<Utf8PathBuf>,
    /// Environment variables to set (in addition to inherited environment)
    pub env: Vec<(String, String)>,
    /// Argument values that must never appear in logs or error messages
    /// (e.g., registry passwords)
    secrets: Vec<String>,
}

impl CommandSpec {
    /// Creates a new CommandSpec with command and args
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            cwd: None,
            env: Vec::new(),
            secrets: Vec::new(),
        }
    }

    /// Sets the working directory
    #[must_use]
    pub fn with_cwd(mut self, cwd: Utf8PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    /// Adds an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Marks an argument value as secret so it is masked in logged and
    /// error-facing renderings of this command line. The value itself is
    /// still passed to the spawned process unchanged.
    #[must_use]
    pub fn with_secret(mut self, value: impl Into<String>) -> Self {
        self.secrets.push(value.into());
        self
    }

    /// Renders the command line for logs and error messages, with secret
    /// argument values masked.
    pub fn display_line(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|a| {
                if self.secrets.iter().any(|s| s == a) {
                    format!("{:?}", SECRET_MASK)
                } else {
                    format!("{:?}", a)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        if args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, args)
        }
    }
}

/// Result of command execution.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Exit status of the command (None in dry-run mode)
    pub status: Option<ExitStatus>,
    /// Captured standard output (empty in dry-run mode)
    pub stdout: String,
    /// Captured standard error (empty in dry-run mode)
    pub stderr: String,
}

impl ExecutionResult {
    /// Returns true if the command executed successfully.
    ///
    /// In dry-run mode (status is None), this always returns true.
    pub fn success(&self) -> bool {
        self.status.is_none_or(|s| s.success())
    }

    /// Returns the exit code if available
    pub fn code(&self) -> Option<i32> {
        self.status.and_then(|s| s.code())
    }

    /// Renders the exit status for error messages ("exit status: 1",
    /// or "dry run" when no command was executed).
    pub fn status_line(&self) -> String {
        match self.status {
            Some(status) => status.to_string(),
            None => "dry run".to_string(),
        }
    }
}

/// Trait for command execution.
///
/// Implementations must be `Send + Sync` to allow the executor to be shared
/// as `Arc<dyn CommandExecutor>` between the container engine and the
/// orchestration layer.
pub trait CommandExecutor: Send + Sync {
    /// Executes a command with the given specification.
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_line_masks_secret_values() {
        let spec = CommandSpec::new(
            "podman",
            vec![
                "login".to_string(),
                "--username".to_string(),
                "robot".to_string(),
                "--password".to_string(),
                "hunter2".to_string(),
                "registry.example.com".to_string(),
            ],
        )
        .with_secret("hunter2");

        let line = spec.display_line();
        assert!(!line.contains("hunter2"), "secret leaked into display line: {}", line);
        assert!(line.contains("\"***\""));
        assert!(line.contains("\"robot\""));
    }

    #[test]
    fn display_line_without_args_is_bare_command() {
        let spec = CommandSpec::new("podman", Vec::new());
        assert_eq!(spec.display_line(), "podman");
    }
}
