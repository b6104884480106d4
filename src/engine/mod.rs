//! Container lifecycle operations.
//!
//! This module provides [`ContainerEngine`], which drives a container
//! runtime CLI (podman or docker) through the [`CommandExecutor`]
//! abstraction. It covers the common operations the harness needs:
//! registry login, image pull, an attached container run with captured
//! output, and forced container removal.

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use strum::Display;
use uuid::Uuid;

use crate::error::StackopsError;
use crate::executor::{CommandExecutor, CommandSpec};

/// Container runtime used to manage the ops container.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Runtime {
    /// Rootless podman (default)
    #[serde(alias = "")]
    #[default]
    Podman,
    /// Docker CLI
    Docker,
}

impl Runtime {
    /// Returns the CLI binary name for this runtime.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Podman => "podman",
            Self::Docker => "docker",
        }
    }
}

/// Specification for an attached container run.
#[derive(Debug, Clone)]
pub struct RunSpec {
    /// Container name (must be unique on the host)
    pub name: String,
    /// Image reference including tag (e.g., "registry.example.com/ops:1.0")
    pub image: String,
    /// Command argv to run inside the container
    pub command: Vec<String>,
    /// Environment variables to set inside the container
    pub env: Vec<(String, String)>,
    /// Volume mounts in `host:container[:options]` form
    pub volumes: Vec<String>,
}

/// Outcome of an attached container run.
///
/// A non-zero container exit is not an engine-level error; the caller
/// decides how to treat it. Spawn or runtime failures surface as errors.
#[derive(Debug)]
pub struct ContainerRun {
    /// Combined captured stdout of the container
    pub output: String,
    /// True when the container exited with status zero (or in dry-run mode)
    pub success: bool,
    /// Exit code when available
    pub exit_code: Option<i32>,
}

/// Generates a unique container name from a prefix.
///
/// The short uuid suffix avoids collisions with leftover containers from
/// aborted runs on the same host.
pub fn unique_container_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}

/// Container engine driving a runtime CLI through the command executor.
pub struct ContainerEngine {
    runtime: Runtime,
    executor: Arc<dyn CommandExecutor>,
}

impl ContainerEngine {
    /// Creates a new engine for the given runtime.
    pub fn new(runtime: Runtime, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { runtime, executor }
    }

    /// Returns the runtime this engine manages containers with.
    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    /// Authenticates with the image registry holding the ops image.
    ///
    /// The password is passed to the runtime CLI but masked in all logged
    /// and error-facing command lines.
    pub fn registry_login(&self, registry: &str, username: &str, password: &str) -> Result<()> {
        tracing::info!("authenticating with image registry: {}", registry);

        let spec = CommandSpec::new(
            self.runtime.command_name(),
            vec![
                "login".to_string(),
                "--username".to_string(),
                username.to_string(),
                "--password".to_string(),
                password.to_string(),
                registry.to_string(),
            ],
        )
        .with_secret(password);

        let result = self.executor.execute(&spec)?;
        if !result.success() {
            return Err(StackopsError::Registry(format!(
                "login to {} failed with {}",
                registry,
                result.status_line()
            ))
            .into());
        }
        Ok(())
    }

    /// Pulls the image/tag provided.
    pub fn pull_image(&self, image: &str, tag: &str) -> Result<()> {
        let reference = format!("{}:{}", image, tag);
        tracing::info!("pulling ops image: {}", reference);

        let spec =
            CommandSpec::new(self.runtime.command_name(), vec!["pull".to_string(), reference.clone()]);

        let result = self.executor.execute(&spec)?;
        if !result.success() {
            return Err(StackopsError::Registry(format!(
                "pull of {} failed with {}",
                reference,
                result.status_line()
            ))
            .into());
        }
        Ok(())
    }

    /// Runs the ops container attached and captures its output.
    ///
    /// The exit status of the runtime CLI reflects the container command's
    /// exit status, which is returned to the caller rather than treated as
    /// an error. The container is left in place for [`Self::remove_container`].
    pub fn run(&self, run: &RunSpec) -> Result<ContainerRun> {
        let mut args = vec!["run".to_string(), "--name".to_string(), run.name.clone()];

        for (key, value) in &run.env {
            args.push("--env".to_string());
            args.push(format!("{}={}", key, value));
        }

        for volume in &run.volumes {
            args.push("--volume".to_string());
            args.push(volume.clone());
        }

        args.push(run.image.clone());
        args.extend(run.command.iter().cloned());

        let spec = CommandSpec::new(self.runtime.command_name(), args);
        tracing::info!("running ops container: {}", run.name);
        tracing::debug!("container command line: {}", spec.display_line());

        let result = self.executor.execute(&spec)?;
        let success = result.success();
        let exit_code = result.code();
        Ok(ContainerRun {
            output: result.stdout,
            success,
            exit_code,
        })
    }

    /// Removes a container, forcing removal if it is still running.
    pub fn remove_container(&self, name: &str) -> Result<()> {
        tracing::debug!("removing container: {}", name);

        let spec = CommandSpec::new(
            self.runtime.command_name(),
            vec!["rm".to_string(), "--force".to_string(), name.to_string()],
        );

        let result = self.executor.execute(&spec)?;
        if !result.success() {
            return Err(StackopsError::Execution {
                command: spec.display_line(),
                status: result.status_line(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_command_names() {
        assert_eq!(Runtime::Podman.command_name(), "podman");
        assert_eq!(Runtime::Docker.command_name(), "docker");
    }

    #[test]
    fn runtime_default_is_podman() {
        assert_eq!(Runtime::default(), Runtime::Podman);
    }

    #[test]
    fn unique_container_names_differ() {
        let a = unique_container_name("demo-backup-stack");
        let b = unique_container_name("demo-backup-stack");
        assert!(a.starts_with("demo-backup-stack-"));
        assert_ne!(a, b);
    }
}
