//! Ops container command assembly.
//!
//! This module provides the trait and shared pieces for the per-cloud
//! backup and restore playbook variants: the ops image description, the
//! extra-vars builder, and required-variable validation. Each playbook
//! implementation turns its parameters into the container command argv
//! `<playbook> -e '<key=value ...>'` expected by the ops image entrypoint.

use serde::Deserialize;

use crate::engine::Runtime;
use crate::error::StackopsError;

pub mod aws;
pub mod gcp;

mod validation;

pub(crate) use validation::validate_credentials_file;

/// Collection namespace the operations playbooks live in.
pub const PLAYBOOK_COLLECTION: &str = "redhat.ansible_on_clouds";

/// Stack version whose backup playbooks predate the ssm bucket and
/// backup prefix variables.
pub(crate) const LEGACY_STACK_VERSION: &str = "2.3";

/// The ops container image and the credentials needed to fetch it.
#[derive(Debug, Clone, Deserialize)]
pub struct OpsImage {
    /// Fully-qualified image name, registry included
    pub image: String,
    /// Image tag
    pub tag: String,
    /// Username to authenticate with the image registry
    #[serde(default)]
    pub registry_username: String,
    /// Password to authenticate with the image registry
    #[serde(default)]
    pub registry_password: String,
    /// Version of the deployed stack, which gates some playbook variables
    pub stack_version: String,
    /// Container runtime managing the ops container
    #[serde(default)]
    pub runtime: Runtime,
}

impl OpsImage {
    /// Returns the registry hostname, the first path segment of the image
    /// reference.
    pub fn registry(&self) -> &str {
        self.image.split('/').next().unwrap_or(&self.image)
    }

    /// Returns the full `image:tag` reference.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Validates that everything needed to fetch the image is set.
    ///
    /// All unset fields are reported at once so a misconfigured run does
    /// not fail one variable at a time.
    pub fn validate(&self) -> Result<(), StackopsError> {
        let matrix = [
            ("ops image", self.image.as_str()),
            ("ops image tag", self.tag.as_str()),
            ("ops image registry username", self.registry_username.as_str()),
            ("ops image registry password", self.registry_password.as_str()),
            ("stack version", self.stack_version.as_str()),
        ];

        let unset: Vec<&str> = matrix
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if unset.is_empty() {
            Ok(())
        } else {
            Err(StackopsError::Validation(format!(
                "{} not set, verify the profile or environment and try again",
                unset.join(", ")
            )))
        }
    }
}

/// Ordered `key=value` pairs passed to a playbook as extra vars.
#[derive(Debug, Default, Clone)]
pub struct ExtraVars {
    vars: Vec<(String, String)>,
}

impl ExtraVars {
    /// Creates an empty set of extra vars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.push((key.into(), value.into()));
    }

    /// Returns the pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.vars
    }

    /// Joins the pairs into the single-string form the ops image
    /// entrypoint expects after `-e`.
    pub fn joined(&self) -> String {
        self.vars
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Validates that every variable has a value, reporting all unset
    /// keys at once.
    pub fn validate(&self) -> Result<(), StackopsError> {
        let unset: Vec<&str> = self
            .vars
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| key.as_str())
            .collect();

        if unset.is_empty() {
            Ok(())
        } else {
            Err(StackopsError::Validation(format!(
                "command generator vars are unset and need to be set: {}",
                unset.join(", ")
            )))
        }
    }
}

/// Trait for per-cloud backup/restore playbook variants.
///
/// Each implementation supplies the playbook name and the parameters the
/// ops container needs: extra vars, container environment, and volume
/// mounts for cloud credentials.
pub trait Playbook {
    /// Short operation name used for container name prefixes
    /// (e.g., "backup-stack").
    fn name(&self) -> &'static str;

    /// Fully-qualified playbook name inside [`PLAYBOOK_COLLECTION`].
    fn playbook(&self) -> String;

    /// Extra vars handed to the playbook.
    fn extra_vars(&self) -> ExtraVars;

    /// Environment variables set inside the ops container.
    fn env_vars(&self) -> Vec<(String, String)>;

    /// Volume mounts in `host:container[:options]` form.
    fn volumes(&self) -> Vec<String>;

    /// Validates the playbook parameters prior to running the container.
    fn validate(&self) -> Result<(), StackopsError>;

    /// Builds the container command argv: playbook name plus the joined
    /// extra vars behind a single `-e`.
    fn container_command(&self) -> Vec<String> {
        vec![self.playbook(), "-e".to_string(), self.extra_vars().joined()]
    }
}
