//! Profile loading and validation.
//!
//! A profile is a YAML document describing the ops image, the deployment
//! under test, and per-cloud parameters for the backup/restore playbooks.
//! Credential and identifier fields left empty in the YAML are filled
//! from `STACKOPS_*` environment variables, so secrets can stay out of
//! checked-in profiles. Explicit YAML values win over the environment,
//! and built-in defaults (backup vault, backup prefix) apply last.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Deserialize;

use crate::error::StackopsError;
use crate::ops::OpsImage;
use crate::ops::aws::{AwsBackup, AwsRestore};
use crate::ops::gcp::{GcpBackup, GcpRestore};

/// Built-in defaults, applied after the environment overlay so a
/// `STACKOPS_*` variable can still override them.
const DEFAULT_BACKUP_VAULT: &str = "Default";
const DEFAULT_BACKUP_PREFIX: &str = "stack-backup";

/// Pattern deployment names must match: lowercase alphanumerics and
/// hyphens, starting with a letter, at most 30 characters. Cloud-side
/// resource names are derived from it, which is where the limit comes from.
fn deployment_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9-]{0,28}[a-z0-9]$").expect("deployment name pattern is valid")
    })
}

/// The deployment under test.
#[derive(Debug, Deserialize)]
pub struct Deployment {
    /// Deployment (foundation stack) name
    #[serde(default)]
    pub name: String,
}

/// AWS-specific profile section.
#[derive(Debug, Deserialize)]
pub struct AwsSection {
    /// Path to the AWS credentials file
    #[serde(default)]
    pub credentials_path: Utf8PathBuf,
    /// AWS region
    #[serde(default)]
    pub region: String,
    /// IAM role ARN with permission to perform backup operations
    #[serde(default)]
    pub backup_iam_role_arn: String,
    /// Backup vault holding efs recovery points
    #[serde(default)]
    pub backup_vault_name: String,
    /// Prefix added to the backup object name
    #[serde(default)]
    pub backup_prefix: String,
    /// S3 bucket where backup files are stored
    #[serde(default)]
    pub s3_bucket: String,
    /// S3 bucket where temporary config files for aws ssm are stored
    #[serde(default)]
    pub ssm_bucket_name: String,
    /// Backup object name to restore from
    #[serde(default)]
    pub backup_name: String,
    /// Custom S3 endpoint for S3-compatible stores
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    /// Create the backup bucket before running the backup playbook
    #[serde(default)]
    pub manage_bucket: bool,
}

/// GCP-specific profile section.
#[derive(Debug, Deserialize)]
pub struct GcpSection {
    /// Path to the GCP service account file
    #[serde(default)]
    pub service_account_path: Utf8PathBuf,
    /// GCP project
    #[serde(default)]
    pub project: String,
    /// GCP region
    #[serde(default)]
    pub region: String,
    /// Storage bucket where backup files are stored
    #[serde(default)]
    pub bucket_name: String,
    /// Prefix added to the backup object name
    #[serde(default)]
    pub backup_prefix: String,
    /// Backup object name to restore from
    #[serde(default)]
    pub backup_name: String,
}

/// Top-level harness profile.
#[derive(Debug, Deserialize)]
pub struct Profile {
    /// Ops container image settings
    pub ops: OpsImage,
    /// Deployment under test
    pub deployment: Deployment,
    /// AWS parameters (required for `--cloud aws`)
    #[serde(default)]
    pub aws: Option<AwsSection>,
    /// GCP parameters (required for `--cloud gcp`)
    #[serde(default)]
    pub gcp: Option<GcpSection>,
}

/// Fills `value` from the environment variable `var` when it is empty.
fn env_default(value: &mut String, var: &str) {
    if value.is_empty()
        && let Ok(env_value) = env::var(var)
    {
        *value = env_value;
    }
}

/// Path variant of [`env_default`].
fn env_default_path(value: &mut Utf8PathBuf, var: &str) {
    if value.as_str().is_empty()
        && let Ok(env_value) = env::var(var)
    {
        *value = Utf8PathBuf::from(env_value);
    }
}

impl Profile {
    /// Overlays `STACKOPS_*` environment variables onto fields left empty
    /// in the YAML document, then fills the remaining empty fields that
    /// have built-in defaults. Precedence is YAML, then environment, then
    /// built-in.
    pub fn apply_env_defaults(&mut self) {
        env_default(&mut self.ops.image, "STACKOPS_OPS_IMAGE");
        env_default(&mut self.ops.tag, "STACKOPS_OPS_IMAGE_TAG");
        env_default(&mut self.ops.registry_username, "STACKOPS_REGISTRY_USERNAME");
        env_default(&mut self.ops.registry_password, "STACKOPS_REGISTRY_PASSWORD");
        env_default(&mut self.ops.stack_version, "STACKOPS_STACK_VERSION");
        env_default(&mut self.deployment.name, "STACKOPS_DEPLOYMENT_NAME");

        if let Some(aws) = &mut self.aws {
            env_default_path(&mut aws.credentials_path, "STACKOPS_AWS_CREDENTIALS_PATH");
            env_default(&mut aws.region, "STACKOPS_AWS_REGION");
            env_default(&mut aws.backup_iam_role_arn, "STACKOPS_AWS_BACKUP_IAM_ROLE_ARN");
            env_default(&mut aws.backup_vault_name, "STACKOPS_AWS_BACKUP_VAULT_NAME");
            env_default(&mut aws.backup_prefix, "STACKOPS_AWS_BACKUP_PREFIX");
            env_default(&mut aws.s3_bucket, "STACKOPS_AWS_S3_BUCKET");
            env_default(&mut aws.ssm_bucket_name, "STACKOPS_AWS_SSM_BUCKET_NAME");
            env_default(&mut aws.backup_name, "STACKOPS_AWS_BACKUP_NAME");
        }

        if let Some(gcp) = &mut self.gcp {
            env_default_path(&mut gcp.service_account_path, "STACKOPS_GCP_SERVICE_ACCOUNT_PATH");
            env_default(&mut gcp.project, "STACKOPS_GCP_PROJECT");
            env_default(&mut gcp.region, "STACKOPS_GCP_REGION");
            env_default(&mut gcp.bucket_name, "STACKOPS_GCP_BUCKET_NAME");
            env_default(&mut gcp.backup_prefix, "STACKOPS_GCP_BACKUP_PREFIX");
            env_default(&mut gcp.backup_name, "STACKOPS_GCP_BACKUP_NAME");
        }

        if let Some(aws) = &mut self.aws {
            if aws.backup_vault_name.is_empty() {
                aws.backup_vault_name = DEFAULT_BACKUP_VAULT.to_string();
            }
            if aws.backup_prefix.is_empty() {
                aws.backup_prefix = DEFAULT_BACKUP_PREFIX.to_string();
            }
        }
        if let Some(gcp) = &mut self.gcp
            && gcp.backup_prefix.is_empty()
        {
            gcp.backup_prefix = DEFAULT_BACKUP_PREFIX.to_string();
        }
    }

    /// Validates the settings every operation depends on: the ops image
    /// matrix and the deployment name pattern. Playbook-specific fields
    /// are validated by the playbook variants themselves.
    pub fn validate(&self) -> Result<(), StackopsError> {
        self.ops.validate()?;

        if self.deployment.name.is_empty() {
            return Err(StackopsError::Validation(
                "deployment name is not set, verify the profile or environment and try again"
                    .to_string(),
            ));
        }
        if !deployment_name_pattern().is_match(&self.deployment.name) {
            return Err(StackopsError::Validation(format!(
                "deployment name '{}' is invalid: expected lowercase alphanumerics \
                and hyphens, starting with a letter, at most 30 characters",
                self.deployment.name
            )));
        }

        Ok(())
    }

    fn aws_section(&self) -> Result<&AwsSection, StackopsError> {
        self.aws.as_ref().ok_or_else(|| {
            StackopsError::Config("profile has no aws section but an aws operation was requested".to_string())
        })
    }

    fn gcp_section(&self) -> Result<&GcpSection, StackopsError> {
        self.gcp.as_ref().ok_or_else(|| {
            StackopsError::Config("profile has no gcp section but a gcp operation was requested".to_string())
        })
    }

    /// Builds the AWS backup playbook parameters from this profile.
    pub fn aws_backup(&self) -> Result<AwsBackup, StackopsError> {
        let aws = self.aws_section()?;
        Ok(AwsBackup {
            deployment_name: self.deployment.name.clone(),
            credentials_path: aws.credentials_path.clone(),
            region: aws.region.clone(),
            backup_vault_name: aws.backup_vault_name.clone(),
            backup_iam_role_arn: aws.backup_iam_role_arn.clone(),
            s3_bucket: aws.s3_bucket.clone(),
            ssm_bucket_name: aws.ssm_bucket_name.clone(),
            backup_prefix: aws.backup_prefix.clone(),
            stack_version: self.ops.stack_version.clone(),
        })
    }

    /// Builds the AWS restore playbook parameters from this profile.
    ///
    /// `backup_name` overrides the profile's backup name when provided;
    /// the combined backup-restore workflow threads the freshly created
    /// backup object through it.
    pub fn aws_restore(&self, backup_name: Option<&str>) -> Result<AwsRestore, StackopsError> {
        let aws = self.aws_section()?;
        Ok(AwsRestore {
            deployment_name: self.deployment.name.clone(),
            credentials_path: aws.credentials_path.clone(),
            backup_name: backup_name.unwrap_or(&aws.backup_name).to_string(),
            region: aws.region.clone(),
            s3_bucket: aws.s3_bucket.clone(),
            ssm_bucket_name: aws.ssm_bucket_name.clone(),
        })
    }

    /// Builds the GCP backup playbook parameters from this profile.
    pub fn gcp_backup(&self) -> Result<GcpBackup, StackopsError> {
        let gcp = self.gcp_section()?;
        Ok(GcpBackup {
            deployment_name: self.deployment.name.clone(),
            service_account_path: gcp.service_account_path.clone(),
            project: gcp.project.clone(),
            region: gcp.region.clone(),
            bucket_name: gcp.bucket_name.clone(),
            backup_prefix: gcp.backup_prefix.clone(),
            stack_version: self.ops.stack_version.clone(),
        })
    }

    /// Builds the GCP restore playbook parameters from this profile.
    pub fn gcp_restore(&self, backup_name: Option<&str>) -> Result<GcpRestore, StackopsError> {
        let gcp = self.gcp_section()?;
        Ok(GcpRestore {
            deployment_name: self.deployment.name.clone(),
            service_account_path: gcp.service_account_path.clone(),
            backup_name: backup_name.unwrap_or(&gcp.backup_name).to_string(),
            project: gcp.project.clone(),
            region: gcp.region.clone(),
            bucket_name: gcp.bucket_name.clone(),
        })
    }
}

/// Loads a profile from a YAML file and overlays environment defaults.
pub fn load_profile(path: &Utf8Path) -> Result<Profile> {
    let file = File::open(path).with_context(|| format!("failed to load file: {}", path))?;
    let reader = BufReader::new(file);
    let mut profile: Profile = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse yaml: {}", path))?;
    profile.apply_env_defaults();
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_name_pattern_accepts_typical_names() {
        for name in ["demo", "aap-stack-01", "a1"] {
            assert!(deployment_name_pattern().is_match(name), "rejected: {}", name);
        }
    }

    #[test]
    fn deployment_name_pattern_rejects_bad_names() {
        for name in ["Demo", "1demo", "demo_", "-demo", "demo-", "a", "this-name-is-way-too-long-for-a-stack"] {
            assert!(!deployment_name_pattern().is_match(name), "accepted: {}", name);
        }
    }
}
