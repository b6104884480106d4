//! Backup/restore orchestration.
//!
//! Each operation is the same five-step choreography: authenticate with
//! the image registry, pull the ops image, assemble the playbook command,
//! run the ops container attached, then check the outcome and remove the
//! container. Removal always runs, even when the playbook failed, and
//! both errors are surfaced with the run error as primary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::Cloud;
use crate::config::Profile;
use crate::engine::{ContainerEngine, RunSpec, unique_container_name};
use crate::error::StackopsError;
use crate::executor::CommandExecutor;
use crate::ops::Playbook;
use crate::verify::{BackupBucket, BackupBucketConfig, backup_object_from_output};

/// Backup object name substituted during dry runs, where no backup is
/// actually taken.
const DRY_RUN_BACKUP_NAME: &str = "dry-run";

/// Outcome of a backup operation.
#[derive(Debug)]
pub struct BackupReport {
    /// Captured playbook output
    pub playbook_output: String,
    /// Name of the backup object the playbook created
    pub backup_object_name: String,
}

/// Outcome of a restore operation.
#[derive(Debug)]
pub struct RestoreReport {
    /// Captured playbook output
    pub playbook_output: String,
}

/// Authenticates with the ops image registry and pulls the image.
fn setup(engine: &ContainerEngine, profile: &Profile) -> Result<()> {
    engine.registry_login(
        profile.ops.registry(),
        &profile.ops.registry_username,
        &profile.ops.registry_password,
    )?;
    engine.pull_image(&profile.ops.image, &profile.ops.tag)?;
    Ok(())
}

/// Runs a single playbook in the ops container and returns its output.
///
/// The container is removed after the run regardless of the playbook
/// outcome. A non-zero playbook exit becomes an `Execution` error carrying
/// the exit status.
fn run_playbook(
    engine: &ContainerEngine,
    profile: &Profile,
    playbook: &dyn Playbook,
) -> Result<String> {
    playbook.validate()?;

    let name = unique_container_name(&format!("{}-{}", profile.deployment.name, playbook.name()));
    let spec = RunSpec {
        name: name.clone(),
        image: profile.ops.reference(),
        command: playbook.container_command(),
        env: playbook.env_vars(),
        volumes: playbook.volumes(),
    };

    let run_result = engine.run(&spec);
    let remove_result = engine.remove_container(&name);

    // Run failure is primary; a removal error alongside it is only logged
    let run = match run_result {
        Ok(run) => run,
        Err(run_err) => {
            if let Err(remove_err) = remove_result {
                tracing::error!("ops container removal also failed: {:#}", remove_err);
            }
            return Err(run_err);
        }
    };

    if !run.success {
        if let Err(remove_err) = remove_result {
            tracing::error!("ops container removal also failed: {:#}", remove_err);
        }
        return Err(StackopsError::Execution {
            command: playbook.playbook(),
            status: match run.exit_code {
                Some(code) => format!("exit status: {}", code),
                None => "terminated by signal".to_string(),
            },
        }
        .into());
    }

    remove_result.context("failed to remove ops container")?;
    Ok(run.output)
}

/// Resolves the name of the backup object a successful backup run created.
///
/// AWS backups are located by listing the S3 bucket; GCP backups are
/// scanned out of the playbook output by prefix.
fn resolve_backup_object(profile: &Profile, cloud: Cloud, output: &str) -> Result<String> {
    match cloud {
        Cloud::Aws => {
            let aws = profile.aws.as_ref().ok_or_else(|| {
                StackopsError::Config("profile has no aws section".to_string())
            })?;
            let bucket = BackupBucket::new(BackupBucketConfig {
                region: Some(aws.region.clone()).filter(|r| !r.is_empty()),
                endpoint: aws.s3_endpoint.clone(),
                force_path_style: aws.s3_endpoint.is_some(),
            })?;
            Ok(bucket.latest_backup_object(&aws.s3_bucket)?)
        }
        Cloud::Gcp => {
            let gcp = profile.gcp.as_ref().ok_or_else(|| {
                StackopsError::Config("profile has no gcp section".to_string())
            })?;
            backup_object_from_output(output, &gcp.backup_prefix).ok_or_else(|| {
                StackopsError::Verification(format!(
                    "no backup object matching prefix '{}' found in playbook output",
                    gcp.backup_prefix
                ))
                .into()
            })
        }
    }
}

/// Performs a stack backup for the given cloud.
pub fn run_backup(
    profile: &Profile,
    cloud: Cloud,
    executor: Arc<dyn CommandExecutor>,
    dry_run: bool,
) -> Result<BackupReport> {
    profile.validate()?;

    let engine = ContainerEngine::new(profile.ops.runtime, executor);
    setup(&engine, profile)?;

    if cloud == Cloud::Aws
        && let Some(aws) = &profile.aws
        && aws.manage_bucket
        && !dry_run
    {
        let bucket = BackupBucket::new(BackupBucketConfig {
            region: Some(aws.region.clone()).filter(|r| !r.is_empty()),
            endpoint: aws.s3_endpoint.clone(),
            force_path_style: aws.s3_endpoint.is_some(),
        })?;
        bucket.ensure_bucket(&aws.s3_bucket)?;
    }

    let output = match cloud {
        Cloud::Aws => run_playbook(&engine, profile, &profile.aws_backup()?)?,
        Cloud::Gcp => run_playbook(&engine, profile, &profile.gcp_backup()?)?,
    };

    let backup_object_name = if dry_run {
        String::new()
    } else {
        resolve_backup_object(profile, cloud, &output)?
    };

    if !backup_object_name.is_empty() {
        info!("stack backup created: {}", backup_object_name);
    }

    Ok(BackupReport {
        playbook_output: output,
        backup_object_name,
    })
}

/// Performs a stack restore for the given cloud.
///
/// `backup_name` overrides the profile's configured backup object when
/// provided.
pub fn run_restore(
    profile: &Profile,
    cloud: Cloud,
    executor: Arc<dyn CommandExecutor>,
    backup_name: Option<&str>,
) -> Result<RestoreReport> {
    profile.validate()?;

    let engine = ContainerEngine::new(profile.ops.runtime, executor);
    setup(&engine, profile)?;

    let output = match cloud {
        Cloud::Aws => run_playbook(&engine, profile, &profile.aws_restore(backup_name)?)?,
        Cloud::Gcp => run_playbook(&engine, profile, &profile.gcp_restore(backup_name)?)?,
    };

    info!("stack restore completed");

    Ok(RestoreReport {
        playbook_output: output,
    })
}

/// Performs a backup and then a restore from the freshly created backup.
pub fn run_backup_restore(
    profile: &Profile,
    cloud: Cloud,
    executor: Arc<dyn CommandExecutor>,
    dry_run: bool,
) -> Result<(BackupReport, RestoreReport)> {
    let backup = run_backup(profile, cloud, executor.clone(), dry_run)?;

    // No backup object exists in dry-run mode; a placeholder keeps the
    // restore parameters valid so the rendered command can be shown.
    let backup_name = if dry_run {
        DRY_RUN_BACKUP_NAME
    } else {
        backup.backup_object_name.as_str()
    };

    let restore = run_restore(profile, cloud, executor, Some(backup_name))
        .context("restore from fresh backup failed")?;

    Ok((backup, restore))
}
