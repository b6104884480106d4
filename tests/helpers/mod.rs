use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::Mutex;

use anyhow::Result;
use camino::Utf8PathBuf;
use stackops::config::{AwsSection, Deployment, GcpSection, Profile};
use stackops::engine::Runtime;
use stackops::executor::{CommandExecutor, CommandSpec, ExecutionResult};
use stackops::ops::OpsImage;

/// Scripted response for a recorded executor, matched on the first
/// argument of the runtime CLI invocation ("login", "pull", "run", "rm").
#[allow(dead_code)]
pub struct ScriptedResponse {
    pub op: &'static str,
    pub exit_code: i32,
    pub stdout: String,
}

/// Command executor that records every spec it receives and replies from
/// a script instead of spawning processes.
#[allow(dead_code)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<CommandSpec>>,
    responses: Vec<ScriptedResponse>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    /// Executor where every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Executor replying from the given script; unmatched operations
    /// succeed with empty output.
    pub fn with_responses(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses,
        }
    }

    /// Returns the masked command lines recorded so far, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("executor call log poisoned")
            .iter()
            .map(|spec| spec.display_line())
            .collect()
    }

    /// Returns the recorded specs.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().expect("executor call log poisoned").clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        self.calls
            .lock()
            .expect("executor call log poisoned")
            .push(spec.clone());

        let response = spec
            .args
            .first()
            .and_then(|op| self.responses.iter().find(|r| r.op == op));

        let (exit_code, stdout) = match response {
            Some(r) => (r.exit_code, r.stdout.clone()),
            None => (0, String::new()),
        };

        Ok(ExecutionResult {
            status: Some(ExitStatus::from_raw(exit_code << 8)),
            stdout,
            stderr: String::new(),
        })
    }
}

/// Test helper to create an OpsImage with sensible defaults.
#[allow(dead_code)]
pub fn create_ops_image() -> OpsImage {
    OpsImage {
        image: "registry.example.com/cloud-ops/ops-image".to_string(),
        tag: "2.4.20230630".to_string(),
        registry_username: "robot".to_string(),
        registry_password: "secret".to_string(),
        stack_version: "2.4".to_string(),
        runtime: Runtime::Podman,
    }
}

/// Test helper to create a profile with an AWS section pointing at the
/// given credentials file.
#[allow(dead_code)]
pub fn create_aws_profile(credentials_path: Utf8PathBuf) -> Profile {
    Profile {
        ops: create_ops_image(),
        deployment: Deployment {
            name: "demo".to_string(),
        },
        aws: Some(AwsSection {
            credentials_path,
            region: "us-east-1".to_string(),
            backup_iam_role_arn: "arn:aws:iam::123456789012:role/backup".to_string(),
            backup_vault_name: "Default".to_string(),
            backup_prefix: "stack-backup".to_string(),
            s3_bucket: "demo-backups".to_string(),
            ssm_bucket_name: "demo-ssm".to_string(),
            backup_name: "stack-backup-20230630T120000".to_string(),
            s3_endpoint: None,
            manage_bucket: false,
        }),
        gcp: None,
    }
}

/// Test helper to create a profile with a GCP section pointing at the
/// given service account file.
#[allow(dead_code)]
pub fn create_gcp_profile(service_account_path: Utf8PathBuf) -> Profile {
    Profile {
        ops: create_ops_image(),
        deployment: Deployment {
            name: "demo".to_string(),
        },
        aws: None,
        gcp: Some(GcpSection {
            service_account_path,
            project: "demo-project".to_string(),
            region: "us-central1".to_string(),
            bucket_name: "demo-backups".to_string(),
            backup_prefix: "stack-backup".to_string(),
            backup_name: "stack-backup-20230630T120000".to_string(),
        }),
    }
}

/// Writes a YAML profile to a temp directory and loads it.
#[allow(dead_code)]
pub fn load_profile_from_yaml(yaml: &str) -> Result<Profile> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("profile.yaml");
    std::fs::write(&path, yaml)?;
    let utf8_path = Utf8PathBuf::from_path_buf(path).expect("temp path is utf-8");
    stackops::config::load_profile(&utf8_path)
}

/// Creates a named temp file usable as a mounted credentials file.
#[allow(dead_code)]
pub fn create_credentials_file() -> (tempfile::NamedTempFile, Utf8PathBuf) {
    let file = tempfile::NamedTempFile::new().expect("create temp credentials file");
    let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("temp path is utf-8");
    (file, path)
}
