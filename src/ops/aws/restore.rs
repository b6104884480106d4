//! AWS stack restore playbook.
//!
//! Assembles the parameters for the `aws_restore_stack` playbook. The
//! backup object name is the one produced by a prior backup run, either
//! carried over by the combined backup-restore workflow or supplied
//! through configuration.

use camino::Utf8PathBuf;

use super::{AWS_ANSIBLE_CONFIG, AWS_CREDENTIALS_MOUNT};
use crate::error::StackopsError;
use crate::ops::{ExtraVars, PLAYBOOK_COLLECTION, Playbook, validate_credentials_file};

/// Parameters for restoring a stack deployed on AWS from a backup.
#[derive(Debug, Clone)]
pub struct AwsRestore {
    /// Name of the deployed foundation stack
    pub deployment_name: String,
    /// Host path of the AWS credentials file mounted into the container
    pub credentials_path: Utf8PathBuf,
    /// Backup object name stored in the S3 bucket
    pub backup_name: String,
    /// AWS region the stack is deployed in
    pub region: String,
    /// S3 bucket where backup files are stored
    pub s3_bucket: String,
    /// S3 bucket where temporary config files for aws ssm are stored
    pub ssm_bucket_name: String,
}

impl Playbook for AwsRestore {
    fn name(&self) -> &'static str {
        "restore-stack"
    }

    fn playbook(&self) -> String {
        format!("{}.aws_restore_stack", PLAYBOOK_COLLECTION)
    }

    fn extra_vars(&self) -> ExtraVars {
        let mut vars = ExtraVars::new();
        vars.push("aws_foundation_stack_name", &self.deployment_name);
        vars.push("aws_backup_name", &self.backup_name);
        vars.push("aws_region", &self.region);
        vars.push("aws_s3_bucket", &self.s3_bucket);
        vars.push("aws_ssm_bucket_name", &self.ssm_bucket_name);
        vars
    }

    fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("ANSIBLE_CONFIG".to_string(), AWS_ANSIBLE_CONFIG.to_string()),
            ("DEPLOYMENT_NAME".to_string(), self.deployment_name.clone()),
            ("GENERATE_INVENTORY".to_string(), "true".to_string()),
            ("CHECK_GENERATED_INVENTORY".to_string(), "false".to_string()),
            ("PLATFORM".to_string(), "AWS".to_string()),
        ]
    }

    fn volumes(&self) -> Vec<String> {
        vec![format!("{}:{}:ro", self.credentials_path, AWS_CREDENTIALS_MOUNT)]
    }

    fn validate(&self) -> Result<(), StackopsError> {
        self.extra_vars().validate()?;
        validate_credentials_file(&self.credentials_path, "aws credentials")
    }
}
