//! AWS stack backup playbook.
//!
//! Assembles the parameters for the `aws_backup_stack` playbook: the
//! foundation stack name, backup vault and IAM role, the S3 bucket the
//! backup lands in, and (for stack versions past the legacy one) the ssm
//! bucket and backup prefix.

use camino::Utf8PathBuf;

use super::{AWS_ANSIBLE_CONFIG, AWS_CREDENTIALS_MOUNT};
use crate::error::StackopsError;
use crate::ops::{
    ExtraVars, LEGACY_STACK_VERSION, PLAYBOOK_COLLECTION, Playbook, validate_credentials_file,
};

/// Parameters for backing up a stack deployed on AWS.
#[derive(Debug, Clone)]
pub struct AwsBackup {
    /// Name of the deployed foundation stack
    pub deployment_name: String,
    /// Host path of the AWS credentials file mounted into the container
    pub credentials_path: Utf8PathBuf,
    /// AWS region the stack is deployed in
    pub region: String,
    /// Backup vault holding efs recovery points
    pub backup_vault_name: String,
    /// IAM role ARN with permission to perform backup operations
    pub backup_iam_role_arn: String,
    /// S3 bucket where backup files are stored
    pub s3_bucket: String,
    /// S3 bucket where temporary config files for aws ssm are stored
    pub ssm_bucket_name: String,
    /// Prefix added to the backup object name
    pub backup_prefix: String,
    /// Version of the deployed stack
    pub stack_version: String,
}

impl Playbook for AwsBackup {
    fn name(&self) -> &'static str {
        "backup-stack"
    }

    fn playbook(&self) -> String {
        format!("{}.aws_backup_stack", PLAYBOOK_COLLECTION)
    }

    fn extra_vars(&self) -> ExtraVars {
        let mut vars = ExtraVars::new();
        vars.push("aws_foundation_stack_name", &self.deployment_name);
        vars.push("aws_region", &self.region);
        vars.push("aws_backup_vault_name", &self.backup_vault_name);
        vars.push("aws_backup_iam_role_arn", &self.backup_iam_role_arn);
        vars.push("aws_s3_bucket", &self.s3_bucket);

        // The legacy playbook has no ssm bucket or prefix variables
        if self.stack_version != LEGACY_STACK_VERSION {
            vars.push("aws_ssm_bucket_name", &self.ssm_bucket_name);
            vars.push("backup_prefix", &self.backup_prefix);
        }

        vars
    }

    fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("ANSIBLE_CONFIG".to_string(), AWS_ANSIBLE_CONFIG.to_string()),
            ("DEPLOYMENT_NAME".to_string(), self.deployment_name.clone()),
            ("GENERATE_INVENTORY".to_string(), "true".to_string()),
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
