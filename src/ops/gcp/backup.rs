//! GCP deployment backup playbook.
//!
//! Assembles the parameters for the `gcp_backup_deployment` playbook:
//! the deployment name, project, region, and the storage bucket the
//! backup lands in.

use camino::Utf8PathBuf;

use super::{GCP_ANSIBLE_CONFIG, GCP_CREDENTIALS_MOUNT};
use crate::error::StackopsError;
use crate::ops::{
    ExtraVars, LEGACY_STACK_VERSION, PLAYBOOK_COLLECTION, Playbook, validate_credentials_file,
};

/// Parameters for backing up a stack deployed on GCP.
#[derive(Debug, Clone)]
pub struct GcpBackup {
    /// Name of the deployment
    pub deployment_name: String,
    /// Host path of the GCP service account file mounted into the container
    pub service_account_path: Utf8PathBuf,
    /// GCP project the deployment lives in
    pub project: String,
    /// GCP region the deployment lives in
    pub region: String,
    /// Storage bucket where backup files are stored
    pub bucket_name: String,
    /// Prefix added to the backup object name
    pub backup_prefix: String,
    /// Version of the deployed stack
    pub stack_version: String,
}

impl Playbook for GcpBackup {
    fn name(&self) -> &'static str {
        "backup-deployment"
    }

    fn playbook(&self) -> String {
        format!("{}.gcp_backup_deployment", PLAYBOOK_COLLECTION)
    }

    fn extra_vars(&self) -> ExtraVars {
        let mut vars = ExtraVars::new();
        vars.push("gcp_deployment_name", &self.deployment_name);
        vars.push("gcp_project", &self.project);
        vars.push("gcp_region", &self.region);
        vars.push("gcp_bucket_name", &self.bucket_name);

        // The legacy playbook has no prefix variable
        if self.stack_version != LEGACY_STACK_VERSION {
            vars.push("backup_prefix", &self.backup_prefix);
        }

        vars
    }

    fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("ANSIBLE_CONFIG".to_string(), GCP_ANSIBLE_CONFIG.to_string()),
            ("DEPLOYMENT_NAME".to_string(), self.deployment_name.clone()),
            ("GENERATE_INVENTORY".to_string(), "true".to_string()),
            ("PLATFORM".to_string(), "GCP".to_string()),
        ]
    }

    fn volumes(&self) -> Vec<String> {
        vec![format!("{}:{}:ro", self.service_account_path, GCP_CREDENTIALS_MOUNT)]
    }

    fn validate(&self) -> Result<(), StackopsError> {
        self.extra_vars().validate()?;
        validate_credentials_file(&self.service_account_path, "gcp service account")
    }
}
