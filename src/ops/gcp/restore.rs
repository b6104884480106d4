//! GCP deployment restore playbook.

use camino::Utf8PathBuf;

use super::{GCP_ANSIBLE_CONFIG, GCP_CREDENTIALS_MOUNT};
use crate::error::StackopsError;
use crate::ops::{ExtraVars, PLAYBOOK_COLLECTION, Playbook, validate_credentials_file};

/// Parameters for restoring a stack deployed on GCP from a backup.
#[derive(Debug, Clone)]
pub struct GcpRestore {
    /// Name of the deployment
    pub deployment_name: String,
    /// Host path of the GCP service account file mounted into the container
    pub service_account_path: Utf8PathBuf,
    /// Backup object name stored in the storage bucket
    pub backup_name: String,
    /// GCP project the deployment lives in
    pub project: String,
    /// GCP region the deployment lives in
    pub region: String,
    /// Storage bucket where backup files are stored
    pub bucket_name: String,
}

impl Playbook for GcpRestore {
    fn name(&self) -> &'static str {
        "restore-deployment"
    }

    fn playbook(&self) -> String {
        format!("{}.gcp_restore_deployment", PLAYBOOK_COLLECTION)
    }

    fn extra_vars(&self) -> ExtraVars {
        let mut vars = ExtraVars::new();
        vars.push("gcp_deployment_name", &self.deployment_name);
        vars.push("gcp_restore_file_name", &self.backup_name);
        vars.push("gcp_project", &self.project);
        vars.push("gcp_region", &self.region);
        vars.push("gcp_bucket_name", &self.bucket_name);
        vars
    }

    fn env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("ANSIBLE_CONFIG".to_string(), GCP_ANSIBLE_CONFIG.to_string()),
            ("DEPLOYMENT_NAME".to_string(), self.deployment_name.clone()),
            ("GENERATE_INVENTORY".to_string(), "true".to_string()),
            ("CHECK_GENERATED_INVENTORY".to_string(), "false".to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn restore() -> GcpRestore {
        GcpRestore {
            deployment_name: "demo".to_string(),
            service_account_path: Utf8PathBuf::from("/home/user/.gcp/sa.json"),
            backup_name: "stack-backup-20230630T120000".to_string(),
            project: "demo-project".to_string(),
            region: "us-central1".to_string(),
            bucket_name: "demo-backups".to_string(),
        }
    }

    #[test]
    fn extra_vars_carry_restore_file_name() {
        let joined = restore().extra_vars().joined();
        assert!(joined.contains("gcp_restore_file_name=stack-backup-20230630T120000"));
        assert!(joined.starts_with("gcp_deployment_name=demo "));
    }

    #[test]
    fn restore_skips_generated_inventory_check() {
        let env = restore().env_vars();
        assert!(env.contains(&("CHECK_GENERATED_INVENTORY".to_string(), "false".to_string())));
    }

    #[test]
    fn validate_rejects_unset_backup_name() {
        let mut op = restore();
        op.backup_name = String::new();
        let err = op.validate().unwrap_err();
        assert!(err.to_string().contains("gcp_restore_file_name"));
    }
}
