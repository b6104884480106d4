//! GCP backup and restore playbook variants.

mod backup;
mod restore;

pub use backup::GcpBackup;
pub use restore::GcpRestore;

/// Container path the GCP service account file is mounted at.
pub(crate) const GCP_CREDENTIALS_MOUNT: &str = "/home/runner/.gcp/credentials.json";

/// Ansible configuration path used by the GCP playbooks inside the ops
/// container.
pub(crate) const GCP_ANSIBLE_CONFIG: &str = "../gcp-ansible.cfg";
