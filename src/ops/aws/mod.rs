//! AWS backup and restore playbook variants.

mod backup;
mod restore;

pub use backup::AwsBackup;
pub use restore::AwsRestore;

/// Container path the AWS credentials file is mounted at.
pub(crate) const AWS_CREDENTIALS_MOUNT: &str = "/home/runner/.aws/credentials";

/// Ansible configuration path used by the AWS playbooks inside the ops
/// container.
pub(crate) const AWS_ANSIBLE_CONFIG: &str = "../aws-ansible.cfg";
