//! Post-operation verification against cloud object storage.

mod s3;

pub use s3::{BackupBucket, BackupBucketConfig};

/// Scans playbook output for the newest backup object name matching the
/// given prefix.
///
/// Used for clouds without a storage-listing facade: the backup playbooks
/// print the created object name, so the last `{prefix}-...` token in the
/// output is the backup that was just taken.
pub fn backup_object_from_output(output: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }

    let pattern = regex::Regex::new(&format!(
        r"{}-[0-9A-Za-z._-]+",
        regex::escape(prefix)
    ))
    .ok()?;

    pattern
        .find_iter(output)
        .last()
        .map(|m| m.as_str().trim_end_matches(['.', ',']).to_string())
}
