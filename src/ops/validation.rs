//! Validation utilities for playbook parameters.
//!
//! Provides host-side checks for credentials files that get mounted into
//! the ops container.

use std::fs;

use camino::Utf8Path;

use crate::error::StackopsError;

/// Validates that a path contains no `..` components.
///
/// The `label` parameter describes the path's purpose in error messages
/// (e.g., "aws credentials", "gcp service account").
pub(crate) fn validate_no_parent_dirs(path: &Utf8Path, label: &str) -> Result<(), StackopsError> {
    if path
        .components()
        .any(|c| c == camino::Utf8Component::ParentDir)
    {
        return Err(StackopsError::Validation(format!(
            "{} path '{}' contains '..' components, \
            which is not allowed for security reasons",
            label, path
        )));
    }
    Ok(())
}

/// Validates that a credentials file exists and is a regular file (not a
/// symlink) before it is mounted into the container.
///
/// Uses `symlink_metadata` to avoid following symlinks. Returns
/// `StackopsError::Io` if the file cannot be accessed, or
/// `StackopsError::Validation` if the path is a symlink, not a regular
/// file, or contains parent-directory components.
pub(crate) fn validate_credentials_file(
    path: &Utf8Path,
    label: &str,
) -> Result<(), StackopsError> {
    if path.as_str().is_empty() {
        return Err(StackopsError::Validation(format!("{} path is not set", label)));
    }

    validate_no_parent_dirs(path, label)?;

    let metadata = fs::symlink_metadata(path).map_err(|e| {
        StackopsError::io(format!("failed to read {} metadata: {}", label, path), e)
    })?;
    if metadata.is_symlink() {
        return Err(StackopsError::Validation(format!(
            "{} path '{}' is a symlink, which is not allowed for security reasons",
            label, path
        )));
    }
    if !metadata.is_file() {
        return Err(StackopsError::Validation(format!("{} is not a file: {}", label, path)));
    }
    Ok(())
}
