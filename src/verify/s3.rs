//! Synchronous facade over the S3 SDK for backup verification.
//!
//! The harness is single-threaded and synchronous; the SDK is async. A
//! dedicated tokio runtime is held internally and every call blocks on
//! it, so callers never see async types. The runtime is dropped on a
//! detached thread because dropping a runtime from within itself panics.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tokio::runtime::Runtime;
use url::Url;

use crate::error::StackopsError;

/// Configuration for the backup bucket facade.
#[derive(Debug, Clone, Default)]
pub struct BackupBucketConfig {
    /// AWS region (falls back to environment configuration when unset)
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible stores
    pub endpoint: Option<String>,
    /// Force path-style addressing (for S3-compatible stores)
    pub force_path_style: bool,
}

/// S3-backed verification of stack backups.
pub struct BackupBucket {
    client: Client,
    region: Option<String>,
    runtime: Option<Arc<Runtime>>,
}

impl Drop for BackupBucket {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl BackupBucket {
    /// Creates a new facade, loading credentials from the environment.
    pub fn new(config: BackupBucketConfig) -> Result<Self, StackopsError> {
        if let Some(endpoint) = &config.endpoint {
            Url::parse(endpoint).map_err(|e| {
                StackopsError::Config(format!("invalid s3 endpoint url '{}': {}", endpoint, e))
            })?;
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| StackopsError::Verification(format!("failed to build runtime: {}", e)))?;

        let shared_config = runtime.block_on(async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = &config.region {
                loader = loader.region(Region::new(region.clone()));
            }
            if let Some(endpoint) = &config.endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            loader.load().await
        });

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        let client = Client::from_conf(s3_builder.build());

        Ok(Self {
            client,
            region: config.region,
            runtime: Some(Arc::new(runtime)),
        })
    }

    fn runtime(&self) -> Result<&Runtime, StackopsError> {
        self.runtime
            .as_deref()
            .ok_or_else(|| StackopsError::Verification("backup bucket facade closed".to_string()))
    }

    /// Returns true when the bucket exists and is accessible.
    pub fn bucket_exists(&self, bucket: &str) -> Result<bool, StackopsError> {
        Ok(self
            .runtime()?
            .block_on(self.client.head_bucket().bucket(bucket).send())
            .is_ok())
    }

    /// Creates the bucket holding backup files if it does not exist yet.
    pub fn ensure_bucket(&self, bucket: &str) -> Result<(), StackopsError> {
        if self.bucket_exists(bucket)? {
            tracing::debug!("bucket already exists: {}", bucket);
            return Ok(());
        }

        tracing::info!("creating backup bucket: {}", bucket);

        let mut request = self.client.create_bucket().bucket(bucket);
        // us-east-1 rejects an explicit location constraint
        if let Some(region) = self.region.as_deref().filter(|r| *r != "us-east-1") {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        self.runtime()?.block_on(request.send()).map_err(|e| {
            StackopsError::Verification(format!("failed to create bucket {}: {}", bucket, e))
        })?;
        Ok(())
    }

    /// Deletes the bucket holding backup files.
    ///
    /// The bucket must be empty; object cleanup is the responsibility of
    /// the backup playbooks or the operator.
    pub fn delete_bucket(&self, bucket: &str) -> Result<(), StackopsError> {
        tracing::info!("deleting backup bucket: {}", bucket);
        self.runtime()?
            .block_on(self.client.delete_bucket().bucket(bucket).send())
            .map_err(|e| {
                StackopsError::Verification(format!("failed to delete bucket {}: {}", bucket, e))
            })?;
        Ok(())
    }

    /// Returns the newest stack backup object stored in the bucket.
    ///
    /// Backups are laid out as top-level prefixes; the listing is
    /// delimited on `/` and the last common prefix, with the trailing
    /// slash trimmed, names the most recent backup.
    pub fn latest_backup_object(&self, bucket: &str) -> Result<String, StackopsError> {
        if !self.bucket_exists(bucket)? {
            return Err(StackopsError::Verification(format!(
                "unable to locate bucket {}",
                bucket
            )));
        }

        let listing = self
            .runtime()?
            .block_on(
                self.client
                    .list_objects_v2()
                    .bucket(bucket)
                    .delimiter("/")
                    .send(),
            )
            .map_err(|e| {
                StackopsError::Verification(format!("failed to list bucket {}: {}", bucket, e))
            })?;

        listing
            .common_prefixes()
            .last()
            .and_then(|p| p.prefix())
            .map(|p| p.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                StackopsError::Verification(format!("no backup objects found in bucket {}", bucket))
            })
    }
}
